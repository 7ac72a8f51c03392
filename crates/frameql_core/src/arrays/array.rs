use frameql_error::{DbError, Result};

use super::datatype::DataType;
use super::scalar::ScalarValue;

/// A column of nullable values.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Null(usize),
    Boolean(Vec<Option<bool>>),
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
}

impl Array {
    pub fn with_capacity(datatype: DataType, capacity: usize) -> Self {
        match datatype {
            DataType::Null => Array::Null(0),
            DataType::Boolean => Array::Boolean(Vec::with_capacity(capacity)),
            DataType::Int64 => Array::Int64(Vec::with_capacity(capacity)),
            DataType::Float64 => Array::Float64(Vec::with_capacity(capacity)),
            DataType::Utf8 => Array::Utf8(Vec::with_capacity(capacity)),
        }
    }

    /// Create an array by repeating a scalar value.
    pub fn repeat(value: &ScalarValue, len: usize) -> Self {
        match value {
            ScalarValue::Null => Array::Null(len),
            ScalarValue::Boolean(v) => Array::Boolean(vec![Some(*v); len]),
            ScalarValue::Int64(v) => Array::Int64(vec![Some(*v); len]),
            ScalarValue::Float64(v) => Array::Float64(vec![Some(*v); len]),
            ScalarValue::Utf8(v) => Array::Utf8(vec![Some(v.clone()); len]),
        }
    }

    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null(_) => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Null(len) => *len,
            Self::Boolean(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value to the array.
    ///
    /// Nulls can be appended to any array. Integers may be appended to float
    /// arrays. Everything else must match the array's type.
    pub fn push(&mut self, value: ScalarValue) -> Result<()> {
        match (self, value) {
            (Self::Null(len), ScalarValue::Null) => *len += 1,
            (Self::Boolean(v), ScalarValue::Null) => v.push(None),
            (Self::Int64(v), ScalarValue::Null) => v.push(None),
            (Self::Float64(v), ScalarValue::Null) => v.push(None),
            (Self::Utf8(v), ScalarValue::Null) => v.push(None),
            (Self::Boolean(v), ScalarValue::Boolean(b)) => v.push(Some(b)),
            (Self::Int64(v), ScalarValue::Int64(i)) => v.push(Some(i)),
            (Self::Float64(v), ScalarValue::Float64(f)) => v.push(Some(f)),
            (Self::Float64(v), ScalarValue::Int64(i)) => v.push(Some(i as f64)),
            (Self::Utf8(v), ScalarValue::Utf8(s)) => v.push(Some(s)),
            (array, value) => {
                return Err(DbError::new("Cannot append value to array")
                    .with_field("array_type", array.datatype())
                    .with_field("value_type", value.datatype()));
            }
        }
        Ok(())
    }

    /// Get the value at some index.
    pub fn value(&self, idx: usize) -> Option<ScalarValue> {
        if idx >= self.len() {
            return None;
        }

        let val = match self {
            Self::Null(_) => ScalarValue::Null,
            Self::Boolean(v) => v[idx].map(ScalarValue::Boolean).unwrap_or(ScalarValue::Null),
            Self::Int64(v) => v[idx].map(ScalarValue::Int64).unwrap_or(ScalarValue::Null),
            Self::Float64(v) => v[idx].map(ScalarValue::Float64).unwrap_or(ScalarValue::Null),
            Self::Utf8(v) => v[idx]
                .clone()
                .map(ScalarValue::Utf8)
                .unwrap_or(ScalarValue::Null),
        };

        Some(val)
    }

    /// Keep only the first `len` values.
    pub fn truncate(&mut self, len: usize) {
        match self {
            Self::Null(n) => *n = usize::min(*n, len),
            Self::Boolean(v) => v.truncate(len),
            Self::Int64(v) => v.truncate(len),
            Self::Float64(v) => v.truncate(len),
            Self::Utf8(v) => v.truncate(len),
        }
    }
}
