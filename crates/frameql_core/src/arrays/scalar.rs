use std::fmt;

use frameql_error::{DbError, Result};
use frameql_parser::ast::Literal;
use serde::{Deserialize, Serialize};

use super::datatype::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to interpret the value as a boolean.
    ///
    /// Strings "true"/"false" (any case) are accepted since option values
    /// frequently arrive quoted.
    pub fn try_as_bool(&self) -> Result<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            Self::Utf8(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Self::Utf8(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(DbError::new(format!("Expected a boolean, got {other}"))),
        }
    }

    pub fn try_as_i64(&self) -> Result<i64> {
        match self {
            Self::Int64(i) => Ok(*i),
            Self::Utf8(s) => s
                .parse()
                .map_err(|_| DbError::new(format!("Expected an integer, got '{s}'"))),
            other => Err(DbError::new(format!("Expected an integer, got {other}"))),
        }
    }

    pub fn try_as_f64(&self) -> Result<f64> {
        match self {
            Self::Int64(i) => Ok(*i as f64),
            Self::Float64(f) => Ok(*f),
            other => Err(DbError::new(format!("Expected a float, got {other}"))),
        }
    }

    pub fn try_as_str(&self) -> Result<&str> {
        match self {
            Self::Utf8(s) => Ok(s),
            other => Err(DbError::new(format!("Expected a string, got {other}"))),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl TryFrom<&Literal> for ScalarValue {
    type Error = DbError;

    /// Numbers become Int64 if they fit, Float64 otherwise.
    fn try_from(lit: &Literal) -> Result<Self> {
        Ok(match lit {
            Literal::Null => ScalarValue::Null,
            Literal::Boolean(b) => ScalarValue::Boolean(*b),
            Literal::String(s) => ScalarValue::Utf8(s.clone()),
            Literal::Number(n) => match n.parse::<i64>() {
                Ok(i) => ScalarValue::Int64(i),
                Err(_) => ScalarValue::Float64(
                    n.parse::<f64>()
                        .map_err(|_| DbError::parse(format!("Invalid number: {n}")))?,
                ),
            },
        })
    }
}
