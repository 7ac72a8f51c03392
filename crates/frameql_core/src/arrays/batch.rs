use frameql_error::{DbError, Result};

use super::array::Array;
use super::scalar::ScalarValue;

/// A set of equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    columns: Vec<Array>,
    num_rows: usize,
}

impl Batch {
    pub fn empty() -> Self {
        Batch::default()
    }

    /// Create a batch with a fixed number of rows and no columns.
    ///
    /// Used for queries that only care about row counts.
    pub fn empty_with_num_rows(num_rows: usize) -> Self {
        Batch {
            columns: Vec::new(),
            num_rows,
        }
    }

    /// Try to create a new batch from columns.
    ///
    /// Errors if the columns don't all have the same length.
    pub fn try_new(columns: impl IntoIterator<Item = Array>) -> Result<Self> {
        let columns: Vec<_> = columns.into_iter().collect();
        let num_rows = match columns.first() {
            Some(col) => col.len(),
            None => return Ok(Self::empty()),
        };

        for (idx, col) in columns.iter().enumerate() {
            if col.len() != num_rows {
                return Err(DbError::new("Expected column length to match first column")
                    .with_field("expected", num_rows)
                    .with_field("got", col.len())
                    .with_field("column_idx", idx));
            }
        }

        Ok(Batch { columns, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&Array> {
        self.columns.get(idx)
    }

    pub fn columns(&self) -> &[Array] {
        &self.columns
    }

    /// Keep only the first `len` rows.
    pub fn truncate(&mut self, len: usize) {
        for col in &mut self.columns {
            col.truncate(len);
        }
        self.num_rows = usize::min(self.num_rows, len);
    }

    /// Get the values for a single row.
    pub fn row(&self, idx: usize) -> Option<Vec<ScalarValue>> {
        if idx >= self.num_rows {
            return None;
        }
        self.columns.iter().map(|col| col.value(idx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_lengths() {
        Batch::try_new([
            Array::Int64(vec![Some(1), Some(2)]),
            Array::Utf8(vec![Some("a".to_string())]),
        ])
        .unwrap_err();
    }

    #[test]
    fn row_values() {
        let batch = Batch::try_new([
            Array::Int64(vec![Some(1), Some(2)]),
            Array::Utf8(vec![Some("a".to_string()), None]),
        ])
        .unwrap();

        assert_eq!(2, batch.num_columns());
        assert_eq!(Some(vec![ScalarValue::Int64(2), ScalarValue::Null]), batch.row(1));
        assert_eq!(None, batch.row(2));
    }

    #[test]
    fn truncate_rows() {
        let mut batch = Batch::try_new([Array::Boolean(vec![Some(true); 8])]).unwrap();
        batch.truncate(3);
        assert_eq!(3, batch.num_rows());
        assert_eq!(3, batch.column(0).unwrap().len());
    }
}
