use csv::StringRecord;
use frameql_core::arrays::datatype::DataType;
use frameql_core::arrays::field::{Field, Schema};
use frameql_error::{DbError, Result};

/// Candidate types used when trying to infer the types for a file.
///
/// Variants are ordered from the narrowest to the widest type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CandidateType {
    /// Boolean type, strictest.
    Boolean,
    Int64,
    Float64,
    /// Utf8 type, this should be able to encompass any field.
    Utf8,
}

impl CandidateType {
    const fn as_datatype(&self) -> DataType {
        match self {
            Self::Boolean => DataType::Boolean,
            Self::Int64 => DataType::Int64,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
        }
    }

    /// Update this candidate type based on some string input.
    ///
    /// Empty fields are treated as nulls and don't change the candidate.
    fn update_from_input(&mut self, input: &str) {
        if input.is_empty() {
            return;
        }

        match self {
            Self::Boolean => {
                if input.parse::<bool>().is_err() {
                    if input.parse::<i64>().is_ok() {
                        *self = Self::Int64;
                        return;
                    }
                    if input.parse::<f64>().is_ok() {
                        *self = Self::Float64;
                        return;
                    }
                    *self = Self::Utf8;
                }
            }
            Self::Int64 => {
                if input.parse::<i64>().is_err() {
                    if input.parse::<f64>().is_ok() {
                        *self = Self::Float64;
                        return;
                    }
                    *self = Self::Utf8;
                }
            }
            Self::Float64 => {
                if input.parse::<f64>().is_err() {
                    *self = Self::Utf8;
                }
            }
            Self::Utf8 => (), // Already the widest.
        }
    }
}

/// Infer a schema from a sample of records.
///
/// If `header` is provided, it's used for field names. Otherwise names are
/// generated.
pub fn infer_schema(header: Option<&StringRecord>, records: &[StringRecord]) -> Result<Schema> {
    let num_fields = match (header, records.first()) {
        (Some(header), _) => header.len(),
        (None, Some(record)) => record.len(),
        (None, None) => {
            return Err(DbError::new(
                "Unable to infer CSV schema with no header and no records",
            ));
        }
    };

    // Start with most restrictive.
    let mut candidates = vec![CandidateType::Boolean; num_fields];
    for record in records {
        for (candidate, field) in candidates.iter_mut().zip(record.iter()) {
            candidate.update_from_input(field);
        }
    }

    // Columns with only nulls (or no records at all) fall back to strings.
    let all_empty: Vec<bool> = (0..num_fields)
        .map(|idx| {
            records
                .iter()
                .all(|r| r.get(idx).map(|f| f.is_empty()).unwrap_or(true))
        })
        .collect();

    let fields = candidates
        .into_iter()
        .zip(all_empty)
        .enumerate()
        .map(|(idx, (candidate, empty))| {
            let datatype = if empty {
                DataType::Utf8
            } else {
                candidate.as_datatype()
            };
            let name = match header.and_then(|h| h.get(idx)) {
                Some(name) => name.to_string(),
                None => format!("column{idx}"),
            };
            Field::new(name, datatype, true)
        });

    Ok(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_types() {
        let header = StringRecord::from(vec!["a", "b", "c", "d", "e"]);
        let records = vec![
            StringRecord::from(vec!["true", "1", "1", "x", ""]),
            StringRecord::from(vec!["false", "2", "1.5", "2", ""]),
            StringRecord::from(vec!["", "", "3", "y", ""]),
        ];

        let schema = infer_schema(Some(&header), &records).unwrap();
        let expected = Schema::new([
            Field::new("a", DataType::Boolean, true),
            Field::new("b", DataType::Int64, true),
            Field::new("c", DataType::Float64, true),
            Field::new("d", DataType::Utf8, true),
            Field::new("e", DataType::Utf8, true),
        ]);
        assert_eq!(expected, schema);
    }

    #[test]
    fn generated_names() {
        let records = vec![StringRecord::from(vec!["1", "x"])];
        let schema = infer_schema(None, &records).unwrap();
        assert_eq!(
            vec!["column0", "column1"],
            schema.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn header_only() {
        let header = StringRecord::from(vec!["a"]);
        let schema = infer_schema(Some(&header), &[]).unwrap();
        assert_eq!(DataType::Utf8, schema.fields[0].datatype);

        infer_schema(None, &[]).unwrap_err();
    }
}
