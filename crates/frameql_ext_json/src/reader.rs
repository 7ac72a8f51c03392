use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use frameql_core::arrays::array::Array;
use frameql_core::arrays::batch::Batch;
use frameql_core::arrays::datatype::DataType;
use frameql_core::arrays::field::{Field, Schema};
use frameql_core::arrays::scalar::ScalarValue;
use frameql_core::frame::{LazyRelation, check_partition_idx};
use frameql_core::source::{ReaderFactory, ReaderOptions};
use frameql_error::{DbError, ErrorKind, Result};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

/// Number of objects to sample when inferring the schema.
pub const INFER_OBJECTS: usize = 1024;

pub const BATCH_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReaderFactory;

impl ReaderFactory for JsonReaderFactory {
    fn format(&self) -> &str {
        "json"
    }

    fn validate_options(&self, options: &ReaderOptions) -> Result<()> {
        options.check_empty()
    }

    fn read(&self, location: &str, options: &ReaderOptions) -> Result<Arc<dyn LazyRelation>> {
        options.check_empty()?;
        Ok(Arc::new(JsonRelation::try_new(location)?))
    }
}

/// A relation backed by a JSON file.
///
/// Fields are the union of keys seen in the sampled objects, in order of
/// first appearance. Missing keys read as null.
#[derive(Debug)]
pub struct JsonRelation {
    path: PathBuf,
    schema: Schema,
}

impl JsonRelation {
    pub fn try_new(location: impl Into<PathBuf>) -> Result<Self> {
        let path = location.into();
        let objects = read_objects(&path, Some(INFER_OBJECTS))?;

        let mut field_set = IndexMap::<String, DataType>::new();
        for obj in &objects {
            for (key, value) in obj {
                let datatype = type_for_value(value);
                field_set
                    .entry(key.clone())
                    .and_modify(|existing| *existing = existing.widen(datatype))
                    .or_insert(datatype);
            }
        }

        let schema = Schema::new(field_set.into_iter().map(|(name, datatype)| {
            // Columns that were only ever null are read as strings.
            let datatype = match datatype {
                DataType::Null => DataType::Utf8,
                other => other,
            };
            Field::new(name, datatype, true)
        }));
        debug!(location = %path.display(), %schema, "inferred json schema");

        Ok(JsonRelation { path, schema })
    }
}

impl LazyRelation for JsonRelation {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn num_partitions(&self) -> usize {
        1
    }

    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
        check_partition_idx(partition, 1)?;

        let objects = read_objects(&self.path, None)?;
        let mut batches = Vec::with_capacity(objects.len().div_ceil(BATCH_SIZE));

        for chunk in objects.chunks(BATCH_SIZE) {
            let mut arrays = Vec::with_capacity(self.schema.len());
            for field in &self.schema.fields {
                let mut array = Array::with_capacity(field.datatype, chunk.len());
                for obj in chunk {
                    let value = obj.get(&field.name).unwrap_or(&Value::Null);
                    array.push(scalar_for_value(field, value)?)?;
                }
                arrays.push(array);
            }

            let batch = if arrays.is_empty() {
                Batch::empty_with_num_rows(chunk.len())
            } else {
                Batch::try_new(arrays)?
            };
            batches.push(batch);
        }

        Ok(batches)
    }
}

/// Read objects from a file containing a stream of JSON values.
///
/// Top level arrays are unwound into their elements. Top level nulls read as
/// empty objects.
fn read_objects(path: &Path, limit: Option<usize>) -> Result<Vec<Map<String, Value>>> {
    let file = File::open(path).map_err(|e| {
        DbError::io("Failed to open JSON file", e).with_field("location", path.display())
    })?;

    let limit = limit.unwrap_or(usize::MAX);
    let mut data = Vec::new();
    let stream = serde_json::Deserializer::from_reader(BufReader::new(file)).into_iter::<Value>();
    for value in stream {
        if data.len() >= limit {
            break;
        }
        let value = value.map_err(|e| {
            DbError::with_source("Failed to read JSON", Box::new(e)).with_kind(ErrorKind::Io)
        })?;
        push_unwind_json_values(&mut data, value)?;
    }

    Ok(data)
}

fn push_unwind_json_values(data: &mut Vec<Map<String, Value>>, val: Value) -> Result<()> {
    match val {
        Value::Array(vals) => {
            for v in vals {
                match v {
                    Value::Object(doc) => data.push(doc),
                    Value::Null => data.push(Map::new()),
                    _ => return Err(unsupported_value()),
                }
            }
        }
        Value::Object(doc) => data.push(doc),
        Value::Null => data.push(Map::new()),
        _ => return Err(unsupported_value()),
    }
    Ok(())
}

fn unsupported_value() -> DbError {
    DbError::new("Only objects and arrays of objects are supported").with_kind(ErrorKind::Io)
}

fn type_for_value(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) if n.is_i64() => DataType::Int64,
        Value::Number(_) => DataType::Float64,
        // Nested values are kept as their JSON text.
        Value::String(_) | Value::Array(_) | Value::Object(_) => DataType::Utf8,
    }
}

fn scalar_for_value(field: &Field, value: &Value) -> Result<ScalarValue> {
    let scalar = match (field.datatype, value) {
        (_, Value::Null) => ScalarValue::Null,
        (DataType::Boolean, Value::Bool(b)) => ScalarValue::Boolean(*b),
        (DataType::Int64, Value::Number(n)) if n.is_i64() => {
            ScalarValue::Int64(n.as_i64().unwrap_or_default())
        }
        (DataType::Float64, Value::Number(n)) => match n.as_f64() {
            Some(f) => ScalarValue::Float64(f),
            None => return Err(mismatch(field, value)),
        },
        (DataType::Utf8, Value::String(s)) => ScalarValue::Utf8(s.clone()),
        (DataType::Utf8, other) => ScalarValue::Utf8(other.to_string()),
        _ => return Err(mismatch(field, value)),
    };
    Ok(scalar)
}

fn mismatch(field: &Field, value: &Value) -> DbError {
    DbError::new("JSON value does not match inferred column type")
        .with_field("column", &field.name)
        .with_field("datatype", field.datatype)
        .with_field("value", value)
}
