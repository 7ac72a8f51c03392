use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use frameql_core::arrays::array::Array;
use frameql_core::arrays::batch::Batch;
use frameql_core::arrays::datatype::DataType;
use frameql_core::arrays::field::Schema;
use frameql_core::arrays::scalar::ScalarValue;
use frameql_core::frame::{LazyRelation, check_partition_idx};
use frameql_core::source::{ReaderFactory, ReaderOptions};
use frameql_error::{DbError, ErrorKind, Result};
use tracing::debug;

use crate::schema::infer_schema;

/// Number of records to sample when inferring the schema.
pub const INFER_RECORDS: usize = 1024;

/// Number of rows per produced batch.
pub const BATCH_SIZE: usize = 4096;

/// Dialect options for reading a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
    pub has_header: bool,
}

impl Default for CsvDialect {
    fn default() -> Self {
        CsvDialect {
            delimiter: b',',
            quote: b'"',
            has_header: true,
        }
    }
}

impl CsvDialect {
    /// Build a dialect from reader options, erroring on unknown options.
    pub fn try_from_options(options: &ReaderOptions) -> Result<Self> {
        let mut options = options.clone();
        let mut dialect = CsvDialect::default();

        if let Some(delimiter) = options.take_char("delimiter")? {
            dialect.delimiter = delimiter;
        }
        if let Some(quote) = options.take_char("quote")? {
            dialect.quote = quote;
        }
        if let Some(has_header) = options.take_bool("has_header")? {
            dialect.has_header = has_header;
        }

        options.check_empty()?;

        Ok(dialect)
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(self.has_header);
        builder
    }

    fn open(&self, path: &Path) -> Result<csv::Reader<File>> {
        let file = File::open(path).map_err(|e| {
            DbError::io("Failed to open CSV file", e).with_field("location", path.display())
        })?;
        Ok(self.reader_builder().from_reader(file))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReaderFactory;

impl ReaderFactory for CsvReaderFactory {
    fn format(&self) -> &str {
        "csv"
    }

    fn validate_options(&self, options: &ReaderOptions) -> Result<()> {
        CsvDialect::try_from_options(options).map(|_| ())
    }

    fn read(&self, location: &str, options: &ReaderOptions) -> Result<Arc<dyn LazyRelation>> {
        let dialect = CsvDialect::try_from_options(options)?;
        let relation = CsvRelation::try_new(location, dialect)?;
        Ok(Arc::new(relation))
    }
}

/// A relation backed by a CSV file.
///
/// The schema is fixed when the relation is created. The file is read again
/// every time the partition is evaluated.
#[derive(Debug)]
pub struct CsvRelation {
    path: PathBuf,
    dialect: CsvDialect,
    schema: Schema,
}

impl CsvRelation {
    pub fn try_new(location: impl Into<PathBuf>, dialect: CsvDialect) -> Result<Self> {
        let path = location.into();
        let mut reader = dialect.open(&path)?;

        let header = if dialect.has_header {
            Some(reader.headers().map_err(csv_error)?.clone())
        } else {
            None
        };

        let mut records = Vec::new();
        for record in reader.records().take(INFER_RECORDS) {
            records.push(record.map_err(csv_error)?);
        }

        let schema = infer_schema(header.as_ref(), &records)?;
        debug!(location = %path.display(), %schema, "inferred csv schema");

        Ok(CsvRelation {
            path,
            dialect,
            schema,
        })
    }

    fn new_arrays(&self) -> Vec<Array> {
        self.schema
            .fields
            .iter()
            .map(|f| Array::with_capacity(f.datatype, BATCH_SIZE))
            .collect()
    }

    fn push_record(&self, arrays: &mut [Array], record: &StringRecord) -> Result<()> {
        if record.len() != arrays.len() {
            return Err(DbError::new("Unexpected number of fields in CSV record")
                .with_field("expected", arrays.len())
                .with_field("got", record.len()));
        }

        for ((array, field), value) in arrays.iter_mut().zip(&self.schema.fields).zip(record) {
            array.push(parse_field(field.datatype, value)?)?;
        }
        Ok(())
    }
}

impl LazyRelation for CsvRelation {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn num_partitions(&self) -> usize {
        1
    }

    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
        check_partition_idx(partition, 1)?;

        let mut reader = self.dialect.open(&self.path)?;
        let mut batches = Vec::new();
        let mut arrays = self.new_arrays();
        let mut rows = 0;

        let mut record = StringRecord::new();
        while reader.read_record(&mut record).map_err(csv_error)? {
            self.push_record(&mut arrays, &record)?;
            rows += 1;
            if rows == BATCH_SIZE {
                batches.push(Batch::try_new(std::mem::replace(
                    &mut arrays,
                    self.new_arrays(),
                ))?);
                rows = 0;
            }
        }
        if rows > 0 {
            batches.push(Batch::try_new(arrays)?);
        }

        Ok(batches)
    }
}

/// Parse a single field. Empty fields are null.
fn parse_field(datatype: DataType, value: &str) -> Result<ScalarValue> {
    if value.is_empty() {
        return Ok(ScalarValue::Null);
    }

    let parse_err = || {
        DbError::new("Failed to parse CSV field")
            .with_field("value", value)
            .with_field("datatype", datatype)
    };

    Ok(match datatype {
        DataType::Null => ScalarValue::Null,
        DataType::Boolean => ScalarValue::Boolean(value.parse().map_err(|_| parse_err())?),
        DataType::Int64 => ScalarValue::Int64(value.parse().map_err(|_| parse_err())?),
        DataType::Float64 => ScalarValue::Float64(value.parse().map_err(|_| parse_err())?),
        DataType::Utf8 => ScalarValue::Utf8(value.to_string()),
    })
}

fn csv_error(err: csv::Error) -> DbError {
    DbError::with_source("Failed to read CSV", Box::new(err)).with_kind(ErrorKind::Io)
}
