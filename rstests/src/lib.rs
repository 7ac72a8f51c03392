//! Shared helpers for end to end tests over file backed relations.
use std::io::Write;
use std::path::Path;

use frameql_core::arrays::scalar::ScalarValue;
use frameql_core::engine::Engine;
use frameql_core::engine::session::Session;
use frameql_error::{DbError, Result};
use frameql_ext_csv::CsvExtension;
use frameql_ext_json::JsonExtension;
use tempfile::NamedTempFile;

/// Create an engine with the csv and json readers registered.
pub fn engine() -> Result<Engine> {
    let engine = Engine::try_new()?;
    engine.register_extension(CsvExtension::new())?;
    engine.register_extension(JsonExtension)?;
    Ok(engine)
}

/// Write `rows` rows of `(a INT, b TEXT)` to a csv file with a header.
pub fn write_csv_rows(path: &Path, rows: usize) -> Result<()> {
    let mut contents = String::from("a,b\n");
    for idx in 0..rows {
        contents.push_str(&format!("{idx},row{idx}\n"));
    }
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn csv_file(rows: usize) -> Result<NamedTempFile> {
    let file = NamedTempFile::with_suffix(".csv")?;
    write_csv_rows(file.path(), rows)?;
    Ok(file)
}

pub fn json_file(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::with_suffix(".jsonl")?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Run `SELECT COUNT(*)` against a relation.
pub fn count(session: &Session, name: &str) -> Result<i64> {
    let result = session.query(&format!("SELECT COUNT(*) FROM {name}"))?;
    let row = result
        .batches()
        .next()
        .and_then(|b| b.row(0))
        .ok_or_else(|| DbError::new("Count produced no rows"))?;
    match row.first() {
        Some(ScalarValue::Int64(v)) => Ok(*v),
        other => Err(DbError::new(format!("Unexpected count value: {other:?}"))),
    }
}
