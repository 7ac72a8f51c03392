pub mod reader;

use std::sync::Arc;

use frameql_core::extension::Extension;
use frameql_core::source::ReaderFactory;
use frameql_core::source::registry::FileHandler;
use frameql_error::Result;
use reader::JsonReaderFactory;

/// Reads newline delimited JSON objects, or a single JSON array of objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtension;

impl Extension for JsonExtension {
    const NAME: &str = "json";

    fn reader_factories(&self) -> Vec<Arc<dyn ReaderFactory>> {
        vec![Arc::new(JsonReaderFactory)]
    }

    fn file_handlers(&self) -> Result<Vec<FileHandler>> {
        Ok(vec![FileHandler::for_extensions(
            "json",
            &["json", "jsonl", "ndjson"],
        )?])
    }
}
