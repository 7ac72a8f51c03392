use std::sync::Arc;

use frameql_core::extension::Extension;
use frameql_core::source::ReaderFactory;
use frameql_core::source::registry::FileHandler;
use frameql_error::Result;

use crate::reader::CsvReaderFactory;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExtension {}

impl CsvExtension {
    pub const fn new() -> Self {
        CsvExtension {}
    }
}

impl Extension for CsvExtension {
    const NAME: &str = "csv";

    fn reader_factories(&self) -> Vec<Arc<dyn ReaderFactory>> {
        vec![Arc::new(CsvReaderFactory)]
    }

    fn file_handlers(&self) -> Result<Vec<FileHandler>> {
        Ok(vec![FileHandler::for_extensions("csv", &["csv"])?])
    }
}
