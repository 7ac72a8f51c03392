use std::sync::Arc;

use frameql_error::Result;

use crate::source::ReaderFactory;
use crate::source::registry::FileHandler;

pub trait Extension {
    /// The name of the extension.
    const NAME: &str;

    /// Reader factories provided by this extension. Format names must be
    /// unique across all registered extensions.
    fn reader_factories(&self) -> Vec<Arc<dyn ReaderFactory>> {
        Vec::new()
    }

    /// File handlers used for inferring a format from a location.
    fn file_handlers(&self) -> Result<Vec<FileHandler>> {
        Ok(Vec::new())
    }
}
