use std::collections::HashMap;
use std::sync::Arc;

use frameql_error::{DbError, Result};
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::ReaderFactory;

/// Maps a file location pattern to a format.
#[derive(Debug, Clone)]
pub struct FileHandler {
    pub regex: Regex,
    pub format: String,
}

impl FileHandler {
    /// Create a file handler matching locations with any of the given
    /// extensions, ignoring case.
    pub fn for_extensions(format: impl Into<String>, extensions: &[&str]) -> Result<Self> {
        let pattern = format!(r"^.*\.({})$", extensions.join("|"));
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DbError::with_source("Failed to build file handler regex", Box::new(e)))?;

        Ok(FileHandler {
            regex,
            format: format.into(),
        })
    }
}

/// Registry of reader factories keyed by format name.
///
/// Registration happens at startup. Lookups are case-insensitive.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    inner: RwLock<FormatRegistryInner>,
}

#[derive(Debug, Default)]
struct FormatRegistryInner {
    factories: HashMap<String, Arc<dyn ReaderFactory>>,
    file_handlers: Vec<FileHandler>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, factory: Arc<dyn ReaderFactory>) -> Result<()> {
        let format = factory.format().to_ascii_lowercase();
        let mut inner = self.inner.write();
        if inner.factories.contains_key(&format) {
            return Err(DbError::new(format!(
                "Duplicate reader factory for format '{format}'"
            )));
        }
        debug!(%format, "registered reader factory");
        inner.factories.insert(format, factory);
        Ok(())
    }

    pub fn register_file_handler(&self, handler: FileHandler) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner
            .factories
            .contains_key(&handler.format.to_ascii_lowercase())
        {
            return Err(DbError::new(format!(
                "Cannot register file handler for unknown format '{}'",
                handler.format
            )));
        }
        inner.file_handlers.push(handler);
        Ok(())
    }

    /// Get the factory for a format.
    pub fn resolve(&self, format: &str) -> Result<Arc<dyn ReaderFactory>> {
        self.inner
            .read()
            .factories
            .get(&format.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| DbError::unsupported_format(format))
    }

    /// Try to infer a format from a location using registered file handlers.
    ///
    /// The first matching handler wins.
    pub fn infer_format(&self, location: &str) -> Option<String> {
        self.inner
            .read()
            .file_handlers
            .iter()
            .find(|h| h.regex.is_match(location))
            .map(|h| h.format.clone())
    }

    /// Names of all registered formats, sorted.
    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<_> = self.inner.read().factories.keys().cloned().collect();
        formats.sort();
        formats
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use frameql_error::ErrorKind;

    use super::*;
    use crate::frame::LazyRelation;
    use crate::frame::memory::MemoryFrame;
    use crate::source::ReaderOptions;

    /// Reader factory that returns whatever frame is registered for a
    /// location.
    #[derive(Debug, Default)]
    pub struct StaticReaderFactory {
        pub frames: RwLock<HashMap<String, Arc<MemoryFrame>>>,
    }

    impl StaticReaderFactory {
        pub fn with_frame(self, location: &str, frame: MemoryFrame) -> Self {
            self.frames
                .write()
                .insert(location.to_string(), Arc::new(frame));
            self
        }
    }

    impl ReaderFactory for StaticReaderFactory {
        fn format(&self) -> &str {
            "static"
        }

        fn validate_options(&self, options: &ReaderOptions) -> Result<()> {
            options.clone().check_empty()
        }

        fn read(&self, location: &str, _options: &ReaderOptions) -> Result<Arc<dyn LazyRelation>> {
            match self.frames.read().get(location) {
                Some(frame) => Ok(frame.clone() as _),
                None => Err(DbError::new(format!("No data at '{location}'"))
                    .with_kind(ErrorKind::Io)),
            }
        }
    }
}
