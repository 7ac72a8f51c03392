//! Resolving source descriptors into lazy relations.
pub mod options;
pub mod publish;
pub mod registry;
pub mod resolver;

use std::fmt::{self, Debug};
use std::sync::Arc;

use frameql_error::Result;
use serde::{Deserialize, Serialize};

pub use self::options::ReaderOptions;
use crate::frame::LazyRelation;

/// Describes where a relation's data comes from.
///
/// Captured when the relation is created, and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceDescriptor {
    /// Data read through a registered format reader.
    File {
        format: String,
        location: String,
        options: ReaderOptions,
    },
    /// A dataset published by name in the publish registry.
    Published { name: String },
}

impl SourceDescriptor {
    pub fn file(format: impl Into<String>, location: impl Into<String>) -> Self {
        SourceDescriptor::File {
            format: format.into(),
            location: location.into(),
            options: ReaderOptions::default(),
        }
    }

    pub fn published(name: impl Into<String>) -> Self {
        SourceDescriptor::Published { name: name.into() }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File {
                format, location, ..
            } => write!(f, "{format}:{location}"),
            Self::Published { name } => write!(f, "memory:{name}"),
        }
    }
}

/// Produces lazy relations for a single format.
pub trait ReaderFactory: Debug + Sync + Send {
    /// Name of the format this factory reads, e.g. "csv".
    fn format(&self) -> &str;

    /// Option keys that must be present when creating a relation with this
    /// format.
    fn required_options(&self) -> &[&str] {
        &["location"]
    }

    /// Check reader specific options without reading any data.
    fn validate_options(&self, _options: &ReaderOptions) -> Result<()> {
        Ok(())
    }

    /// Create a lazy relation reading from `location`.
    ///
    /// Implementations should check that the location is readable and
    /// determine the schema here. Partition data is read on demand.
    fn read(&self, location: &str, options: &ReaderOptions) -> Result<Arc<dyn LazyRelation>>;
}
