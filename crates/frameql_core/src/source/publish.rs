use std::fmt::Debug;
use std::sync::Arc;

use frameql_error::{DbError, Result};
use scc::HashIndex;
use scc::ebr::Guard;
use tracing::debug;

use crate::frame::LazyRelation;

/// Registry of datasets published by name.
///
/// Datasets are owned by the registry. Relations only hold the published
/// name and look it up each time they're read.
pub trait PublishRegistry: Debug + Sync + Send {
    fn lookup(&self, name: &str) -> Option<Arc<dyn LazyRelation>>;
}

/// In-process publish registry.
#[derive(Debug, Default)]
pub struct MemoryPublishRegistry {
    datasets: HashIndex<String, Arc<dyn LazyRelation>>,
}

impl MemoryPublishRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a dataset under a name. Errors if the name is already in use.
    pub fn publish(&self, name: impl Into<String>, dataset: Arc<dyn LazyRelation>) -> Result<()> {
        let name = name.into();
        debug!(%name, "publishing dataset");
        self.datasets
            .insert(name, dataset)
            .map_err(|(name, _)| DbError::new(format!("Dataset '{name}' is already published")))
    }

    /// Remove a published dataset. Returns false if nothing was published
    /// with that name.
    pub fn unpublish(&self, name: &str) -> bool {
        debug!(%name, "unpublishing dataset");
        self.datasets.remove(name)
    }
}

impl PublishRegistry for MemoryPublishRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn LazyRelation>> {
        let guard = Guard::new();
        self.datasets.peek(name, &guard).cloned()
    }
}
