pub mod session;

use std::sync::Arc;

use frameql_error::{Result, ResultExt};
use session::Session;
use tracing::debug;

use crate::backend::{AcceleratedBackend, NoAcceleratedBackend};
use crate::catalog::Catalog;
use crate::extension::Extension;
use crate::frame::LazyRelation;
use crate::materialize::Materializer;
use crate::planner::QueryPlanner;
use crate::planner::basic::BasicPlanner;
use crate::source::publish::MemoryPublishRegistry;
use crate::source::registry::FormatRegistry;
use crate::source::resolver::SourceResolver;

/// Holds collaborators shared by every session.
#[derive(Debug)]
pub struct Engine {
    formats: Arc<FormatRegistry>,
    published: Arc<MemoryPublishRegistry>,
    accelerator: Arc<dyn AcceleratedBackend>,
    planner: Arc<dyn QueryPlanner>,
    materializer: Materializer,
}

impl Engine {
    /// Create an engine with no formats registered, the basic planner, and no
    /// accelerated backend.
    pub fn try_new() -> Result<Self> {
        Ok(Engine {
            formats: Arc::new(FormatRegistry::new()),
            published: Arc::new(MemoryPublishRegistry::new()),
            accelerator: Arc::new(NoAcceleratedBackend),
            planner: Arc::new(BasicPlanner),
            materializer: Materializer::try_new()?,
        })
    }

    pub fn with_accelerator(mut self, accelerator: Arc<dyn AcceleratedBackend>) -> Self {
        self.accelerator = accelerator;
        self
    }

    pub fn with_planner(mut self, planner: Arc<dyn QueryPlanner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_materializer(mut self, materializer: Materializer) -> Self {
        self.materializer = materializer;
        self
    }

    pub fn formats(&self) -> &Arc<FormatRegistry> {
        &self.formats
    }

    /// Register an extension's reader factories and file handlers.
    pub fn register_extension<E>(&self, ext: E) -> Result<()>
    where
        E: Extension,
    {
        for factory in ext.reader_factories() {
            self.formats
                .register(factory)
                .context("Failed to register reader factory")?;
        }

        for handler in ext.file_handlers()? {
            self.formats.register_file_handler(handler)?;
        }

        debug!(extension = E::NAME, "registered extension");

        Ok(())
    }

    /// Publish a dataset so relations can reference it by name.
    pub fn publish(&self, name: impl Into<String>, dataset: Arc<dyn LazyRelation>) -> Result<()> {
        self.published.publish(name, dataset)
    }

    pub fn unpublish(&self, name: &str) -> bool {
        self.published.unpublish(name)
    }

    /// Create a new session with an empty catalog.
    pub fn new_session(&self) -> Session {
        let resolver = SourceResolver::new(
            self.formats.clone(),
            self.published.clone(),
            self.accelerator.clone(),
        );
        let catalog = Catalog::new(resolver, self.materializer.clone());
        Session::new(catalog, self.planner.clone())
    }
}
