use std::sync::Arc;

use frameql_error::{DbError, Result};
use tracing::{debug, trace};

use super::SourceDescriptor;
use super::publish::PublishRegistry;
use super::registry::FormatRegistry;
use crate::backend::{AcceleratedBackend, AcceleratedRelation, Backend, check_backend};
use crate::frame::LazyRelation;

/// Turns source descriptors into lazy relations.
///
/// Never touches catalog state.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    formats: Arc<FormatRegistry>,
    published: Arc<dyn PublishRegistry>,
    accelerator: Arc<dyn AcceleratedBackend>,
}

impl SourceResolver {
    pub fn new(
        formats: Arc<FormatRegistry>,
        published: Arc<dyn PublishRegistry>,
        accelerator: Arc<dyn AcceleratedBackend>,
    ) -> Self {
        SourceResolver {
            formats,
            published,
            accelerator,
        }
    }

    pub fn formats(&self) -> &Arc<FormatRegistry> {
        &self.formats
    }

    pub fn accelerator(&self) -> &Arc<dyn AcceleratedBackend> {
        &self.accelerator
    }

    /// Check that a descriptor could be resolved, without reading data.
    ///
    /// For file sources this checks the format and reader options.
    pub fn validate(&self, descriptor: &SourceDescriptor, backend: Backend) -> Result<()> {
        check_backend(backend, self.accelerator.as_ref())?;

        match descriptor {
            SourceDescriptor::Published { .. } => Ok(()),
            SourceDescriptor::File {
                format,
                location,
                options,
            } => {
                let factory = self.formats.resolve(format)?;
                for &key in factory.required_options() {
                    let present = match key {
                        "location" => !location.is_empty(),
                        other => options.contains_key(other),
                    };
                    if !present {
                        return Err(DbError::missing_option(key).with_field("format", format));
                    }
                }
                factory.validate_options(options)
            }
        }
    }

    /// Resolve a descriptor into a lazy relation.
    ///
    /// Backend availability is checked before anything is read.
    pub fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        backend: Backend,
    ) -> Result<Arc<dyn LazyRelation>> {
        trace!(%descriptor, %backend, "resolving source");
        self.validate(descriptor, backend)?;

        let relation = match descriptor {
            SourceDescriptor::Published { name } => self
                .published
                .lookup(name)
                .ok_or_else(|| DbError::source_not_found(name))?,
            SourceDescriptor::File {
                format,
                location,
                options,
            } => {
                let factory = self.formats.resolve(format)?;
                factory.read(location, options)?
            }
        };

        debug!(
            %descriptor,
            num_partitions = relation.num_partitions(),
            "resolved source"
        );

        match backend {
            Backend::Cpu => Ok(relation),
            Backend::Accelerated => Ok(Arc::new(AcceleratedRelation::new(
                relation,
                self.accelerator.clone(),
            ))),
        }
    }
}
