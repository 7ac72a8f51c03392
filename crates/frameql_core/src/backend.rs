//! Execution backends a relation can be bound to.
use std::fmt;
use std::sync::Arc;

use frameql_error::{DbError, ErrorKind, Result};
use serde::{Deserialize, Serialize};

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::frame::LazyRelation;

/// Backend a relation's partitions are represented with.
///
/// Fixed when the relation is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Backend {
    #[default]
    Cpu,
    Accelerated,
}

impl Backend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Accelerated => "accelerated",
        }
    }

    /// Parse a backend from its name. "gpu" is accepted as an alias for the
    /// accelerated backend.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cpu" => Some(Self::Cpu),
            "accelerated" | "gpu" => Some(Self::Accelerated),
            _ => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alternate partition representation.
pub trait AcceleratedBackend: fmt::Debug + Sync + Send {
    fn name(&self) -> &str;

    /// If the backend can be used in this process.
    fn is_available(&self) -> bool;

    /// Convert a host batch into the accelerated representation.
    fn to_device(&self, batch: Batch) -> Result<Batch>;
}

/// Placeholder used when no accelerated library is linked in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAcceleratedBackend;

impl AcceleratedBackend for NoAcceleratedBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn to_device(&self, _batch: Batch) -> Result<Batch> {
        Err(accelerated_unavailable(self))
    }
}

/// Check that `backend` can be used in this process.
pub fn check_backend(backend: Backend, accelerator: &dyn AcceleratedBackend) -> Result<()> {
    match backend {
        Backend::Cpu => Ok(()),
        Backend::Accelerated if accelerator.is_available() => Ok(()),
        Backend::Accelerated => Err(accelerated_unavailable(accelerator)),
    }
}

fn accelerated_unavailable(accelerator: &dyn AcceleratedBackend) -> DbError {
    DbError::new("Accelerated backend requested, but no accelerated library is available")
        .with_kind(ErrorKind::AcceleratedBackendUnavailable)
        .with_field("accelerator", accelerator.name())
}

/// Wraps a relation so that partitions are converted to the accelerated
/// representation as they're read.
#[derive(Debug)]
pub struct AcceleratedRelation {
    inner: Arc<dyn LazyRelation>,
    accelerator: Arc<dyn AcceleratedBackend>,
}

impl AcceleratedRelation {
    pub fn new(inner: Arc<dyn LazyRelation>, accelerator: Arc<dyn AcceleratedBackend>) -> Self {
        AcceleratedRelation { inner, accelerator }
    }
}

impl LazyRelation for AcceleratedRelation {
    fn schema(&self) -> &Schema {
        self.inner.schema()
    }

    fn num_partitions(&self) -> usize {
        self.inner.num_partitions()
    }

    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
        self.inner
            .read_partition(partition)?
            .into_iter()
            .map(|batch| self.accelerator.to_device(batch))
            .collect()
    }
}
