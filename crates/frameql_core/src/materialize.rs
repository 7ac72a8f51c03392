use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use frameql_error::{DbError, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::backend::Backend;
use crate::frame::{LazyRelation, check_partition_idx};

/// A fully evaluated relation, decoupled from whatever produced it.
#[derive(Debug, Clone)]
pub struct MaterializedRelation {
    schema: Schema,
    partitions: Vec<Vec<Batch>>,
    backend: Backend,
    materialized_at: DateTime<Utc>,
}

impl MaterializedRelation {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn materialized_at(&self) -> DateTime<Utc> {
        self.materialized_at
    }

    pub fn partitions(&self) -> &[Vec<Batch>] {
        &self.partitions
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.partitions.iter().flatten()
    }

    pub fn num_rows(&self) -> usize {
        self.batches().map(|b| b.num_rows()).sum()
    }
}

impl LazyRelation for MaterializedRelation {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
        check_partition_idx(partition, self.partitions.len())?;
        Ok(self.partitions[partition].clone())
    }
}

/// Forces lazy relations into materialized snapshots.
///
/// Partitions are evaluated in parallel on a dedicated thread pool.
#[derive(Clone)]
pub struct Materializer {
    pool: Arc<ThreadPool>,
}

impl fmt::Debug for Materializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer")
            .field("num_threads", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

impl Materializer {
    pub fn try_new() -> Result<Self> {
        Self::try_new_with_threads(0)
    }

    /// Create a materializer using a fixed number of threads. Zero lets rayon
    /// pick.
    pub fn try_new_with_threads(num_threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|idx| format!("frameql-materialize-{idx}"))
            .build()
            .map_err(|e| DbError::with_source("Failed to build thread pool", Box::new(e)))?;

        Ok(Materializer {
            pool: Arc::new(pool),
        })
    }

    /// Evaluate every partition of `relation`.
    ///
    /// The first partition error is returned and nothing is produced.
    pub fn materialize(
        &self,
        relation: &dyn LazyRelation,
        backend: Backend,
    ) -> Result<MaterializedRelation> {
        let num_partitions = relation.num_partitions();
        debug!(num_partitions, %backend, "materializing relation");

        let partitions = self.pool.install(|| {
            (0..num_partitions)
                .into_par_iter()
                .map(|partition| relation.read_partition(partition))
                .collect::<Result<Vec<_>>>()
        })?;

        let materialized = MaterializedRelation {
            schema: relation.schema().clone(),
            partitions,
            backend,
            materialized_at: Utc::now(),
        };

        debug!(num_rows = materialized.num_rows(), "materialized relation");

        Ok(materialized)
    }
}
