use frameql_error::{DbError, Result};

use super::{LazyRelation, check_partition_idx};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;

/// An already computed frame held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFrame {
    schema: Schema,
    partitions: Vec<Vec<Batch>>,
}

impl MemoryFrame {
    /// Create a frame from explicit partitions.
    pub fn try_new(schema: Schema, partitions: Vec<Vec<Batch>>) -> Result<Self> {
        for batch in partitions.iter().flatten() {
            if batch.num_columns() != schema.len() {
                return Err(DbError::new("Batch does not match frame schema")
                    .with_field("expected_columns", schema.len())
                    .with_field("got_columns", batch.num_columns()));
            }
        }

        // Always at least one partition so readers have something to read.
        let partitions = if partitions.is_empty() {
            vec![Vec::new()]
        } else {
            partitions
        };

        Ok(MemoryFrame { schema, partitions })
    }

    /// Create a frame by distributing batches round robin across
    /// `num_partitions` partitions.
    pub fn try_from_batches(
        schema: Schema,
        batches: impl IntoIterator<Item = Batch>,
        num_partitions: usize,
    ) -> Result<Self> {
        let num_partitions = usize::max(num_partitions, 1);
        let mut partitions: Vec<Vec<Batch>> = (0..num_partitions).map(|_| Vec::new()).collect();
        for (idx, batch) in batches.into_iter().enumerate() {
            partitions[idx % num_partitions].push(batch);
        }
        Self::try_new(schema, partitions)
    }

    pub fn partitions(&self) -> &[Vec<Batch>] {
        &self.partitions
    }
}

impl LazyRelation for MemoryFrame {
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
