//! Partitioned, re-evaluable relation data.
pub mod memory;

use std::fmt::Debug;

use frameql_error::{DbError, Result};

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;

/// A partitioned frame whose data is produced on demand.
///
/// Every call to `read_partition` evaluates the partition again, so readers
/// observe the current state of whatever is upstream (a file on disk, a
/// published dataset, another relation).
pub trait LazyRelation: Debug + Sync + Send {
    fn schema(&self) -> &Schema;

    fn num_partitions(&self) -> usize;

    /// Evaluate a single partition.
    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>>;
}

/// Read every partition of a relation in partition order.
pub fn collect_batches(relation: &dyn LazyRelation) -> Result<Vec<Batch>> {
    let mut batches = Vec::new();
    for partition in 0..relation.num_partitions() {
        batches.extend(relation.read_partition(partition)?);
    }
    Ok(batches)
}

/// Count the rows in a relation by evaluating every partition.
pub fn count_rows(relation: &dyn LazyRelation) -> Result<usize> {
    let mut count = 0;
    for partition in 0..relation.num_partitions() {
        count += relation
            .read_partition(partition)?
            .iter()
            .map(|b| b.num_rows())
            .sum::<usize>();
    }
    Ok(count)
}

pub fn check_partition_idx(partition: usize, num_partitions: usize) -> Result<()> {
    if partition >= num_partitions {
        return Err(DbError::new("Partition index out of range")
            .with_field("partition", partition)
            .with_field("num_partitions", num_partitions));
    }
    Ok(())
}
