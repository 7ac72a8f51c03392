use std::sync::Arc;

use frameql_error::{OptionExt, Result};

use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::arrays::scalar::ScalarValue;
use crate::frame::{LazyRelation, check_partition_idx};

/// A single output column of a projection.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionExpr {
    Column(usize),
    Constant(ScalarValue),
}

impl ProjectionExpr {
    fn eval(&self, batch: &Batch) -> Result<Array> {
        match self {
            Self::Column(idx) => batch.column(*idx).cloned().required("projected column"),
            Self::Constant(val) => Ok(Array::repeat(val, batch.num_rows())),
        }
    }
}

/// Projects expressions over an input relation, with an optional limit.
///
/// With a limit, all input partitions are read through a single output
/// partition so the limit applies across the whole input.
#[derive(Debug)]
pub struct ProjectRelation {
    pub(crate) input: Arc<dyn LazyRelation>,
    pub(crate) schema: Schema,
    pub(crate) exprs: Vec<ProjectionExpr>,
    pub(crate) limit: Option<usize>,
}

impl ProjectRelation {
    fn project_batch(&self, batch: &Batch) -> Result<Batch> {
        if self.exprs.is_empty() {
            return Ok(Batch::empty_with_num_rows(batch.num_rows()));
        }
        let cols = self
            .exprs
            .iter()
            .map(|expr| expr.eval(batch))
            .collect::<Result<Vec<_>>>()?;
        Batch::try_new(cols)
    }
}

impl LazyRelation for ProjectRelation {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn num_partitions(&self) -> usize {
        match self.limit {
            Some(_) => 1,
            None => self.input.num_partitions(),
        }
    }

    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
        check_partition_idx(partition, self.num_partitions())?;

        let limit = match self.limit {
            Some(limit) => limit,
            None => {
                return self
                    .input
                    .read_partition(partition)?
                    .iter()
                    .map(|b| self.project_batch(b))
                    .collect();
            }
        };

        let mut remaining = limit;
        let mut out = Vec::new();
        for input_partition in 0..self.input.num_partitions() {
            for batch in self.input.read_partition(input_partition)? {
                if remaining == 0 {
                    return Ok(out);
                }
                let mut batch = self.project_batch(&batch)?;
                batch.truncate(remaining);
                remaining -= batch.num_rows();
                out.push(batch);
            }
        }

        Ok(out)
    }
}

/// Counts all rows in the input, producing a single row.
#[derive(Debug)]
pub struct CountRelation {
    pub(crate) input: Arc<dyn LazyRelation>,
    pub(crate) schema: Schema,
}

impl LazyRelation for CountRelation {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn num_partitions(&self) -> usize {
        1
    }

    fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
        check_partition_idx(partition, 1)?;

        let mut count = 0;
        for input_partition in 0..self.input.num_partitions() {
            count += self
                .input
                .read_partition(input_partition)?
                .iter()
                .map(|b| b.num_rows())
                .sum::<usize>();
        }

        // One column per COUNT(*) in the select list.
        let cols = (0..self.schema.len()).map(|_| Array::Int64(vec![Some(count as i64)]));
        Ok(vec![Batch::try_new(cols)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;
    use crate::frame::collect_batches;
    use crate::frame::memory::MemoryFrame;

    fn input() -> Arc<dyn LazyRelation> {
        let schema = Schema::new([
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Utf8, true),
        ]);
        let batches = (0..4).map(|i| {
            Batch::try_new([
                Array::Int64(vec![Some(i), Some(i + 10)]),
                Array::Utf8(vec![Some(format!("v{i}")), None]),
            ])
            .unwrap()
        });
        Arc::new(MemoryFrame::try_from_batches(schema, batches, 2).unwrap())
    }

    #[test]
    fn project_with_constant() {
        let rel = ProjectRelation {
            input: input(),
            schema: Schema::new([
                Field::new("b", DataType::Utf8, true),
                Field::new("one", DataType::Int64, false),
            ]),
            exprs: vec![
                ProjectionExpr::Column(1),
                ProjectionExpr::Constant(ScalarValue::Int64(1)),
            ],
            limit: None,
        };

        assert_eq!(2, rel.num_partitions());
        let batches = collect_batches(&rel).unwrap();
        assert_eq!(4, batches.len());
        assert_eq!(
            Some(vec![ScalarValue::from("v0"), ScalarValue::Int64(1)]),
            batches[0].row(0)
        );
    }

    #[test]
    fn project_with_limit() {
        let rel = ProjectRelation {
            input: input(),
            schema: Schema::new([Field::new("a", DataType::Int64, true)]),
            exprs: vec![ProjectionExpr::Column(0)],
            limit: Some(3),
        };

        assert_eq!(1, rel.num_partitions());
        let batches = rel.read_partition(0).unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(3, rows);
    }

    #[test]
    fn count_rows() {
        let rel = CountRelation {
            input: input(),
            schema: Schema::new([Field::new("count", DataType::Int64, false)]),
        };
        let batches = rel.read_partition(0).unwrap();
        assert_eq!(Some(vec![ScalarValue::Int64(8)]), batches[0].row(0));
    }
}
