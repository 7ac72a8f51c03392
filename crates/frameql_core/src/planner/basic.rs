use std::sync::Arc;

use frameql_error::{DbError, Result};
use frameql_parser::ast::{SelectExpr, SelectItem, SelectStatement};
use frameql_parser::statement::Statement;

use super::operators::{CountRelation, ProjectRelation, ProjectionExpr};
use super::{QueryPlan, QueryPlanner};
use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::field::{Field, Schema};
use crate::arrays::scalar::ScalarValue;
use crate::catalog::Catalog;
use crate::frame::LazyRelation;
use crate::frame::memory::MemoryFrame;

/// Planner for simple single-relation SELECT queries.
///
/// Supports `*`, column references, literals, `COUNT(*)` and `LIMIT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPlanner;

impl QueryPlanner for BasicPlanner {
    fn parse_and_plan(&self, sql: &str) -> Result<Arc<dyn QueryPlan>> {
        let mut stmts = frameql_parser::parse(sql)?;
        if stmts.len() != 1 {
            return Err(DbError::parse(format!(
                "Expected exactly one query, got {} statements",
                stmts.len()
            )));
        }

        match stmts.pop() {
            Some(Statement::Query(select)) => Ok(Arc::new(SelectPlan::try_new(sql, select)?)),
            _ => Err(DbError::parse("Expected a SELECT query")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    sql: String,
    select: SelectStatement,
}

impl SelectPlan {
    pub fn try_new(sql: impl Into<String>, select: SelectStatement) -> Result<Self> {
        let counts = select
            .projections
            .iter()
            .filter(|item| {
                matches!(
                    item,
                    SelectItem::Expr {
                        expr: SelectExpr::CountStar,
                        ..
                    }
                )
            })
            .count();

        if counts > 0 && counts != select.projections.len() {
            return Err(DbError::parse(
                "COUNT(*) cannot be combined with non-aggregate expressions",
            ));
        }

        Ok(SelectPlan {
            sql: sql.into(),
            select,
        })
    }

    fn is_count(&self) -> bool {
        matches!(
            self.select.projections.first(),
            Some(SelectItem::Expr {
                expr: SelectExpr::CountStar,
                ..
            })
        )
    }

    fn bind_input(&self, catalog: &Catalog) -> Result<Arc<dyn LazyRelation>> {
        match &self.select.from {
            Some(name) => Ok(catalog.resolve(name.as_str())?.into_lazy()),
            None => {
                // No FROM, produce a single row with no columns.
                let frame = MemoryFrame::try_new(
                    Schema::empty(),
                    vec![vec![Batch::empty_with_num_rows(1)]],
                )?;
                Ok(Arc::new(frame))
            }
        }
    }
}

impl QueryPlan for SelectPlan {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn referenced_relations(&self) -> Vec<String> {
        self.select
            .from
            .iter()
            .map(|name| name.value.clone())
            .collect()
    }

    fn bind(&self, catalog: &Catalog) -> Result<Arc<dyn LazyRelation>> {
        let input = self.bind_input(catalog)?;

        if self.is_count() {
            let fields = self.select.projections.iter().map(|item| {
                let name = match item {
                    SelectItem::Expr {
                        alias: Some(alias), ..
                    } => alias.value.clone(),
                    _ => "count".to_string(),
                };
                Field::new(name, DataType::Int64, false)
            });
            return Ok(Arc::new(CountRelation {
                input,
                schema: Schema::new(fields),
            }));
        }

        let input_schema = input.schema();
        let mut fields = Vec::new();
        let mut exprs = Vec::new();

        for item in &self.select.projections {
            match item {
                SelectItem::Wildcard => {
                    for (idx, field) in input_schema.fields.iter().enumerate() {
                        fields.push(field.clone());
                        exprs.push(ProjectionExpr::Column(idx));
                    }
                }
                SelectItem::Expr { expr, alias } => {
                    let (field, expr) = match expr {
                        SelectExpr::Column(col) => {
                            let idx = input_schema.find_field(col.as_str()).ok_or_else(|| {
                                let columns = input_schema.names().collect::<Vec<_>>().join(", ");
                                DbError::parse(format!("Missing column '{col}'"))
                                    .with_field("columns", columns)
                            })?;
                            (input_schema.fields[idx].clone(), ProjectionExpr::Column(idx))
                        }
                        SelectExpr::Literal(lit) => {
                            let val = ScalarValue::try_from(lit)?;
                            let field = Field::new(lit.to_string(), val.datatype(), val.is_null());
                            (field, ProjectionExpr::Constant(val))
                        }
                        SelectExpr::CountStar => {
                            return Err(DbError::parse("Unexpected COUNT(*)"));
                        }
                    };

                    let field = match alias {
                        Some(alias) => {
                            Field::new(alias.value.clone(), field.datatype, field.nullable)
                        }
                        None => field,
                    };
                    fields.push(field);
                    exprs.push(expr);
                }
            }
        }

        let limit = self
            .select
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(Arc::new(ProjectRelation {
            input,
            schema: Schema::new(fields),
            exprs,
            limit,
        }))
    }
}

#[cfg(test)]
mod tests {
    use frameql_error::ErrorKind;

    use super::*;
    use crate::arrays::array::Array;
    use crate::catalog::create::CreateRelationInfo;
    use crate::catalog::entry::Producer;
    use crate::catalog::testutil::test_catalog;
    use crate::frame::{collect_batches, count_rows};

    fn catalog_with_t1() -> Catalog {
        let catalog = test_catalog();
        let schema = Schema::new([
            Field::new("a", DataType::Int64, true),
            Field::new("B", DataType::Utf8, true),
        ]);
        let batch = Batch::try_new([
            Array::Int64(vec![Some(1), Some(2), Some(3)]),
            Array::Utf8(vec![Some("x".to_string()), None, Some("z".to_string())]),
        ])
        .unwrap();
        let frame = MemoryFrame::try_from_batches(schema, [batch.clone(), batch], 2).unwrap();
        catalog
            .create_view(CreateRelationInfo::new("t1", Producer::Frame(Arc::new(frame))))
            .unwrap();
        catalog
    }

    fn plan(sql: &str) -> Arc<dyn QueryPlan> {
        BasicPlanner.parse_and_plan(sql).unwrap()
    }

    #[test]
    fn select_star() {
        let catalog = catalog_with_t1();
        let rel = plan("SELECT * FROM t1").bind(&catalog).unwrap();
        assert_eq!(vec!["a", "B"], rel.schema().names().collect::<Vec<_>>());
        assert_eq!(6, count_rows(rel.as_ref()).unwrap());
    }

    #[test]
    fn select_columns_case_insensitive() {
        let catalog = catalog_with_t1();
        let rel = plan("SELECT b AS renamed, 5 FROM T1 LIMIT 4")
            .bind(&catalog)
            .unwrap();
        assert_eq!(
            vec!["renamed", "5"],
            rel.schema().names().collect::<Vec<_>>()
        );
        let batches = collect_batches(rel.as_ref()).unwrap();
        assert_eq!(4, batches.iter().map(|b| b.num_rows()).sum::<usize>());
        assert_eq!(
            Some(vec![ScalarValue::from("x"), ScalarValue::Int64(5)]),
            batches[0].row(0)
        );
    }

    #[test]
    fn select_count() {
        let catalog = catalog_with_t1();
        let rel = plan("SELECT COUNT(*) FROM t1").bind(&catalog).unwrap();
        assert_eq!(vec!["count"], rel.schema().names().collect::<Vec<_>>());
        let batches = collect_batches(rel.as_ref()).unwrap();
        assert_eq!(Some(vec![ScalarValue::Int64(6)]), batches[0].row(0));
    }

    #[test]
    fn select_without_from() {
        let catalog = test_catalog();
        let rel = plan("SELECT 1 AS a, 'b'").bind(&catalog).unwrap();
        let batches = collect_batches(rel.as_ref()).unwrap();
        assert_eq!(
            Some(vec![ScalarValue::Int64(1), ScalarValue::from("b")]),
            batches[0].row(0)
        );
    }

    #[test]
    fn plan_errors() {
        for sql in [
            "SELECT COUNT(*), a FROM t1",
            "DROP TABLE t1",
            "SELECT 1; SELECT 2",
            "SELECT FROM",
        ] {
            let err = BasicPlanner.parse_and_plan(sql).unwrap_err();
            assert_eq!(ErrorKind::Parse, err.kind(), "sql: {sql}");
        }
    }

    #[test]
    fn bind_errors() {
        let catalog = catalog_with_t1();

        let err = plan("SELECT c FROM t1").bind(&catalog).unwrap_err();
        assert_eq!(ErrorKind::Parse, err.kind());

        let err = plan("SELECT * FROM t2").bind(&catalog).unwrap_err();
        assert_eq!(ErrorKind::RelationNotFound, err.kind());
    }

    #[test]
    fn referenced_relations() {
        assert_eq!(vec!["t1"], plan("select * from t1").referenced_relations());
        assert!(plan("select 1").referenced_relations().is_empty());
    }
}
