//! Planning for query bodies.
pub mod basic;
pub mod operators;

use std::fmt::Debug;
use std::sync::Arc;

use frameql_error::Result;

use crate::catalog::Catalog;
use crate::frame::LazyRelation;

/// A planned query that can be bound against a catalog any number of times.
pub trait QueryPlan: Debug + Sync + Send {
    /// SQL text the plan was created from.
    fn sql(&self) -> &str;

    /// Names of relations the query reads from.
    fn referenced_relations(&self) -> Vec<String>;

    /// Resolve referenced relations and produce the query output.
    ///
    /// Names are resolved at bind time, so binding again observes any
    /// changes to the relations the query reads from.
    fn bind(&self, catalog: &Catalog) -> Result<Arc<dyn LazyRelation>>;
}

pub trait QueryPlanner: Debug + Sync + Send {
    /// Parse and plan a query. Failures are parse errors.
    fn parse_and_plan(&self, sql: &str) -> Result<Arc<dyn QueryPlan>>;
}
