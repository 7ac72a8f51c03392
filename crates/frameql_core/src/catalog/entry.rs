use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::frame::LazyRelation;
use crate::materialize::MaterializedRelation;
use crate::planner::QueryPlan;
use crate::source::SourceDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Table,
    View,
}

impl RelationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Knows how to (re-)derive a relation's data.
#[derive(Debug, Clone)]
pub enum Producer {
    /// Resolved through the source resolver on every evaluation.
    Source(SourceDescriptor),
    /// Query plan bound against the catalog on every evaluation.
    Query(Arc<dyn QueryPlan>),
    /// Frame provided directly through the API.
    Frame(Arc<dyn LazyRelation>),
}

impl Producer {
    /// Names of relations this producer reads from.
    pub fn referenced_relations(&self) -> Vec<String> {
        match self {
            Self::Query(plan) => plan.referenced_relations(),
            Self::Source(_) | Self::Frame(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(desc) => write!(f, "{desc}"),
            Self::Query(plan) => write!(f, "query:{}", plan.sql()),
            Self::Frame(frame) => write!(f, "frame:{} partitions", frame.num_partitions()),
        }
    }
}

/// A relation bound in the catalog.
///
/// Immutable once bound, except for a table's snapshot slot which can be
/// filled once.
#[derive(Debug)]
pub struct Relation {
    /// Name as written when created.
    pub name: String,
    pub backend: Backend,
    pub producer: Producer,
    pub created_at: DateTime<Utc>,
    pub(crate) inner: RelationInner,
}

#[derive(Debug)]
pub(crate) enum RelationInner {
    View,
    Table(TableState),
}

#[derive(Debug, Default)]
pub(crate) struct TableState {
    /// Set when the table is materialized. Only written while holding the
    /// catalog's write lock.
    pub(crate) snapshot: OnceLock<Arc<MaterializedRelation>>,
}

impl Relation {
    pub(crate) fn new_view(name: String, backend: Backend, producer: Producer) -> Self {
        Relation {
            name,
            backend,
            producer,
            created_at: Utc::now(),
            inner: RelationInner::View,
        }
    }

    pub(crate) fn new_table(
        name: String,
        backend: Backend,
        producer: Producer,
        snapshot: Option<Arc<MaterializedRelation>>,
    ) -> Self {
        let state = TableState::default();
        if let Some(snapshot) = snapshot {
            // Fresh lock, can't already be set.
            let _ = state.snapshot.set(snapshot);
        }
        Relation {
            name,
            backend,
            producer,
            created_at: Utc::now(),
            inner: RelationInner::Table(state),
        }
    }

    pub fn kind(&self) -> RelationKind {
        match self.inner {
            RelationInner::View => RelationKind::View,
            RelationInner::Table(_) => RelationKind::Table,
        }
    }

    /// Get the stored snapshot if this is a materialized table.
    pub fn snapshot(&self) -> Option<&Arc<MaterializedRelation>> {
        match &self.inner {
            RelationInner::View => None,
            RelationInner::Table(state) => state.snapshot.get(),
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.snapshot().is_some()
    }
}

/// What resolving a name produces.
#[derive(Debug, Clone)]
pub enum RelationHandle {
    /// Freshly evaluated producer.
    Lazy(Arc<dyn LazyRelation>),
    /// Snapshot stored on a materialized table.
    Materialized(Arc<MaterializedRelation>),
}

impl RelationHandle {
    pub fn is_materialized(&self) -> bool {
        matches!(self, Self::Materialized(_))
    }

    pub fn into_lazy(self) -> Arc<dyn LazyRelation> {
        match self {
            Self::Lazy(rel) => rel,
            Self::Materialized(rel) => rel as Arc<dyn LazyRelation>,
        }
    }

    pub fn as_lazy(&self) -> &dyn LazyRelation {
        match self {
            Self::Lazy(rel) => rel.as_ref(),
            Self::Materialized(rel) => rel.as_ref() as &dyn LazyRelation,
        }
    }
}

/// Summary of a bound relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInfo {
    pub name: String,
    pub kind: RelationKind,
    pub backend: Backend,
    pub materialized: bool,
    pub producer: String,
}

impl From<&Relation> for RelationInfo {
    fn from(rel: &Relation) -> Self {
        RelationInfo {
            name: rel.name.clone(),
            kind: rel.kind(),
            backend: rel.backend,
            materialized: rel.is_materialized(),
            producer: rel.producer.to_string(),
        }
    }
}
