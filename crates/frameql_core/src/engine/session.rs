use std::sync::Arc;

use frameql_error::{DbError, Result};
use frameql_parser::statement::Statement;
use parking_lot::RwLock;
use tracing::{debug, info_span};

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::arrays::scalar::ScalarValue;
use crate::backend::Backend;
use crate::catalog::Catalog;
use crate::catalog::create::{CreateOutcome, CreateRelationInfo, OnConflict};
use crate::catalog::drop::{DropInfo, DropOutcome};
use crate::catalog::entry::{Producer, RelationHandle, RelationInfo};
use crate::config::session::SessionConfig;
use crate::frame::LazyRelation;
use crate::frame::memory::MemoryFrame;
use crate::materialize::MaterializedRelation;
use crate::planner::QueryPlanner;
use crate::source::SourceDescriptor;
use crate::statement::{StatementContext, StatementResult, execute_statement};

/// Options for relations created through the session API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelationOptions {
    /// Materialize when created. Only valid for tables.
    pub persist: bool,
    /// Backend to use, falling back to the session's default.
    pub backend: Option<Backend>,
    pub on_conflict: OnConflict,
}

impl RelationOptions {
    pub fn persisted() -> Self {
        RelationOptions {
            persist: true,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }
}

/// A session owning a single catalog.
///
/// The catalog lives as long as the session. Statements may be executed
/// concurrently from multiple threads.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    planner: Arc<dyn QueryPlanner>,
    config: RwLock<SessionConfig>,
}

impl Session {
    pub(crate) fn new(catalog: Catalog, planner: Arc<dyn QueryPlanner>) -> Self {
        Session {
            catalog,
            planner,
            config: RwLock::new(SessionConfig::default()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parse and execute all statements in `sql`.
    ///
    /// Execution stops at the first failing statement.
    pub fn sql(&self, sql: &str) -> Result<Vec<StatementResult>> {
        let stmts = frameql_parser::parse(sql)?;
        stmts
            .into_iter()
            .map(|stmt| self.execute(stmt))
            .collect()
    }

    /// Execute SQL, returning the rows of the last statement.
    pub fn query(&self, sql: &str) -> Result<MaterializedRelation> {
        self.sql(sql)?
            .pop()
            .ok_or_else(|| DbError::new("No statements to execute"))?
            .try_into_query()
    }

    pub fn execute(&self, stmt: Statement) -> Result<StatementResult> {
        let config = self.config.read().clone();
        let _span = info_span!(
            "execute_statement",
            application_name = %config.application_name,
        )
        .entered();
        let ctx = StatementContext {
            catalog: &self.catalog,
            planner: self.planner.as_ref(),
            config: &config,
        };
        let result = execute_statement(ctx, stmt)?;
        debug!("executed statement");
        Ok(result)
    }

    /// Create a table from in-memory batches.
    ///
    /// Batches are split across the session's configured number of
    /// partitions.
    pub fn create_table_from_batches(
        &self,
        name: &str,
        schema: Schema,
        batches: impl IntoIterator<Item = Batch>,
        opts: RelationOptions,
    ) -> Result<CreateOutcome> {
        let partitions = self.config.read().partitions as usize;
        let frame = MemoryFrame::try_from_batches(schema, batches, partitions)?;
        self.create_table_from_frame(name, Arc::new(frame), opts)
    }

    /// Create a table from an existing partitioned frame.
    pub fn create_table_from_frame(
        &self,
        name: &str,
        frame: Arc<dyn LazyRelation>,
        opts: RelationOptions,
    ) -> Result<CreateOutcome> {
        self.catalog
            .create_table(self.create_info(name, Producer::Frame(frame), opts), opts.persist)
    }

    pub fn create_table_from_source(
        &self,
        name: &str,
        source: SourceDescriptor,
        opts: RelationOptions,
    ) -> Result<CreateOutcome> {
        self.catalog
            .create_table(self.create_info(name, Producer::Source(source), opts), opts.persist)
    }

    /// Create a table from a query. The query is planned now and bound when
    /// the table is read (or materialized).
    pub fn create_table_from_query(
        &self,
        name: &str,
        sql: &str,
        opts: RelationOptions,
    ) -> Result<CreateOutcome> {
        let plan = self.planner.parse_and_plan(sql)?;
        self.catalog
            .create_table(self.create_info(name, Producer::Query(plan), opts), opts.persist)
    }

    pub fn create_view_from_source(
        &self,
        name: &str,
        source: SourceDescriptor,
        opts: RelationOptions,
    ) -> Result<CreateOutcome> {
        if opts.persist {
            return Err(DbError::invalid_option("persist", "views cannot be persisted"));
        }
        self.catalog
            .create_view(self.create_info(name, Producer::Source(source), opts))
    }

    pub fn create_view_from_query(
        &self,
        name: &str,
        sql: &str,
        opts: RelationOptions,
    ) -> Result<CreateOutcome> {
        if opts.persist {
            return Err(DbError::invalid_option("persist", "views cannot be persisted"));
        }
        let plan = self.planner.parse_and_plan(sql)?;
        self.catalog
            .create_view(self.create_info(name, Producer::Query(plan), opts))
    }

    pub fn drop_table(&self, name: &str, if_exists: bool) -> Result<DropOutcome> {
        self.catalog.drop_relation(&DropInfo::table(name, if_exists))
    }

    pub fn drop_view(&self, name: &str, if_exists: bool) -> Result<DropOutcome> {
        self.catalog.drop_relation(&DropInfo::view(name, if_exists))
    }

    pub fn resolve(&self, name: &str) -> Result<RelationHandle> {
        self.catalog.resolve(name)
    }

    pub fn materialize_table(&self, name: &str) -> Result<bool> {
        self.catalog.materialize_table(name)
    }

    pub fn list_relations(&self) -> Vec<RelationInfo> {
        self.catalog.list_relations()
    }

    pub fn set_setting(&self, name: &str, value: impl Into<ScalarValue>) -> Result<()> {
        self.config.write().set_from_scalar(name, value.into())
    }

    pub fn get_setting(&self, name: &str) -> Result<ScalarValue> {
        self.config.read().get_as_scalar(name)
    }

    pub fn reset_setting(&self, name: &str) -> Result<()> {
        self.config.write().reset(name)
    }

    fn create_info(
        &self,
        name: &str,
        producer: Producer,
        opts: RelationOptions,
    ) -> CreateRelationInfo {
        let backend = opts
            .backend
            .unwrap_or_else(|| self.config.read().default_backend);
        CreateRelationInfo::new(name, producer)
            .with_backend(backend)
            .with_on_conflict(opts.on_conflict)
    }
}
