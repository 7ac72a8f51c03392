//! Execution of parsed statements against a catalog.
pub mod options;

use std::fmt;

use frameql_error::{DbError, Result};
use frameql_parser::ast::{
    CreateKind, CreateRelation, CreateSource, DropStatement, DropType, SelectStatement,
};
use frameql_parser::statement::Statement;
use tracing::debug;

use self::options::CreateOptions;
use crate::arrays::format::pretty_print;
use crate::backend::Backend;
use crate::catalog::Catalog;
use crate::catalog::create::{CreateOutcome, CreateRelationInfo, OnConflict};
use crate::catalog::drop::{DropInfo, DropObject, DropOutcome};
use crate::catalog::entry::{Producer, RelationKind};
use crate::config::session::SessionConfig;
use crate::frame::LazyRelation;
use crate::materialize::MaterializedRelation;
use crate::planner::QueryPlanner;

/// Everything a statement needs to execute.
#[derive(Debug, Clone, Copy)]
pub struct StatementContext<'a> {
    pub catalog: &'a Catalog,
    pub planner: &'a dyn QueryPlanner,
    pub config: &'a SessionConfig,
}

/// Outcome of executing a single statement.
#[derive(Debug, Clone)]
pub enum StatementResult {
    Create {
        name: String,
        kind: RelationKind,
        outcome: CreateOutcome,
    },
    Drop {
        name: String,
        outcome: DropOutcome,
    },
    Query(MaterializedRelation),
}

impl StatementResult {
    /// Get the rows of a query result.
    pub fn try_into_query(self) -> Result<MaterializedRelation> {
        match self {
            Self::Query(rel) => Ok(rel),
            other => Err(DbError::new(format!(
                "Statement did not produce rows: {other}"
            ))),
        }
    }
}

impl fmt::Display for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create {
                name,
                kind,
                outcome,
            } => write!(f, "CREATE {} {name} ({outcome})", kind.as_str().to_uppercase()),
            Self::Drop { name, outcome } => write!(f, "DROP {name} ({outcome})"),
            Self::Query(rel) => {
                let table = pretty_print(rel.schema(), rel.batches()).map_err(|_| fmt::Error)?;
                write!(f, "{table}")
            }
        }
    }
}

pub fn execute_statement(ctx: StatementContext, stmt: Statement) -> Result<StatementResult> {
    match stmt {
        Statement::Create(create) => handle_create(ctx, create),
        Statement::Drop(drop) => handle_drop(ctx, drop),
        Statement::Query(select) => handle_query(ctx, select),
    }
}

/// CREATE TABLE/VIEW ... WITH (...) | AS (...)
pub fn handle_create(ctx: StatementContext, create: CreateRelation) -> Result<StatementResult> {
    let on_conflict = OnConflict::from_modifiers(create.or_replace, create.if_not_exists);
    let name = create.name.value;

    let (producer, persist, backend) = match create.source {
        CreateSource::With(with) => {
            let opts =
                CreateOptions::try_from_with_options(&with, ctx.catalog.resolver().formats())?;
            if create.kind == CreateKind::View && opts.persist.is_some() {
                return Err(DbError::invalid_option(
                    "persist",
                    "views cannot be persisted",
                ));
            }
            (
                Producer::Source(opts.source),
                opts.persist.unwrap_or(false),
                opts.backend,
            )
        }
        CreateSource::Query(query) => {
            let plan = ctx.planner.parse_and_plan(&query)?;
            (
                Producer::Query(plan),
                ctx.config.persist_create_table_as,
                None,
            )
        }
    };

    let info = CreateRelationInfo::new(name.clone(), producer)
        .with_backend(backend.unwrap_or(ctx.config.default_backend))
        .with_on_conflict(on_conflict);

    debug!(%name, kind = %create.kind, ?on_conflict, "handling create");

    let (kind, outcome) = match create.kind {
        CreateKind::Table => (RelationKind::Table, ctx.catalog.create_table(info, persist)?),
        CreateKind::View => (RelationKind::View, ctx.catalog.create_view(info)?),
    };

    Ok(StatementResult::Create {
        name,
        kind,
        outcome,
    })
}

/// DROP TABLE/VIEW [IF EXISTS] ...
pub fn handle_drop(ctx: StatementContext, drop: DropStatement) -> Result<StatementResult> {
    let name = drop.name.value;
    let object = match drop.drop_type {
        DropType::Table => DropObject::Any,
        DropType::View => DropObject::View,
    };

    let outcome = ctx.catalog.drop_relation(&DropInfo {
        name: name.clone(),
        object,
        if_exists: drop.if_exists,
    })?;

    Ok(StatementResult::Drop { name, outcome })
}

/// SELECT ...
pub fn handle_query(ctx: StatementContext, select: SelectStatement) -> Result<StatementResult> {
    let plan = ctx.planner.parse_and_plan(&select.to_string())?;
    let lazy = plan.bind(ctx.catalog)?;

    // Results read from an accelerated relation stay on that backend.
    let accelerated = plan.referenced_relations().iter().any(|name| {
        ctx.catalog
            .get(name)
            .is_some_and(|rel| rel.backend == Backend::Accelerated)
    });
    let backend = if accelerated {
        Backend::Accelerated
    } else {
        Backend::Cpu
    };

    let result = ctx
        .catalog
        .materializer()
        .materialize(lazy.as_ref(), backend)?;
    Ok(StatementResult::Query(result))
}
