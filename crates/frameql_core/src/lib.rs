//! Relation catalog and materialization for SQL over partitioned frames.
//!
//! Relations are bound by name in a session scoped [`catalog::Catalog`].
//! Views re-evaluate their producer on every read, while persisted tables
//! hold a snapshot taken when they were materialized.
pub mod arrays;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod extension;
pub mod frame;
pub mod materialize;
pub mod planner;
pub mod source;
pub mod statement;

pub use frameql_parser::parse;
pub use frameql_parser::statement::Statement;
