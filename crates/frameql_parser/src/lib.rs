//! Parser for the statements understood by frameql.
//!
//! Covers relation DDL (CREATE TABLE/VIEW, DROP TABLE/VIEW) and a small SELECT
//! subset. The body of `CREATE ... AS (...)` is kept as raw SQL and handed to a
//! query planner.
pub mod ast;
pub mod keywords;
pub mod parser;
pub mod statement;
pub mod tokens;

use frameql_error::Result;
use statement::Statement;

/// Parse a string containing zero or more semicolon separated statements.
pub fn parse(sql: &str) -> Result<Vec<Statement>> {
    let toks = tokens::Tokenizer::new(sql).tokenize()?;
    let mut parser = parser::Parser::with_tokens(sql, toks);
    parser.parse_statements()
}
