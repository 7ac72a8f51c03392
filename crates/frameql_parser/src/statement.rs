use serde::{Deserialize, Serialize};

use crate::ast::{CreateRelation, DropStatement, SelectStatement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// CREATE TABLE ... / CREATE VIEW ...
    Create(CreateRelation),

    /// DROP TABLE ... / DROP VIEW ...
    Drop(DropStatement),

    /// SELECT ...
    Query(SelectStatement),
}
