use frameql_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::{AstParseable, Ident, parse_relation_name};
use crate::keywords::Keyword;
use crate::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropType {
    Table,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropStatement {
    pub drop_type: DropType,
    pub if_exists: bool,
    pub name: Ident,
}

impl AstParseable for DropStatement {
    fn parse(parser: &mut Parser) -> Result<Self> {
        parser.expect_keyword(Keyword::DROP)?;

        let drop_type = match parser.next_keyword()? {
            Keyword::TABLE => DropType::Table,
            Keyword::VIEW => DropType::View,
            other => {
                return Err(DbError::parse(format!(
                    "Got unexpected keyword for drop type: {other}"
                )));
            }
        };

        let if_exists = parser.parse_keyword_sequence(&[Keyword::IF, Keyword::EXISTS]);
        let name = parse_relation_name(parser)?;

        Ok(DropStatement {
            drop_type,
            if_exists,
            name,
        })
    }
}
