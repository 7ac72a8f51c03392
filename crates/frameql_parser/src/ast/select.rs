use std::fmt;

use frameql_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::{AstParseable, Ident, Literal, parse_relation_name};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

/// SELECT <items> [FROM <relation>] [LIMIT <n>]
///
/// Only the shapes needed for reading relations back out are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    pub projections: Vec<SelectItem>,
    pub from: Option<Ident>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// SELECT *
    Wildcard,
    /// SELECT <expr> [AS <alias>]
    Expr {
        expr: SelectExpr,
        alias: Option<Ident>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectExpr {
    Column(Ident),
    /// COUNT(*)
    CountStar,
    Literal(Literal),
}

impl AstParseable for SelectStatement {
    fn parse(parser: &mut Parser) -> Result<Self> {
        parser.expect_keyword(Keyword::SELECT)?;

        let mut projections = Vec::new();
        loop {
            projections.push(SelectItem::parse(parser)?);
            if !parser.consume_token(&Token::Comma) {
                break;
            }
        }

        let from = if parser.parse_keyword(Keyword::FROM) {
            Some(parse_relation_name(parser)?)
        } else {
            None
        };

        let limit = if parser.parse_keyword(Keyword::LIMIT) {
            match Literal::parse(parser)? {
                Literal::Number(n) => Some(n.parse::<u64>().map_err(|_| {
                    DbError::parse(format!("LIMIT must be a non-negative integer, got {n}"))
                })?),
                other => {
                    return Err(DbError::parse(format!(
                        "LIMIT must be a non-negative integer, got {other}"
                    )));
                }
            }
        } else {
            None
        };

        Ok(SelectStatement {
            projections,
            from,
            limit,
        })
    }
}

impl AstParseable for SelectItem {
    fn parse(parser: &mut Parser) -> Result<Self> {
        if parser.consume_token(&Token::Mul) {
            return Ok(SelectItem::Wildcard);
        }

        let expr = if parser.parse_keyword(Keyword::COUNT) {
            parser.expect_token(&Token::LeftParen)?;
            parser.expect_token(&Token::Mul)?;
            parser.expect_token(&Token::RightParen)?;
            SelectExpr::CountStar
        } else {
            let is_column = match parser.peek().map(|t| &t.token) {
                Some(Token::Word(w)) => w.keyword.is_none(),
                _ => false,
            };
            if is_column {
                SelectExpr::Column(Ident::parse(parser)?)
            } else {
                SelectExpr::Literal(Literal::parse(parser)?)
            }
        };

        let alias = if parser.parse_keyword(Keyword::AS) {
            Some(Ident::parse(parser)?)
        } else {
            None
        };

        Ok(SelectItem::Expr { expr, alias })
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (idx, item) in self.projections.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => write!(f, "*"),
            Self::Expr { expr, alias } => {
                match expr {
                    SelectExpr::Column(col) => write!(f, "{col}")?,
                    SelectExpr::CountStar => write!(f, "COUNT(*)")?,
                    SelectExpr::Literal(lit) => write!(f, "{lit}")?,
                }
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::testutil::parse_ast;

    #[test]
    fn select_star() {
        let got = parse_ast::<SelectStatement>("select * from df").unwrap();
        let expected = SelectStatement {
            projections: vec![SelectItem::Wildcard],
            from: Some(Ident::new("df")),
            limit: None,
        };
        assert_eq!(expected, got);
    }

    #[test]
    fn select_count_alias() {
        let got = parse_ast::<SelectStatement>("SELECT COUNT(*) AS c FROM new_table").unwrap();
        let expected = SelectStatement {
            projections: vec![SelectItem::Expr {
                expr: SelectExpr::CountStar,
                alias: Some(Ident::new("c")),
            }],
            from: Some(Ident::new("new_table")),
            limit: None,
        };
        assert_eq!(expected, got);
    }

    #[test]
    fn select_literal_no_from() {
        let got = parse_ast::<SelectStatement>("select 1 as a").unwrap();
        let expected = SelectStatement {
            projections: vec![SelectItem::Expr {
                expr: SelectExpr::Literal(Literal::Number("1".to_string())),
                alias: Some(Ident::new("a")),
            }],
            from: None,
            limit: None,
        };
        assert_eq!(expected, got);
    }

    #[test]
    fn select_columns_limit() {
        let got = parse_ast::<SelectStatement>("select a, b from t1 limit 10").unwrap();
        assert_eq!(2, got.projections.len());
        assert_eq!(Some(10), got.limit);
    }

    #[test]
    fn negative_limit() {
        parse_ast::<SelectStatement>("select a from t1 limit -1").unwrap_err();
    }

    #[test]
    fn display_reparses() {
        let sql = "SELECT a, COUNT(*) AS \"C\", 'it''s' FROM t1 LIMIT 3";
        let got = parse_ast::<SelectStatement>(sql).unwrap();
        assert_eq!(sql, got.to_string());
        assert_eq!(got, parse_ast::<SelectStatement>(&got.to_string()).unwrap());
    }
}
