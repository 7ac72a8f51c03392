pub mod create;
pub use create::*;
pub mod drop;
pub use drop::*;
pub mod select;
pub use select::*;

use std::fmt;

use frameql_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use crate::parser::Parser;
use crate::tokens::Token;

pub trait AstParseable: Sized {
    /// Parse an instance of Self from the provided parser.
    ///
    /// It's assumed that the parser is in the correct state for parsing Self,
    /// and if it isn't, an error should be returned.
    fn parse(parser: &mut Parser) -> Result<Self>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Parse an AST node directly from a string.
    pub(crate) fn parse_ast<A: AstParseable>(s: &str) -> Result<A> {
        let mut parser = Parser::with_sql_string(s)?;
        A::parse(&mut parser)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub value: String,
    /// If the identifier was quoted in the source.
    pub quoted: bool,
}

impl Ident {
    pub fn new(s: impl Into<String>) -> Self {
        Ident {
            value: s.into(),
            quoted: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl AstParseable for Ident {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let tok = match parser.next() {
            Some(tok) => &tok.token,
            None => {
                return Err(DbError::parse(
                    "Expected identifier, found end of statement",
                ));
            }
        };

        match tok {
            Token::Word(w) => Ok(Ident {
                value: w.value.to_string(),
                quoted: w.quote.is_some(),
            }),
            other => Err(DbError::parse(format!(
                "Unexpected token: {other:?}. Expected an identifier.",
            ))),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Parse a relation name.
///
/// Qualified names aren't supported since there's only a single namespace per
/// session.
pub(crate) fn parse_relation_name(parser: &mut Parser) -> Result<Ident> {
    let name = Ident::parse(parser)?;
    if parser.consume_token(&Token::Period) {
        return Err(DbError::parse(format!(
            "Qualified relation names are not supported: '{name}'"
        )));
    }
    Ok(name)
}

/// A literal value appearing in a WITH option list or select list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    /// Number kept in its string form, interpretation left to the consumer.
    Number(String),
    String(String),
}

impl AstParseable for Literal {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let negative = parser.consume_token(&Token::Minus);

        let tok = match parser.next() {
            Some(tok) => tok,
            None => return Err(DbError::parse("Expected a literal, found end of statement")),
        };

        let lit = match &tok.token {
            Token::Number(n) if negative => Literal::Number(format!("-{n}")),
            Token::Number(n) => Literal::Number(n.to_string()),
            _ if negative => return Err(DbError::parse("Expected a number after '-'")),
            Token::SingleQuotedString(s) => Literal::String(s.clone()),
            Token::Word(w) if w.quote.is_none() => match w.keyword {
                Some(crate::keywords::Keyword::TRUE) => Literal::Boolean(true),
                Some(crate::keywords::Keyword::FALSE) => Literal::Boolean(false),
                Some(crate::keywords::Keyword::NULL) => Literal::Null,
                _ => {
                    return Err(DbError::parse(format!(
                        "Expected a literal, got '{}'",
                        w.value
                    )));
                }
            },
            other => return Err(DbError::parse(format!("Expected a literal, got {other:?}"))),
        };

        Ok(lit)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}
