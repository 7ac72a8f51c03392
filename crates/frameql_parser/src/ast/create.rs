use std::fmt;

use frameql_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::{AstParseable, Ident, Literal, parse_relation_name};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateKind {
    Table,
    View,
}

impl fmt::Display for CreateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "TABLE"),
            Self::View => write!(f, "VIEW"),
        }
    }
}

/// CREATE [OR REPLACE] TABLE|VIEW [IF NOT EXISTS] <name> WITH (...) | AS (...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRelation {
    pub kind: CreateKind,
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub name: Ident,
    pub source: CreateSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreateSource {
    /// WITH (key = value, ...)
    With(Vec<WithOption>),
    /// AS (<query>)
    ///
    /// The query is kept as raw SQL.
    Query(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithOption {
    pub key: Ident,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    Literal(Literal),
    /// Bare identifier, e.g. `format = csv`.
    Ident(Ident),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Ident(ident) => write!(f, "{ident}"),
        }
    }
}

impl AstParseable for CreateRelation {
    fn parse(parser: &mut Parser) -> Result<Self> {
        parser.expect_keyword(Keyword::CREATE)?;

        let or_replace = parser.parse_keyword_sequence(&[Keyword::OR, Keyword::REPLACE]);

        let kind = match parser.next_keyword()? {
            Keyword::TABLE => CreateKind::Table,
            Keyword::VIEW => CreateKind::View,
            other => {
                return Err(DbError::parse(format!(
                    "Got unexpected keyword for create type: {other}"
                )));
            }
        };

        let if_not_exists =
            parser.parse_keyword_sequence(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        if or_replace && if_not_exists {
            return Err(DbError::parse(
                "OR REPLACE and IF NOT EXISTS cannot both be specified",
            ));
        }

        let name = parse_relation_name(parser)?;

        let source = if parser.parse_keyword(Keyword::WITH) {
            CreateSource::With(parse_with_options(parser)?)
        } else if parser.parse_keyword(Keyword::AS) {
            let parenthesized = parser.consume_token(&Token::LeftParen);
            CreateSource::Query(parser.take_raw_query(parenthesized)?)
        } else {
            return Err(DbError::parse(format!(
                "Expected WITH or AS after CREATE {kind} {name}"
            )));
        };

        Ok(CreateRelation {
            kind,
            or_replace,
            if_not_exists,
            name,
            source,
        })
    }
}

fn parse_with_options(parser: &mut Parser) -> Result<Vec<WithOption>> {
    parser.expect_token(&Token::LeftParen)?;

    let mut options = Vec::new();
    if parser.consume_token(&Token::RightParen) {
        return Ok(options);
    }

    loop {
        let key = Ident::parse(parser)?;
        parser.expect_token(&Token::Eq)?;
        let value = parse_option_value(parser)?;
        options.push(WithOption { key, value });

        if parser.consume_token(&Token::Comma) {
            continue;
        }
        parser.expect_token(&Token::RightParen)?;
        return Ok(options);
    }
}

fn parse_option_value(parser: &mut Parser) -> Result<OptionValue> {
    let is_ident = match parser.peek().map(|t| &t.token) {
        Some(Token::Word(w)) => !matches!(
            w.keyword,
            Some(Keyword::TRUE | Keyword::FALSE | Keyword::NULL)
        ),
        _ => false,
    };

    if is_ident {
        Ok(OptionValue::Ident(Ident::parse(parser)?))
    } else {
        Ok(OptionValue::Literal(Literal::parse(parser)?))
    }
}
