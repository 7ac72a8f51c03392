use frameql_error::{DbError, Result};

use crate::ast::{AstParseable, CreateRelation, DropStatement, SelectStatement};
use crate::keywords::Keyword;
use crate::statement::Statement;
use crate::tokens::{Token, TokenWithLocation, Tokenizer};

#[derive(Debug)]
pub struct Parser<'a> {
    /// Original SQL string, used for slicing out raw query bodies.
    sql: &'a str,
    toks: Vec<TokenWithLocation<'a>>,
    /// Index of token we should process next.
    idx: usize,
}

impl<'a> Parser<'a> {
    pub fn with_tokens(sql: &'a str, toks: Vec<TokenWithLocation<'a>>) -> Self {
        Parser { sql, toks, idx: 0 }
    }

    pub fn with_sql_string(sql: &'a str) -> Result<Self> {
        let toks = Tokenizer::new(sql).tokenize()?;
        Ok(Self::with_tokens(sql, toks))
    }

    /// Parse any number of statements, including zero.
    pub fn parse_statements(&mut self) -> Result<Vec<Statement>> {
        let mut stmts = Vec::new();

        loop {
            while self.consume_token(&Token::SemiColon) {}
            if self.peek().is_none() {
                return Ok(stmts);
            }

            stmts.push(self.parse_statement()?);

            match self.peek() {
                None => return Ok(stmts),
                Some(tok) if tok.token == Token::SemiColon => continue,
                Some(tok) => {
                    return Err(DbError::parse(format!(
                        "Expected end of statement, got {:?} at line {}, column {}",
                        tok.token, tok.line, tok.col
                    )));
                }
            }
        }
    }

    pub fn parse_statement(&mut self) -> Result<Statement> {
        let tok = match self.peek() {
            Some(tok) => tok,
            None => return Err(DbError::parse("Empty SQL statement")),
        };

        match tok.keyword() {
            Some(Keyword::CREATE) => Ok(Statement::Create(CreateRelation::parse(self)?)),
            Some(Keyword::DROP) => Ok(Statement::Drop(DropStatement::parse(self)?)),
            Some(Keyword::SELECT) => Ok(Statement::Query(SelectStatement::parse(self)?)),
            Some(other) => Err(DbError::parse(format!("Unexpected keyword: {other}"))),
            None => Err(DbError::parse(format!(
                "Expected a SQL statement, got {:?}",
                tok.token
            ))),
        }
    }

    /// Take the raw SQL text up to the end of the current statement, or up to
    /// the matching close paren if `parenthesized` is true.
    ///
    /// Used for query bodies which are passed through to a planner instead of
    /// being parsed here.
    pub(crate) fn take_raw_query(&mut self, parenthesized: bool) -> Result<String> {
        let mut depth = 0usize;
        let mut start: Option<usize> = None;
        let mut end = 0;

        while let Some(tok) = self.toks.get(self.idx) {
            match tok.token {
                Token::LeftParen => depth += 1,
                Token::RightParen if parenthesized && depth == 0 => break,
                Token::RightParen => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| DbError::parse("Unbalanced parentheses in query"))?;
                }
                Token::SemiColon if depth == 0 => break,
                _ => (),
            }

            if tok.token != Token::Whitespace {
                start.get_or_insert(tok.start);
                end = tok.end;
            }
            self.idx += 1;
        }

        if parenthesized {
            self.expect_token(&Token::RightParen)?;
        }

        match start {
            Some(start) => Ok(self.sql[start..end].to_string()),
            None => Err(DbError::parse("Expected a query")),
        }
    }

    /// Parse a single keyword.
    pub fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        let idx = self.idx;
        if let Some(tok) = self.next() {
            if tok.is_keyword(keyword) {
                return true;
            }
        }

        // Keyword doesn't match. Reset index and return.
        self.idx = idx;
        false
    }

    /// Parse an exact sequence of keywords.
    ///
    /// If the sequence doesn't match, idx is not changed, and false is
    /// returned.
    pub fn parse_keyword_sequence(&mut self, keywords: &[Keyword]) -> bool {
        let idx = self.idx;
        for keyword in keywords {
            if let Some(tok) = self.next() {
                if tok.is_keyword(*keyword) {
                    continue;
                }
            }

            // Keyword doesn't match. Reset index and return.
            self.idx = idx;
            return false;
        }
        true
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.parse_keyword(keyword) {
            return Ok(());
        }
        Err(self.unexpected(&format!("keyword {keyword}")))
    }

    /// Get the next token as a keyword, erroring if it isn't one.
    pub fn next_keyword(&mut self) -> Result<Keyword> {
        let idx = self.idx;
        match self.next().and_then(|t| t.keyword()) {
            Some(k) => Ok(k),
            None => {
                self.idx = idx;
                Err(self.unexpected("a keyword"))
            }
        }
    }

    pub fn expect_token(&mut self, expected: &Token) -> Result<()> {
        if self.consume_token(expected) {
            return Ok(());
        }
        Err(self.unexpected(&format!("{expected:?}")))
    }

    /// Consume the next token if it matches the expected token.
    pub fn consume_token(&mut self, expected: &Token) -> bool {
        let idx = self.idx;
        if let Some(tok) = self.next() {
            if &tok.token == expected {
                return true;
            }
        }
        self.idx = idx;
        false
    }

    /// Get the next non-whitespace token.
    pub fn next(&mut self) -> Option<&TokenWithLocation<'a>> {
        loop {
            if self.idx >= self.toks.len() {
                return None;
            }

            let tok = &self.toks[self.idx];
            self.idx += 1;

            if matches!(&tok.token, Token::Whitespace) {
                continue;
            }

            return Some(tok);
        }
    }

    /// Peek the next non-whitespace token without advancing.
    pub fn peek(&self) -> Option<&TokenWithLocation<'a>> {
        self.toks[self.idx..]
            .iter()
            .find(|t| !matches!(t.token, Token::Whitespace))
    }

    fn unexpected(&self, expected: &str) -> DbError {
        match self.peek() {
            Some(tok) => DbError::parse(format!(
                "Expected {expected}, got {:?} at line {}, column {}",
                tok.token, tok.line, tok.col
            )),
            None => DbError::parse(format!("Expected {expected}, found end of statement")),
        }
    }
}
