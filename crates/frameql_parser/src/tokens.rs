use frameql_error::{DbError, Result};

use crate::keywords::{Keyword, keyword_from_str};

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Word(Word<'a>),
    SingleQuotedString(String),
    Number(&'a str),
    /// Consecutive whitespace (including comments) collapsed into one token.
    Whitespace,
    LeftParen,
    RightParen,
    Comma,
    Period,
    SemiColon,
    Eq,
    Mul,
    Minus,
    Plus,
    Lt,
    Gt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word<'a> {
    pub value: &'a str,
    /// Quote character if this word was quoted.
    pub quote: Option<char>,
    /// Keyword this word represents. Always None for quoted words.
    pub keyword: Option<Keyword>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithLocation<'a> {
    pub token: Token<'a>,
    /// Line number (0-based).
    pub line: usize,
    /// Column number (0-based).
    pub col: usize,
    /// Byte offset into the source string where the token starts.
    pub start: usize,
    /// Byte offset one past the end of the token.
    pub end: usize,
}

impl TokenWithLocation<'_> {
    pub fn is_keyword(&self, other: Keyword) -> bool {
        match &self.token {
            Token::Word(w) => w.keyword == Some(other),
            _ => false,
        }
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match &self.token {
            Token::Word(w) => w.keyword,
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Tokenizer<'a> {
    sql: &'a str,
    /// Current byte position in `sql`.
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(sql: &'a str) -> Self {
        Tokenizer {
            sql,
            pos: 0,
            line: 0,
            col: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithLocation<'a>>> {
        let mut toks = Vec::new();

        while let Some(c) = self.peek() {
            let (line, col, start) = (self.line, self.col, self.pos);

            let token = match c {
                c if c.is_whitespace() => {
                    self.skip_whitespace_and_comments();
                    Token::Whitespace
                }
                '-' if self.peek_nth(1) == Some('-') => {
                    self.skip_whitespace_and_comments();
                    Token::Whitespace
                }
                '\'' => Token::SingleQuotedString(self.take_single_quoted()?),
                '"' => {
                    let value = self.take_quoted_ident()?;
                    Token::Word(Word {
                        value,
                        quote: Some('"'),
                        keyword: None,
                    })
                }
                c if c.is_ascii_digit() => Token::Number(self.take_number()),
                c if c.is_alphabetic() || c == '_' => {
                    let value = self.take_while(|c| c.is_alphanumeric() || c == '_');
                    Token::Word(Word {
                        value,
                        quote: None,
                        keyword: keyword_from_str(value),
                    })
                }
                other => {
                    let tok = match other {
                        '(' => Token::LeftParen,
                        ')' => Token::RightParen,
                        ',' => Token::Comma,
                        '.' => Token::Period,
                        ';' => Token::SemiColon,
                        '=' => Token::Eq,
                        '*' => Token::Mul,
                        '-' => Token::Minus,
                        '+' => Token::Plus,
                        '<' => Token::Lt,
                        '>' => Token::Gt,
                        other => {
                            return Err(DbError::parse(format!(
                                "Unexpected character '{other}' at line {line}, column {col}"
                            )));
                        }
                    };
                    self.advance();
                    tok
                }
            };

            toks.push(TokenWithLocation {
                token,
                line,
                col,
                start,
                end: self.pos,
            });
        }

        Ok(toks)
    }

    fn peek(&self) -> Option<char> {
        self.sql[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.sql[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.advance();
        }
        let sql = self.sql;
        &sql[start..self.pos]
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('-') if self.peek_nth(1) == Some('-') => {
                    self.take_while(|c| c != '\n');
                }
                _ => return,
            }
        }
    }

    fn take_number(&mut self) -> &'a str {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }
        let sql = self.sql;
        &sql[start..self.pos]
    }

    /// Take a single quoted string, handling '' as an escaped quote.
    fn take_single_quoted(&mut self) -> Result<String> {
        let (line, col) = (self.line, self.col);
        self.advance(); // Opening quote.

        let mut s = String::new();
        loop {
            match self.advance() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.advance();
                        s.push('\'');
                    } else {
                        return Ok(s);
                    }
                }
                Some(c) => s.push(c),
                None => {
                    return Err(DbError::parse(format!(
                        "Unterminated string starting at line {line}, column {col}"
                    )));
                }
            }
        }
    }

    fn take_quoted_ident(&mut self) -> Result<&'a str> {
        let (line, col) = (self.line, self.col);
        self.advance(); // Opening quote.
        let value = self.take_while(|c| c != '"');
        if self.advance().is_none() {
            return Err(DbError::parse(format!(
                "Unterminated quoted identifier starting at line {line}, column {col}"
            )));
        }
        Ok(value)
    }
}
