//! Query tokenizer
//!
//! Splits a raw filter expression into tokens. Keywords are recognized
//! case-insensitively; backtick-quoted names are always identifiers.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::CmpOp;
use super::error::QueryError;

/// Reserved words of the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    Not,
    In,
    Like,
    Is,
    Null,
    True,
    False,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        let kw = match word.to_ascii_lowercase().as_str() {
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "in" => Self::In,
            "like" => Self::Like,
            "is" => Self::Is,
            "null" => Self::Null,
            "true" => Self::True,
            "false" => Self::False,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::In => "in",
            Self::Like => "like",
            Self::Is => "is",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Column name or bare word
    Ident(String),
    /// Quoted string with its quote character
    Str { value: String, quote: char },
    /// Numeric literal as written
    Number(String),
    Keyword(Keyword),
    Op(CmpOp),
    Minus,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "{}", name),
            Self::Str { value, quote } => write!(f, "{quote}{value}{quote}"),
            Self::Number(text) => write!(f, "{}", text),
            Self::Keyword(kw) => write!(f, "{}", kw.as_str()),
            Self::Op(op) => write!(f, "{}", op),
            Self::Minus => write!(f, "-"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
        }
    }
}

/// Token with its byte offset in the source query
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Tokenize a filter expression
pub fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    Lexer::new(input).collect()
}

struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
        }
    }

    fn next_token(&mut self) -> Option<Result<Token, QueryError>> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let &(offset, c) = self.chars.peek()?;
        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ',' => self.single(TokenKind::Comma),
            '-' => self.single(TokenKind::Minus),
            '\'' | '"' => self.string(offset, c).map(|value| TokenKind::Str { value, quote: c }),
            '`' => self.string(offset, c).map(TokenKind::Ident),
            '=' | '!' | '<' | '>' => self.operator(offset, c),
            c if c.is_ascii_digit() => Ok(self.number()),
            '.' if self.starts_fraction() => Ok(self.number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.word()),
            other => Err(QueryError::UnexpectedChar { ch: other, offset }),
        };
        Some(kind.map(|kind| Token { kind, offset }))
    }

    fn single(&mut self, kind: TokenKind) -> Result<TokenKind, QueryError> {
        self.chars.next();
        Ok(kind)
    }

    /// Read a quoted run; `\` escapes the quote character and itself
    fn string(&mut self, offset: usize, quote: char) -> Result<String, QueryError> {
        self.chars.next();
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next_if(|&(_, n)| n == quote || n == '\\') {
                    Some((_, escaped)) => value.push(escaped),
                    None => value.push('\\'),
                },
                Some((_, ch)) if ch == quote => return Ok(value),
                Some((_, ch)) => value.push(ch),
                None => return Err(QueryError::UnterminatedString { offset }),
            }
        }
    }

    fn operator(&mut self, offset: usize, first: char) -> Result<TokenKind, QueryError> {
        self.chars.next();
        let has_eq = self.chars.next_if(|&(_, c)| c == '=').is_some();
        let op = match (first, has_eq) {
            ('=', true) => CmpOp::Eq,
            ('!', true) => CmpOp::Ne,
            ('<', true) => CmpOp::Le,
            ('>', true) => CmpOp::Ge,
            ('<', false) => CmpOp::Lt,
            ('>', false) => CmpOp::Gt,
            (ch, _) => return Err(QueryError::UnexpectedChar { ch, offset }),
        };
        Ok(TokenKind::Op(op))
    }

    fn starts_fraction(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().is_some_and(|(_, c)| c.is_ascii_digit())
    }

    fn number(&mut self) -> TokenKind {
        let mut text = String::new();
        self.take_digits(&mut text);
        if let Some((_, dot)) = self.chars.next_if(|&(_, c)| c == '.') {
            text.push(dot);
            self.take_digits(&mut text);
        }
        if self.starts_exponent() {
            if let Some((_, e)) = self.chars.next() {
                text.push(e);
            }
            if let Some((_, sign)) = self.chars.next_if(|&(_, c)| c == '+' || c == '-') {
                text.push(sign);
            }
            self.take_digits(&mut text);
        }
        TokenKind::Number(text)
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some((_, d)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
            text.push(d);
        }
    }

    /// `e`/`E` followed by digits, optionally signed
    fn starts_exponent(&self) -> bool {
        let mut ahead = self.chars.clone();
        if !ahead.next().is_some_and(|(_, c)| c == 'e' || c == 'E') {
            return false;
        }
        match ahead.next() {
            Some((_, '+' | '-')) => ahead.next().is_some_and(|(_, c)| c.is_ascii_digit()),
            Some((_, c)) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some((_, c)) = self.chars.next_if(|(_, c)| c.is_alphanumeric() || *c == '_') {
            word.push(c);
        }
        match Keyword::lookup(&word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(word),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
