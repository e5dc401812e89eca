//! Query error types

use thiserror::Error;

/// Errors raised while parsing, translating or evaluating a filter expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// String literal without a closing quote
    #[error("Unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// Character that cannot start any token
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// Token that does not fit the grammar at this position
    #[error("Unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    /// Input ended while more tokens were required
    #[error("Unexpected end of query, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// Opening parenthesis never closed, or closing one never opened
    #[error("Unbalanced parentheses at offset {offset}")]
    UnbalancedParen { offset: usize },

    /// LIKE pattern that is not one of the supported wildcard shapes
    #[error(
        "Unsupported LIKE pattern \"{pattern}\" on column '{column}' \
         (use \"%text%\", \"text%\" or \"%text\")"
    )]
    UnsupportedPattern { column: String, pattern: String },

    /// Column referenced by the query is absent from the table
    #[error("Unknown column '{column}'. Available columns: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// Operator cannot be applied to this column type and literal
    #[error("Cannot apply '{op}' to column '{column}' of type {column_type} with {operand}")]
    TypeMismatch {
        column: String,
        op: String,
        column_type: &'static str,
        operand: String,
    },

    /// Parentheses or `not` prefixes nested beyond the supported depth
    #[error("Query nested too deeply at offset {offset} (limit {limit})")]
    TooDeep { offset: usize, limit: usize },

    /// More conditions than a single query may hold
    #[error("Too many conditions at offset {offset} (limit {limit})")]
    TooManyConditions { offset: usize, limit: usize },

    /// Unquoted word inside a membership list
    #[error("Unquoted value '{word}' in list for column '{column}'")]
    UnquotedValue { column: String, word: String },
}

impl QueryError {
    pub(crate) fn unexpected(found: impl Into<String>, expected: &'static str, offset: usize) -> Self {
        Self::UnexpectedToken {
            found: found.into(),
            expected,
            offset,
        }
    }
}

#[cfg(test)]
impl QueryError {
    /// Whether this error comes from the query text itself rather than the table
    pub(crate) fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::UnterminatedString { .. }
                | Self::UnexpectedChar { .. }
                | Self::UnexpectedToken { .. }
                | Self::UnexpectedEnd { .. }
                | Self::UnbalancedParen { .. }
                | Self::TooDeep { .. }
                | Self::TooManyConditions { .. }
        )
    }
}
