//! Error types for query tokenization and suggestion enrichment.
//!
//! # Error Handling Strategy
//!
//! The engine never surfaces an error to its caller; `get_suggestions`
//! always resolves to a (possibly empty) suggestion list. Internally two
//! complementary patterns are used:
//!
//! - [`ParseError`]: tolerated syntax problems recorded while tokenizing and
//!   segmenting the query. They are accumulated on the
//!   [`crate::types::AutocompleteResult`] and processing continues with the
//!   partial structure.
//!
//! - [`ValueFetchError`]: failures of the caller-supplied value-fetch
//!   collaborator. These are caught at the enrichment boundary; value
//!   suggestions are omitted and every other suggestion is preserved.

use std::fmt;

use thiserror::Error;

/// Error encountered while tokenizing or segmenting a query.
///
/// Preserves structured position information when the underlying tokenizer
/// provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Position where the error occurred, if available.
    pub position: Option<Position>,
    /// The specific category of parse error.
    pub kind: ParseErrorKind,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// Category of parse error for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// Unexpected token in input.
    #[default]
    SyntaxError,
    /// Clause or command cut off at the end of input.
    UnexpectedEof,
    /// Tokenization error (e.g. an unterminated string literal).
    LexerError,
}

impl ParseError {
    /// Creates a new parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Creates a parse error with position information.
    pub fn with_position(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Sets the error kind.
    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::tokenizer::TokenizerError> for ParseError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        Self {
            message: err.message,
            position: Some(Position {
                line: err.location.line as usize,
                column: err.location.column as usize,
            }),
            kind: ParseErrorKind::LexerError,
        }
    }
}

/// Error returned by a [`crate::enrich::ValueFetcher`] implementation.
///
/// The engine wraps every fetch in a guard; these errors never propagate
/// past the enrichment boundary.
#[derive(Debug, Clone, Error)]
pub enum ValueFetchError {
    /// The backing value source cannot be reached at all.
    #[error("value source unavailable: {0}")]
    Unavailable(String),
    /// The fetch itself failed (timeout, bad response, ...).
    #[error("value fetch failed for column `{column}`: {message}")]
    Fetch { column: String, message: String },
}
