//! Error types for dialect construction, parsing, and record access.

use thiserror::Error;

/// Raised when a [`crate::dialect::DialectBuilder`] produces an inconsistent
/// configuration.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid dialect: {reason}")]
pub struct InvalidDialect {
    pub reason: String,
}

impl InvalidDialect {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The kind of malformation the lexer or parser observed.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseErrorKind {
    #[error("unterminated quoted field starting at line {start_line}")]
    UnterminatedQuotedField { start_line: u64 },

    #[error("unexpected character after closing quote")]
    UnexpectedCharAfterQuote,

    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("header record is inconsistent with a later record width")]
    InconsistentHeader,

    #[error("duplicate header name {name:?}")]
    DuplicateHeader { name: String },

    #[error("missing column name in header record")]
    MissingColumnName,
}

/// A parse failure with position metadata, surfaced from the record-producing
/// operation that observed it.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("{kind} (line {line}, column {column}, position {position})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u64,
    pub column: u64,
    pub position: u64,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u64, column: u64, position: u64) -> Self {
        Self {
            kind,
            line,
            column,
            position,
        }
    }
}

/// Top-level error surfaced by the lexer and parser: either an I/O failure
/// propagated verbatim from the underlying source, or a lexer/parser-level
/// malformation (spec §7).
#[derive(Debug, Error)]
pub enum CsvError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Consumer-misuse errors raised by [`crate::record::Record`] accessors.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RecordAccessError {
    #[error("record has no header mapping")]
    MissingHeader,

    #[error("unknown column {name:?}")]
    UnknownColumn { name: String },

    #[error("header maps {name:?} to index {index} but the record only has {len} values")]
    InconsistentRow {
        name: String,
        index: usize,
        len: usize,
    },
}
