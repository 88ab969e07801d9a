//! Dialect-parameterized CSV/TSV tokenizer, parser and printer with
//! round-trip semantics across RFC 4180 and its common variants (Excel,
//! MySQL, PostgreSQL, Oracle, Informix, MongoDB, TDF).
//!
//! The pipeline mirrors a classic compiler front end: [`reader`] tracks
//! source position, [`lexer`] turns characters into [`token::Token`]s,
//! [`parser`] assembles tokens into [`record::Record`]s, and [`printer`]
//! runs the pipeline in reverse.

pub mod dialect;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod reader;
pub mod record;
pub mod token;

pub use dialect::{Dialect, DialectBuilder, DuplicateHeaderMode, QuoteMode};
pub use error::{CsvError, InvalidDialect, ParseError, ParseErrorKind, RecordAccessError};
pub use parser::Parser;
pub use printer::{IoCharSink, PrintValue, Printer, StringSink, WriteChars};
pub use reader::{
    EscapeSelectSource, IoCharSource, PositionReader, ReadChars, StrSource, UnicodeEscapeSource,
};
pub use record::{HeaderIndex, MutableRecord, Record};

use std::io;

/// Convenience constructor: a [`Parser`] reading UTF-8 bytes from any
/// `std::io::Read`.
pub fn parse_reader<R: io::Read>(
    reader: R,
    dialect: Dialect,
) -> Result<Parser<reader::IoCharSource<R>>, CsvError> {
    Parser::new(reader::IoCharSource::new(reader), dialect)
}

/// Convenience constructor: a [`Parser`] over an in-memory string.
pub fn parse_str(input: &str, dialect: Dialect) -> Result<Parser<reader::StrSource<'_>>, CsvError> {
    Parser::new(reader::StrSource::new(input), dialect)
}

/// Convenience constructor: a [`Printer`] writing UTF-8 to any
/// `std::io::Write`.
pub fn print_writer<W: io::Write>(
    writer: W,
    dialect: Dialect,
) -> io::Result<Printer<printer::IoCharSink<W>>> {
    Printer::new(printer::IoCharSink::new(writer), dialect)
}

/// Convenience constructor: a [`Printer`] building an in-memory `String`.
pub fn print_string(dialect: Dialect) -> io::Result<Printer<printer::StringSink>> {
    Printer::new(printer::StringSink::new(), dialect)
}
