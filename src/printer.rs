//! Value-to-wire printer: narrow `WriteChars` capability plus the per-value
//! quoting decision (spec §4.6).

use crate::dialect::{Dialect, QuoteMode};
use crate::reader::{IoCharSource, ReadChars};
use std::io;

/// Minimal character-sink capability the printer needs. Mirrors the narrow
/// `ReadChars` trait on the read side (spec §9).
pub trait WriteChars {
    fn write_str(&mut self, s: &str) -> io::Result<()>;
    fn write_char(&mut self, c: char) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// An in-memory sink, useful for tests and for building a single record or
/// field into a `String` without touching any I/O.
#[derive(Debug, Default)]
pub struct StringSink {
    buf: String,
}

impl StringSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

impl WriteChars for StringSink {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.buf.push_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        self.buf.push(c);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any `std::io::Write` into a `WriteChars` sink, encoding characters
/// as UTF-8.
pub struct IoCharSink<W: io::Write> {
    inner: W,
}

impl<W: io::Write> IoCharSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> WriteChars for IoCharSink<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.inner.write_all(s.as_bytes())
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.inner.write_all(c.encode_utf8(&mut buf).as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Value source passed to [`Printer::print`]: a string, or an explicit
/// numeric that the `NonNumeric` quote mode never quotes (spec §4.6).
#[derive(Debug, Clone, Copy)]
pub enum PrintValue<'a> {
    Str(&'a str),
    Numeric(&'a str),
    Null,
}

impl<'a> From<&'a str> for PrintValue<'a> {
    fn from(s: &'a str) -> Self {
        PrintValue::Str(s)
    }
}

/// Writes records to a sink under a [`Dialect`], deciding per value whether
/// quoting or escaping is required (spec §4.6).
pub struct Printer<W: WriteChars> {
    sink: W,
    dialect: Dialect,
    new_record: bool,
}

impl<W: WriteChars> Printer<W> {
    /// Writes any configured header comments and header row immediately.
    pub fn new(mut sink: W, dialect: Dialect) -> io::Result<Self> {
        if let Some(comments) = dialect.header_comments() {
            for line in comments {
                write_comment_line(&mut sink, &dialect, line)?;
            }
        }

        let mut printer = Self {
            sink,
            dialect,
            new_record: true,
        };

        if let Some(headers) = printer.dialect.headers().map(|h| h.to_vec()) {
            if !headers.is_empty() && !printer.dialect.skip_header_record() {
                printer.print_record(headers.iter().map(|s| PrintValue::Str(s)))?;
            }
        }

        Ok(printer)
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    fn write_record_separator(&mut self) -> io::Result<()> {
        self.sink.write_str(self.dialect.record_separator())
    }

    /// Writes one value, preceded by a delimiter unless it is the first in
    /// the record.
    pub fn print<'a>(&mut self, value: impl Into<PrintValue<'a>>) -> io::Result<()> {
        if !self.new_record {
            self.sink.write_str(self.dialect.delimiter())?;
        }
        self.new_record = false;
        self.write_value(value.into())
    }

    /// Ends the current record, writing the record separator.
    pub fn println(&mut self) -> io::Result<()> {
        self.write_record_separator()?;
        self.new_record = true;
        Ok(())
    }

    /// Writes a full record in one call.
    pub fn print_record<'a, I, V>(&mut self, values: I) -> io::Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<PrintValue<'a>>,
    {
        for v in values {
            self.print(v)?;
        }
        if self.dialect.trailing_delimiter() {
            self.sink.write_str(self.dialect.delimiter())?;
        }
        self.println()
    }

    /// Writes every record yielded by `records`.
    pub fn print_records<'a, I, R, V>(&mut self, records: I) -> io::Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<PrintValue<'a>>,
    {
        for record in records {
            self.print_record(record)?;
        }
        Ok(())
    }

    /// Writes a standalone comment line, prefixed with the comment marker
    /// (if configured) on each physical line of `text`.
    pub fn print_comment(&mut self, text: &str) -> io::Result<()> {
        write_comment_line(&mut self.sink, &self.dialect, text)
    }

    /// Writes a value sourced from any `std::io::Read` without buffering it
    /// into memory first (spec §4.6, "Streaming inputs"). Unlike the
    /// in-memory `print` path, a streamed value cannot be scanned ahead of
    /// time to decide whether quoting is required: when the dialect would
    /// quote at all (a quote character is configured and `quote_mode !=
    /// NONE`), the value is always quoted, doubling any interior quote as it
    /// is scanned. Otherwise it falls back to the same per-character escape
    /// rules as [`Self::print`], or raw passthrough.
    pub fn print_stream<R: io::Read>(&mut self, value: R) -> io::Result<()> {
        if !self.new_record {
            self.sink.write_str(self.dialect.delimiter())?;
        }
        self.new_record = false;

        let mut source = IoCharSource::new(value);

        if let Some(quote) = self.dialect.quote() {
            if self.dialect.quote_mode() != QuoteMode::None {
                self.sink.write_char(quote)?;
                while let Some(c) = source.read()? {
                    if c == quote {
                        self.sink.write_char(quote)?;
                    }
                    self.sink.write_char(c)?;
                }
                return self.sink.write_char(quote);
            }
        }

        if let Some(escape) = self.dialect.escape() {
            let delimiter = self.dialect.delimiter().to_string();
            while let Some(c) = source.read()? {
                let escaped = match c {
                    '\r' => Some('r'),
                    '\n' => Some('n'),
                    '\t' => Some('t'),
                    c if c == escape => Some(escape),
                    _ => None,
                };
                if let Some(e) = escaped {
                    self.sink.write_char(escape)?;
                    self.sink.write_char(e)?;
                } else if delimiter.contains(c) {
                    self.sink.write_char(escape)?;
                    self.sink.write_char(c)?;
                } else {
                    self.sink.write_char(c)?;
                }
            }
            return Ok(());
        }

        while let Some(c) = source.read()? {
            self.sink.write_char(c)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    /// Flushes and releases the underlying sink.
    pub fn close(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    fn write_value(&mut self, value: PrintValue<'_>) -> io::Result<()> {
        let (text, numeric) = match value {
            PrintValue::Str(s) => (s, false),
            PrintValue::Numeric(s) => (s, true),
            PrintValue::Null => {
                return self.write_null();
            }
        };

        if self.needs_quoting(text, numeric) {
            self.print_with_quotes(text)
        } else if self.needs_escaping(text) {
            self.print_with_escapes(text)
        } else {
            self.sink.write_str(text)
        }
    }

    fn write_null(&mut self) -> io::Result<()> {
        match (self.dialect.null_string(), self.dialect.quote_mode()) {
            (Some(null), QuoteMode::All) => {
                if let Some(quoted) = self.dialect.quoted_null() {
                    self.sink.write_str(quoted)
                } else {
                    self.sink.write_str(null)
                }
            }
            (Some(null), _) => self.sink.write_str(null),
            (None, _) => Ok(()),
        }
    }

    /// Per-value quoting decision (spec §4.6).
    fn needs_quoting(&self, value: &str, numeric: bool) -> bool {
        let Some(_quote) = self.dialect.quote() else {
            return false;
        };
        match self.dialect.quote_mode() {
            QuoteMode::All => true,
            QuoteMode::AllNonNull => true,
            QuoteMode::None => false,
            QuoteMode::NonNumeric => !numeric,
            QuoteMode::Minimal => self.minimal_requires_quoting(value),
        }
    }

    fn minimal_requires_quoting(&self, value: &str) -> bool {
        if value.is_empty() {
            // No lookahead across the record (spec §9): an empty value at
            // the start of a record is quoted so a single-field empty
            // record round-trips distinctly from a record with no fields.
            return self.new_record;
        }

        let mut chars = value.chars();
        let first = chars.next().unwrap();
        if (first as u32) <= ('#' as u32) {
            return true;
        }

        if value.contains(['\r', '\n']) {
            return true;
        }
        if let Some(q) = self.dialect.quote() {
            if value.contains(q) {
                return true;
            }
        }
        if let Some(e) = self.dialect.escape() {
            if value.contains(e) {
                return true;
            }
        }
        if value.contains(self.dialect.delimiter()) {
            return true;
        }
        if value.ends_with(' ') || value.ends_with('\t') {
            return true;
        }
        false
    }

    fn needs_escaping(&self, value: &str) -> bool {
        if self.dialect.escape().is_none() {
            return false;
        }
        value.contains(['\r', '\n'])
            || value.contains(self.dialect.delimiter())
            || self.dialect.escape().map_or(false, |e| value.contains(e))
    }

    /// Wraps `value` in quote characters, doubling any embedded quote.
    fn print_with_quotes(&mut self, value: &str) -> io::Result<()> {
        let quote = self
            .dialect
            .quote()
            .expect("print_with_quotes requires a quote character");
        self.sink.write_char(quote)?;
        for c in value.chars() {
            if c == quote {
                self.sink.write_char(quote)?;
            }
            self.sink.write_char(c)?;
        }
        self.sink.write_char(quote)
    }

    /// Escapes meta characters with the dialect's escape character instead
    /// of quoting, for dialects with no quote character (spec §4.6, e.g.
    /// MySQL/PostgreSQL text format).
    fn print_with_escapes(&mut self, value: &str) -> io::Result<()> {
        let escape = self
            .dialect
            .escape()
            .expect("print_with_escapes requires an escape character");
        let delimiter = self.dialect.delimiter();
        for c in value.chars() {
            let escaped = match c {
                '\r' => Some('r'),
                '\n' => Some('n'),
                '\t' => Some('t'),
                c if c == escape => Some(escape),
                _ => None,
            };
            if let Some(e) = escaped {
                self.sink.write_char(escape)?;
                self.sink.write_char(e)?;
            } else if delimiter.contains(c) {
                // A multi-character delimiter has each of its own characters
                // escaped individually wherever they occur in the value
                // (spec §4.6).
                self.sink.write_char(escape)?;
                self.sink.write_char(c)?;
            } else {
                self.sink.write_char(c)?;
            }
        }
        Ok(())
    }
}

fn write_comment_line<W: WriteChars>(sink: &mut W, dialect: &Dialect, text: &str) -> io::Result<()> {
    for line in text.lines() {
        if let Some(marker) = dialect.comment_marker() {
            sink.write_char(marker)?;
            if !line.is_empty() {
                sink.write_char(' ')?;
            }
        }
        sink.write_str(line)?;
        sink.write_str(dialect.record_separator())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{default_dialect, mysql, Dialect};

    fn render<'a>(dialect: Dialect, values: &[&'a str]) -> String {
        let mut printer = Printer::new(StringSink::new(), dialect).unwrap();
        printer
            .print_record(values.iter().map(|s| PrintValue::Str(s)))
            .unwrap();
        printer.close().unwrap().into_inner()
    }

    #[test]
    fn minimal_quoting_only_when_required() {
        let out = render(default_dialect(), &["a", "b,c", "plain"]);
        assert_eq!(out, "a,\"b,c\",plain\r\n");
    }

    #[test]
    fn minimal_quoting_escapes_embedded_quote() {
        let out = render(default_dialect(), &["say \"hi\""]);
        assert_eq!(out, "\"say \"\"hi\"\"\"\r\n");
    }

    #[test]
    fn all_mode_quotes_everything() {
        let dialect = Dialect::builder().quote_mode(QuoteMode::All).build().unwrap();
        let out = render(dialect, &["a", "1"]);
        assert_eq!(out, "\"a\",\"1\"\r\n");
    }

    #[test]
    fn none_mode_with_escape_uses_backslash_escapes() {
        let dialect = Dialect::builder()
            .quote(None)
            .escape(Some('\\'))
            .quote_mode(QuoteMode::None)
            .build()
            .unwrap();
        let out = render(dialect, &["a,b", "c\nd"]);
        assert_eq!(out, "a\\,b,c\\nd\r\n");
    }

    #[test]
    fn mysql_null_prints_sentinel_unquoted() {
        let mut printer = Printer::new(StringSink::new(), mysql()).unwrap();
        printer.print(PrintValue::Str("x")).unwrap();
        printer.print(PrintValue::Null).unwrap();
        printer.print_record(std::iter::empty::<&str>()).unwrap();
        let out = printer.close().unwrap().into_inner();
        assert_eq!(out, "x\t\\N\n");
    }

    #[test]
    fn header_row_written_on_construction() {
        let dialect = Dialect::builder()
            .headers(Some(vec!["a".into(), "b".into()]))
            .build()
            .unwrap();
        let mut printer = Printer::new(StringSink::new(), dialect).unwrap();
        printer.print_record(["1", "2"]).unwrap();
        let out = printer.close().unwrap().into_inner();
        assert_eq!(out, "a,b\r\n1,2\r\n");
    }

    #[test]
    fn header_comments_precede_header_row() {
        let dialect = Dialect::builder()
            .comment_marker(Some('#'))
            .header_comments(Some(vec!["generated".into()]))
            .headers(Some(vec!["a".into()]))
            .build()
            .unwrap();
        let mut printer = Printer::new(StringSink::new(), dialect).unwrap();
        printer.print_record(["1"]).unwrap();
        let out = printer.close().unwrap().into_inner();
        assert_eq!(out, "# generated\r\na\r\n1\r\n");
    }

    #[test]
    fn trailing_delimiter_appends_extra_separator() {
        let dialect = Dialect::builder().trailing_delimiter(true).build().unwrap();
        let out = render(dialect, &["a", "b"]);
        assert_eq!(out, "a,b,\r\n");
    }

    #[test]
    fn print_stream_always_quotes_and_doubles_interior_quotes() {
        let mut printer = Printer::new(StringSink::new(), default_dialect()).unwrap();
        printer.print(PrintValue::Str("id")).unwrap();
        printer
            .print_stream("say \"hi\", ok".as_bytes())
            .unwrap();
        printer.print_record(std::iter::empty::<&str>()).unwrap();
        let out = printer.close().unwrap().into_inner();
        assert_eq!(out, "id,\"say \"\"hi\"\", ok\"\r\n");
    }

    #[test]
    fn print_stream_falls_back_to_escapes_without_a_quote_char() {
        let dialect = Dialect::builder()
            .quote(None)
            .escape(Some('\\'))
            .quote_mode(QuoteMode::None)
            .build()
            .unwrap();
        let mut printer = Printer::new(StringSink::new(), dialect).unwrap();
        printer.print_stream("a,b\nc".as_bytes()).unwrap();
        printer.print_record(std::iter::empty::<&str>()).unwrap();
        let out = printer.close().unwrap().into_inner();
        assert_eq!(out, "a\\,b\\nc\r\n");
    }
}
