//! Character-level state machine emitting [`Token`]s under a [`Dialect`]
//! (spec §4.3).
//!
//! Generalizes the teacher's `Parser::read_statement` byte-scanning loop in
//! `src/parser/mod.rs` — which tracks `inside_single_quote`/`escaped`/
//! `in_line_comment` while hunting for a SQL statement terminator — into a
//! dialect-parameterized field scanner that hunts for delimiters, quotes,
//! and record terminators instead.

use crate::dialect::Dialect;
use crate::error::{CsvError, ParseError, ParseErrorKind};
use crate::reader::{PositionReader, ReadChars};
use crate::token::{Token, TokenType};
use std::io;
use std::sync::Arc;

pub struct Lexer<S: ReadChars> {
    reader: PositionReader<S>,
    dialect: Arc<Dialect>,
    first_eol: Option<String>,
    prev_token_was_delimiter: bool,
}

impl<S: ReadChars> Lexer<S> {
    pub fn new(source: S, dialect: Arc<Dialect>) -> Self {
        Self {
            reader: PositionReader::new(source),
            dialect,
            first_eol: None,
            prev_token_was_delimiter: false,
        }
    }

    pub fn current_line_number(&self) -> u64 {
        self.reader.current_line_number()
    }

    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// The first end-of-line sequence encountered (`"\n"`, `"\r"`, or
    /// `"\r\n"`), recorded for consumer metadata (spec §4.3).
    pub fn first_eol(&self) -> Option<&str> {
        self.first_eol.as_deref()
    }

    fn err(&self, kind: ParseErrorKind) -> CsvError {
        CsvError::Parse(ParseError::new(
            kind,
            self.reader.current_line_number(),
            self.reader.current_column(),
            self.reader.position(),
        ))
    }

    /// Consumes a CR, a CRLF (greedily swallowing the LF), or a bare LF as
    /// one end-of-line sequence; records the first one seen.
    fn read_end_of_line(&mut self, c: Option<char>) -> io::Result<bool> {
        match c {
            Some('\r') => {
                let mut seq = String::from("\r");
                if self.reader.peek()? == Some('\n') {
                    self.reader.read()?;
                    seq.push('\n');
                }
                if self.first_eol.is_none() {
                    self.first_eol = Some(seq);
                }
                Ok(true)
            }
            Some('\n') => {
                if self.first_eol.is_none() {
                    self.first_eol = Some("\n".to_string());
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn is_delimiter(&mut self, c: Option<char>) -> io::Result<bool> {
        let Some(ch) = c else { return Ok(false) };
        if !self.dialect.is_delimiter_start(ch) {
            return Ok(false);
        }
        let delim_len = self.dialect.delimiter_len();
        if delim_len <= 1 {
            return Ok(true);
        }
        let rest: Vec<char> = self.dialect.delimiter().chars().skip(1).collect();
        let ahead = self.reader.look_ahead(rest.len())?;
        if ahead == rest {
            for _ in 0..rest.len() {
                self.reader.read()?;
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn is_meta(&self, c: char) -> bool {
        self.dialect.is_delimiter_start(c)
            || Some(c) == self.dialect.quote()
            || Some(c) == self.dialect.escape()
            || Some(c) == self.dialect.comment_marker()
            || matches!(c, '\r' | '\n' | '\u{c}' | '\t' | '\u{8}')
    }

    /// Handles the character(s) following an escape char: named escapes
    /// (`r n t b f`), literal meta characters, a multi-character delimiter
    /// beginning with the escape char, or an unrecognized escape (kept
    /// verbatim along with the escape char itself).
    fn read_escape(&mut self, token: &mut Token) -> io::Result<()> {
        let escape = self.dialect.escape().expect("read_escape requires escape");

        if self.dialect.delimiter_len() > 1 {
            let delim: Vec<char> = self.dialect.delimiter().chars().collect();
            if delim.first() == Some(&escape) {
                let ahead = self.reader.look_ahead(delim.len() - 1)?;
                if ahead == delim[1..] {
                    for _ in 0..delim.len() - 1 {
                        self.reader.read()?;
                    }
                    token.content.push_str(self.dialect.delimiter());
                    return Ok(());
                }
            }
        }

        match self.reader.read()? {
            Some('r') => token.content.push('\r'),
            Some('n') => token.content.push('\n'),
            Some('t') => token.content.push('\t'),
            Some('b') => token.content.push('\u{8}'),
            Some('f') => token.content.push('\u{c}'),
            Some(ch) if self.is_meta(ch) => token.content.push(ch),
            Some(ch) => {
                token.content.push(escape);
                token.content.push(ch);
            }
            None => token.content.push(escape),
        }
        Ok(())
    }

    /// Accumulates an unquoted field until delimiter, end-of-record, or EOF.
    fn parse_simple(&mut self, token: &mut Token, mut c: Option<char>) -> io::Result<()> {
        loop {
            if c.is_some() && c == self.dialect.escape() {
                self.read_escape(token)?;
                c = self.reader.read()?;
                continue;
            }
            if self.is_delimiter(c)? {
                token.token_type = TokenType::Token;
                token.ready = true;
                self.prev_token_was_delimiter = true;
                break;
            }
            if self.read_end_of_line(c)? {
                token.token_type = TokenType::Eorecord;
                token.ready = true;
                self.prev_token_was_delimiter = false;
                break;
            }
            match c {
                None => {
                    token.token_type = TokenType::Eof;
                    token.ready = true;
                    self.prev_token_was_delimiter = false;
                    break;
                }
                Some(ch) => {
                    token.content.push(ch);
                    c = self.reader.read()?;
                }
            }
        }

        if self.dialect.ignore_surrounding_spaces() {
            let trimmed_len = token.content.trim_end().len();
            token.content.truncate(trimmed_len);
        }
        Ok(())
    }

    /// Accumulates a quoted field: doubled quotes collapse to one, escape
    /// sequences follow [`Self::read_escape`], and an unterminated field is
    /// an error unless `lenient_eof` is set (spec §4.3).
    fn parse_encapsulated(&mut self, token: &mut Token) -> Result<(), CsvError> {
        token.quoted = true;
        let quote = self.dialect.quote().expect("parse_encapsulated requires quote");
        let start_line = self.reader.current_line_number();

        loop {
            let c = self.reader.read()?;
            match c {
                Some(ch) if ch == quote => {
                    if self.reader.peek()? == Some(quote) {
                        self.reader.read()?;
                        token.content.push(ch);
                        continue;
                    }
                    break;
                }
                Some(ch) if Some(ch) == self.dialect.escape() => {
                    self.read_escape(token)?;
                }
                Some(ch) => token.content.push(ch),
                None => {
                    if self.dialect.lenient_eof() {
                        token.token_type = TokenType::Eof;
                        token.ready = true;
                        self.prev_token_was_delimiter = false;
                        return Ok(());
                    }
                    return Err(self.err(ParseErrorKind::UnterminatedQuotedField { start_line }));
                }
            }
        }

        loop {
            let c = self.reader.read()?;
            if c.is_none() {
                token.token_type = TokenType::Eof;
                token.ready = true;
                self.prev_token_was_delimiter = false;
                return Ok(());
            }
            if self.is_delimiter(c)? {
                token.token_type = TokenType::Token;
                token.ready = true;
                self.prev_token_was_delimiter = true;
                return Ok(());
            }
            if self.read_end_of_line(c)? {
                token.token_type = TokenType::Eorecord;
                token.ready = true;
                self.prev_token_was_delimiter = false;
                return Ok(());
            }
            let ch = c.unwrap();
            if ch.is_whitespace() {
                continue;
            }
            if self.dialect.trailing_data() {
                token.content.push(ch);
                continue;
            }
            return Err(self.err(ParseErrorKind::UnexpectedCharAfterQuote));
        }
    }

    /// Advances the reader one token at a time; `token` must be reset by the
    /// caller before each call.
    pub fn next_token(&mut self, token: &mut Token) -> Result<(), CsvError> {
        loop {
            let last_was_start_of_line = self.reader.at_start_of_line();
            let reader_was_already_at_eof = self.reader.at_eof();
            let last_char = self.reader.last_char();

            let mut c = self.reader.read()?;
            let eol = self.read_end_of_line(c)?;

            if self.dialect.ignore_empty_lines() && eol && last_was_start_of_line {
                if c.is_none() {
                    token.token_type = TokenType::Eof;
                    token.ready = false;
                    self.prev_token_was_delimiter = false;
                    return Ok(());
                }
                continue;
            }

            if reader_was_already_at_eof || (!self.prev_token_was_delimiter && c.is_none()) {
                token.token_type = TokenType::Eof;
                token.ready = false;
                self.prev_token_was_delimiter = false;
                return Ok(());
            }

            if last_was_start_of_line && self.dialect.comment_marker().is_some() && c == self.dialect.comment_marker()
            {
                return match self.reader.read_line()? {
                    Some(line) => {
                        token.content = line.trim().to_string();
                        token.token_type = TokenType::Comment;
                        token.ready = true;
                        self.prev_token_was_delimiter = false;
                        Ok(())
                    }
                    None => {
                        token.token_type = TokenType::Eof;
                        token.ready = false;
                        self.prev_token_was_delimiter = false;
                        Ok(())
                    }
                };
            }

            let mut eol = eol;
            if self.dialect.ignore_surrounding_spaces() {
                let mut advanced = false;
                while let Some(ch) = c {
                    if ch.is_whitespace() && !self.dialect.is_delimiter_start(ch) && !matches!(ch, '\r' | '\n')
                    {
                        c = self.reader.read()?;
                        advanced = true;
                    } else {
                        break;
                    }
                }
                if advanced {
                    eol = self.read_end_of_line(c)?;
                }
            }

            if self.is_delimiter(c)? {
                token.token_type = TokenType::Token;
                token.ready = true;
                self.prev_token_was_delimiter = true;
                let _ = last_char;
                return Ok(());
            }
            if eol {
                token.token_type = TokenType::Eorecord;
                token.ready = true;
                self.prev_token_was_delimiter = false;
                return Ok(());
            }
            if c.is_some() && c == self.dialect.quote() {
                self.parse_encapsulated(token)?;
                return Ok(());
            }
            if c.is_none() {
                // Reached only when the prior token ended with a delimiter
                // (the no-value-in-progress case already returned at the
                // EOF shortcut above) — a trailing empty field is pending
                // and must still be emitted (spec §4.3 step 4).
                token.token_type = TokenType::Eof;
                token.ready = true;
                self.prev_token_was_delimiter = false;
                return Ok(());
            }
            self.parse_simple(token, c)?;
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::default_dialect;
    use crate::reader::StrSource;

    fn lex(input: &'static str, dialect: Dialect) -> Vec<Token> {
        let mut lexer = Lexer::new(StrSource::new(input), Arc::new(dialect));
        let mut out = Vec::new();
        loop {
            let mut tok = Token::new();
            lexer.next_token(&mut tok).unwrap();
            let done = matches!(tok.token_type, TokenType::Eof) && !tok.ready;
            out.push(tok);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_fields_and_record_end() {
        let toks = lex("a,b,c\r\n", default_dialect());
        assert_eq!(toks[0].content, "a");
        assert_eq!(toks[0].token_type as u8, TokenType::Token as u8);
        assert_eq!(toks[1].content, "b");
        assert_eq!(toks[2].content, "c");
        assert_eq!(toks[2].token_type as u8, TokenType::Eorecord as u8);
    }

    #[test]
    fn quoted_field_with_embedded_delimiter() {
        let toks = lex("\"two, 2\",3\r\n", default_dialect());
        assert_eq!(toks[0].content, "two, 2");
        assert!(toks[0].quoted);
        assert_eq!(toks[1].content, "3");
    }

    #[test]
    fn doubled_quote_collapses() {
        let toks = lex("\"a\"\"b\"\n", default_dialect());
        assert_eq!(toks[0].content, "a\"b");
    }

    #[test]
    fn trailing_delimiter_at_eof_yields_a_ready_empty_token() {
        let toks = lex("a,", default_dialect());
        assert_eq!(toks[0].content, "a");
        assert_eq!(toks[1].content, "");
        assert_eq!(toks[1].token_type as u8, TokenType::Eof as u8);
        assert!(toks[1].ready);
    }

    #[test]
    fn comment_content_is_trimmed_on_both_sides() {
        let dialect = crate::dialect::Dialect::builder()
            .comment_marker(Some('#'))
            .build()
            .unwrap();
        let toks = lex("# meta \n1\n", dialect);
        assert_eq!(toks[0].content, "meta");
        assert_eq!(toks[0].token_type as u8, TokenType::Comment as u8);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let mut lexer = Lexer::new(StrSource::new("\"abc,def\n"), Arc::new(default_dialect()));
        let mut tok = Token::new();
        let err = lexer.next_token(&mut tok).unwrap_err();
        assert!(matches!(err, CsvError::Parse(_)));
    }

    #[test]
    fn lenient_eof_closes_unterminated_quote() {
        let dialect = crate::dialect::excel();
        let toks = lex("\"abc,def\n", dialect);
        assert_eq!(toks[0].content, "abc,def\n");
    }
}
