//! Record assembler: consumes lexer tokens, enforces header policy, yields
//! records (spec §4.4).

use crate::dialect::{validate_duplicate_headers, Dialect, DuplicateHeaderMode};
use crate::error::{CsvError, ParseError, ParseErrorKind};
use crate::lexer::Lexer;
use crate::reader::{EscapeSelectSource, ReadChars};
use crate::record::{HeaderIndex, Record};
use crate::token::{Token, TokenType};
use std::sync::Arc;

/// Lazy, finite, non-restartable sequence of [`Record`]s over one character
/// source under one [`Dialect`] (spec §4.4, §5).
pub struct Parser<S: ReadChars> {
    lexer: Lexer<EscapeSelectSource<S>>,
    dialect: Arc<Dialect>,
    header: Option<Arc<HeaderIndex>>,
    record_number: u64,
    emitted: u64,
    done: bool,
}

impl<S: ReadChars> Parser<S> {
    /// Builds the parser, reading and validating the header record (if any)
    /// up front — this is the one point where header-related errors
    /// surface (spec §4.4, §7).
    pub fn new(source: S, dialect: Dialect) -> Result<Self, CsvError> {
        let dialect = Arc::new(dialect);
        let source = EscapeSelectSource::new(source, dialect.unicode_escapes());
        let mut lexer = Lexer::new(source, Arc::clone(&dialect));

        let header = match dialect.headers() {
            None => None,
            Some(fixed) if !fixed.is_empty() => Some(Arc::new(HeaderIndex::new(
                fixed.to_vec(),
                dialect.ignore_header_case(),
            ))),
            Some(_) => {
                // Empty list: auto-discover from the first physical record.
                let fields = read_raw_record(&mut lexer)?;
                let Some(fields) = fields else {
                    return Ok(Self {
                        lexer,
                        dialect,
                        header: None,
                        record_number: 0,
                        emitted: 0,
                        done: true,
                    });
                };
                validate_header_fields(&fields, &dialect)?;
                Some(Arc::new(HeaderIndex::new(
                    fields,
                    dialect.ignore_header_case(),
                )))
            }
        };

        let mut parser = Self {
            lexer,
            dialect,
            header,
            record_number: 0,
            emitted: 0,
            done: false,
        };

        if parser.dialect.headers().is_some()
            && !parser.dialect.headers().unwrap().is_empty()
            && parser.dialect.skip_header_record()
        {
            // Fixed header list + skip_header_record: discard the physical
            // first record, which is redundant with the supplied names.
            parser.next_raw()?;
        }

        Ok(parser)
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn header(&self) -> Option<&Arc<HeaderIndex>> {
        self.header.as_ref()
    }

    fn apply_cell_transforms(&self, value: String, quoted: bool) -> Option<String> {
        if !quoted {
            if let Some(null_string) = self.dialect.null_string() {
                if value == null_string {
                    return None;
                }
            }
        }
        let value = if self.dialect.trim() {
            value.trim().to_string()
        } else {
            value
        };
        Some(value)
    }

    /// Reads one physical record (raw cell strings plus the quoted flag per
    /// cell, used for null-sentinel mapping), without any transforms.
    fn next_raw(&mut self) -> Result<Option<(Vec<String>, Vec<bool>, u64, Option<String>)>, CsvError> {
        if self.done {
            return Ok(None);
        }

        let mut values = Vec::new();
        let mut quoted_flags = Vec::new();
        let mut comment_lines: Vec<String> = Vec::new();
        let start_position = self.lexer.position();
        let mut saw_any_token = false;
        let mut token = Token::new();

        loop {
            token.reset();
            self.lexer.next_token(&mut token)?;

            match token.token_type {
                TokenType::Comment => {
                    comment_lines.push(std::mem::take(&mut token.content));
                    continue;
                }
                TokenType::Token => {
                    saw_any_token = true;
                    values.push(std::mem::take(&mut token.content));
                    quoted_flags.push(token.quoted);
                }
                TokenType::Eorecord => {
                    saw_any_token = true;
                    values.push(std::mem::take(&mut token.content));
                    quoted_flags.push(token.quoted);
                    break;
                }
                TokenType::Eof => {
                    if token.ready {
                        saw_any_token = true;
                        values.push(std::mem::take(&mut token.content));
                        quoted_flags.push(token.quoted);
                    }
                    self.done = true;
                    break;
                }
                TokenType::Invalid => unreachable!("lexer never returns Invalid"),
            }
        }

        if !saw_any_token {
            self.done = true;
            return Ok(None);
        }

        let comment = if comment_lines.is_empty() {
            None
        } else {
            Some(comment_lines.join("\n") + "\n")
        };

        Ok(Some((values, quoted_flags, start_position, comment)))
    }

    /// Pulls the next record, applying the null-sentinel and `trim`
    /// transforms, enforcing `maxRows`, and stamping metadata.
    pub fn next_record(&mut self) -> Result<Option<Record>, CsvError> {
        if self.done {
            return Ok(None);
        }
        if let Some(max) = self.dialect.max_rows() {
            if self.emitted >= max {
                self.done = true;
                return Ok(None);
            }
        }

        let Some((raw_values, quoted_flags, position, comment)) = self.next_raw()? else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(raw_values.len());
        for (value, quoted) in raw_values.into_iter().zip(quoted_flags) {
            // A cell that matched the null sentinel collapses to the empty
            // string: Record values are never null (spec §3), so the
            // distinction only survives via `PrintValue::Null` on the write
            // side, not by re-inflating the sentinel text here.
            let transformed = self.apply_cell_transforms(value, quoted).unwrap_or_default();
            values.push(transformed);
        }

        self.record_number += 1;
        self.emitted += 1;

        Ok(Some(Record::new(
            values,
            self.header.clone(),
            self.record_number,
            position,
            comment,
        )))
    }
}

impl<S: ReadChars> Iterator for Parser<S> {
    type Item = Result<Record, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Reads one physical record's raw field strings, ignoring comments, used
/// only while discovering the header before the [`Parser`] itself exists.
fn read_raw_record<S: ReadChars>(lexer: &mut Lexer<S>) -> Result<Option<Vec<String>>, CsvError> {
    let mut values = Vec::new();
    let mut saw_any = false;
    let mut token = Token::new();
    loop {
        token.reset();
        lexer.next_token(&mut token)?;
        match token.token_type {
            TokenType::Comment => continue,
            TokenType::Token => {
                saw_any = true;
                values.push(std::mem::take(&mut token.content));
            }
            TokenType::Eorecord => {
                saw_any = true;
                values.push(std::mem::take(&mut token.content));
                break;
            }
            TokenType::Eof => {
                if token.ready {
                    saw_any = true;
                    values.push(std::mem::take(&mut token.content));
                }
                break;
            }
            TokenType::Invalid => unreachable!("lexer never returns Invalid"),
        }
    }
    Ok(if saw_any { Some(values) } else { None })
}

fn validate_header_fields(fields: &[String], dialect: &Dialect) -> Result<(), CsvError> {
    if !dialect.allow_missing_column_names() {
        for name in fields {
            if name.trim().is_empty() {
                return Err(CsvError::Parse(ParseError::new(
                    ParseErrorKind::MissingColumnName,
                    1,
                    0,
                    0,
                )));
            }
        }
    }

    let names: Vec<String> = if dialect.ignore_header_case() {
        fields.iter().map(|f| f.to_lowercase()).collect()
    } else {
        fields.to_vec()
    };

    validate_duplicate_headers(&names, dialect.duplicate_header_mode()).map_err(|e| {
        let kind = match dialect.duplicate_header_mode() {
            DuplicateHeaderMode::Disallow | DuplicateHeaderMode::AllowEmpty => {
                ParseErrorKind::DuplicateHeader { name: e.reason }
            }
            DuplicateHeaderMode::AllowAll => ParseErrorKind::InconsistentHeader,
        };
        CsvError::Parse(ParseError::new(kind, 1, 0, 0))
    })
}
