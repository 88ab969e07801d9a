//! Immutable, validated bundle of CSV formatting options (spec §3, §4.1).
//!
//! Mirrors the split `Config`/`ConfigBuilder` shape used for
//! `RedactConfig`/`RedactConfigBuilder`: the builder takes `self` and
//! returns `Self` for every setter, and a single `build()` call runs all
//! invariant checks at once.

use crate::error::InvalidDialect;
use std::collections::HashSet;

/// Policy selecting when the printer quotes a field (spec §3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Always quote every value.
    All,
    /// Quote every non-null value; nulls are written raw.
    AllNonNull,
    /// Quote only when required to preserve round-trip semantics.
    #[default]
    Minimal,
    /// Quote unless the source value was a numeric type.
    NonNumeric,
    /// Never quote; fall back to escaping.
    None,
}

/// Policy governing repeated header names (spec §3, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateHeaderMode {
    /// Any header name may repeat any number of times.
    #[default]
    AllowAll,
    /// Only empty/blank names may repeat; all blanks bucket together.
    AllowEmpty,
    /// Any repeated non-unique name (blank or not) is rejected.
    Disallow,
}

/// Immutable, validated set of CSV dialect options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub(crate) delimiter: String,
    pub(crate) quote: Option<char>,
    pub(crate) escape: Option<char>,
    pub(crate) comment_marker: Option<char>,
    pub(crate) record_separator: String,
    pub(crate) null_string: Option<String>,
    pub(crate) quoted_null: Option<String>,
    pub(crate) quote_mode: QuoteMode,
    pub(crate) duplicate_header_mode: DuplicateHeaderMode,
    pub(crate) ignore_surrounding_spaces: bool,
    pub(crate) ignore_empty_lines: bool,
    pub(crate) ignore_header_case: bool,
    pub(crate) skip_header_record: bool,
    pub(crate) allow_missing_column_names: bool,
    pub(crate) trailing_delimiter: bool,
    pub(crate) trim: bool,
    pub(crate) auto_flush: bool,
    pub(crate) lenient_eof: bool,
    pub(crate) trailing_data: bool,
    pub(crate) unicode_escapes: bool,
    pub(crate) headers: Option<Vec<String>>,
    pub(crate) header_comments: Option<Vec<String>>,
    pub(crate) max_rows: Option<u64>,
}

impl Dialect {
    /// Start building a dialect from scratch.
    pub fn builder() -> DialectBuilder {
        DialectBuilder::default()
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    pub fn comment_marker(&self) -> Option<char> {
        self.comment_marker
    }

    pub fn record_separator(&self) -> &str {
        &self.record_separator
    }

    pub fn null_string(&self) -> Option<&str> {
        self.null_string.as_deref()
    }

    pub fn quoted_null(&self) -> Option<&str> {
        self.quoted_null.as_deref()
    }

    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    pub fn duplicate_header_mode(&self) -> DuplicateHeaderMode {
        self.duplicate_header_mode
    }

    pub fn ignore_surrounding_spaces(&self) -> bool {
        self.ignore_surrounding_spaces
    }

    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    pub fn ignore_header_case(&self) -> bool {
        self.ignore_header_case
    }

    pub fn skip_header_record(&self) -> bool {
        self.skip_header_record
    }

    pub fn allow_missing_column_names(&self) -> bool {
        self.allow_missing_column_names
    }

    pub fn trailing_delimiter(&self) -> bool {
        self.trailing_delimiter
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    pub fn lenient_eof(&self) -> bool {
        self.lenient_eof
    }

    pub fn trailing_data(&self) -> bool {
        self.trailing_data
    }

    pub fn unicode_escapes(&self) -> bool {
        self.unicode_escapes
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn header_comments(&self) -> Option<&[String]> {
        self.header_comments.as_deref()
    }

    pub fn max_rows(&self) -> Option<u64> {
        self.max_rows
    }

    /// Whether `c` begins the (possibly multi-character) delimiter.
    pub(crate) fn is_delimiter_start(&self, c: char) -> bool {
        self.delimiter.chars().next() == Some(c)
    }

    pub(crate) fn delimiter_len(&self) -> usize {
        self.delimiter.chars().count()
    }
}

/// Fluent builder for [`Dialect`].
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    delimiter: String,
    quote: Option<char>,
    escape: Option<char>,
    comment_marker: Option<char>,
    record_separator: String,
    null_string: Option<String>,
    quote_mode: QuoteMode,
    duplicate_header_mode: DuplicateHeaderMode,
    ignore_surrounding_spaces: bool,
    ignore_empty_lines: bool,
    ignore_header_case: bool,
    skip_header_record: bool,
    allow_missing_column_names: bool,
    trailing_delimiter: bool,
    trim: bool,
    auto_flush: bool,
    lenient_eof: bool,
    trailing_data: bool,
    unicode_escapes: bool,
    headers: Option<Vec<String>>,
    header_comments: Option<Vec<String>>,
    max_rows: Option<u64>,
}

impl Default for DialectBuilder {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quote: Some('"'),
            escape: None,
            comment_marker: None,
            record_separator: "\r\n".to_string(),
            null_string: None,
            quote_mode: QuoteMode::Minimal,
            duplicate_header_mode: DuplicateHeaderMode::AllowAll,
            ignore_surrounding_spaces: false,
            ignore_empty_lines: true,
            ignore_header_case: false,
            skip_header_record: false,
            allow_missing_column_names: false,
            trailing_delimiter: false,
            trim: false,
            auto_flush: false,
            lenient_eof: false,
            trailing_data: false,
            unicode_escapes: false,
            headers: None,
            header_comments: None,
            max_rows: None,
        }
    }
}

fn reject_line_break(name: &str, s: &str) -> Result<(), InvalidDialect> {
    if s.contains('\r') || s.contains('\n') {
        return Err(InvalidDialect::new(format!(
            "{name} must not contain CR or LF"
        )));
    }
    Ok(())
}

impl DialectBuilder {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    pub fn escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    pub fn comment_marker(mut self, marker: Option<char>) -> Self {
        self.comment_marker = marker;
        self
    }

    pub fn record_separator(mut self, sep: impl Into<String>) -> Self {
        self.record_separator = sep.into();
        self
    }

    pub fn null_string(mut self, null_string: Option<impl Into<String>>) -> Self {
        self.null_string = null_string.map(Into::into);
        self
    }

    pub fn quote_mode(mut self, mode: QuoteMode) -> Self {
        self.quote_mode = mode;
        self
    }

    pub fn duplicate_header_mode(mut self, mode: DuplicateHeaderMode) -> Self {
        self.duplicate_header_mode = mode;
        self
    }

    pub fn ignore_surrounding_spaces(mut self, v: bool) -> Self {
        self.ignore_surrounding_spaces = v;
        self
    }

    pub fn ignore_empty_lines(mut self, v: bool) -> Self {
        self.ignore_empty_lines = v;
        self
    }

    pub fn ignore_header_case(mut self, v: bool) -> Self {
        self.ignore_header_case = v;
        self
    }

    pub fn skip_header_record(mut self, v: bool) -> Self {
        self.skip_header_record = v;
        self
    }

    pub fn allow_missing_column_names(mut self, v: bool) -> Self {
        self.allow_missing_column_names = v;
        self
    }

    pub fn trailing_delimiter(mut self, v: bool) -> Self {
        self.trailing_delimiter = v;
        self
    }

    pub fn trim(mut self, v: bool) -> Self {
        self.trim = v;
        self
    }

    pub fn auto_flush(mut self, v: bool) -> Self {
        self.auto_flush = v;
        self
    }

    pub fn lenient_eof(mut self, v: bool) -> Self {
        self.lenient_eof = v;
        self
    }

    pub fn trailing_data(mut self, v: bool) -> Self {
        self.trailing_data = v;
        self
    }

    pub fn unicode_escapes(mut self, v: bool) -> Self {
        self.unicode_escapes = v;
        self
    }

    /// `Some(vec![])` means "auto-read the header from the first record".
    pub fn headers(mut self, headers: Option<Vec<String>>) -> Self {
        self.headers = headers;
        self
    }

    pub fn header_comments(mut self, comments: Option<Vec<String>>) -> Self {
        self.header_comments = comments;
        self
    }

    pub fn max_rows(mut self, max_rows: Option<u64>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Validate and produce an immutable [`Dialect`].
    pub fn build(self) -> Result<Dialect, InvalidDialect> {
        if self.delimiter.is_empty() {
            return Err(InvalidDialect::new("delimiter must not be empty"));
        }
        reject_line_break("delimiter", &self.delimiter)?;

        let mut seen_chars: HashSet<char> = HashSet::new();
        for (name, c) in [
            ("quote", self.quote),
            ("escape", self.escape),
            ("commentMarker", self.comment_marker),
        ] {
            if let Some(c) = c {
                if matches!(c, '\r' | '\n') {
                    return Err(InvalidDialect::new(format!(
                        "{name} must not be CR or LF"
                    )));
                }
                if self.delimiter.contains(c) {
                    return Err(InvalidDialect::new(format!(
                        "{name} must not overlap the delimiter"
                    )));
                }
                if !seen_chars.insert(c) {
                    return Err(InvalidDialect::new(format!(
                        "{name} must be distinct from quote/escape/commentMarker"
                    )));
                }
            }
        }

        if self.quote_mode == QuoteMode::None && self.escape.is_none() {
            return Err(InvalidDialect::new(
                "quoteMode=NONE requires an escape character",
            ));
        }

        if let Some(headers) = &self.headers {
            if !headers.is_empty() {
                validate_duplicate_headers(headers, self.duplicate_header_mode)?;
            }
        }

        let quoted_null = match (self.quote, &self.null_string) {
            (Some(q), Some(n)) => Some(format!("{q}{n}{q}")),
            _ => None,
        };

        Ok(Dialect {
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
            comment_marker: self.comment_marker,
            record_separator: self.record_separator,
            null_string: self.null_string,
            quoted_null,
            quote_mode: self.quote_mode,
            duplicate_header_mode: self.duplicate_header_mode,
            ignore_surrounding_spaces: self.ignore_surrounding_spaces,
            ignore_empty_lines: self.ignore_empty_lines,
            ignore_header_case: self.ignore_header_case,
            skip_header_record: self.skip_header_record,
            allow_missing_column_names: self.allow_missing_column_names,
            trailing_delimiter: self.trailing_delimiter,
            trim: self.trim,
            auto_flush: self.auto_flush,
            lenient_eof: self.lenient_eof,
            trailing_data: self.trailing_data,
            unicode_escapes: self.unicode_escapes,
            headers: self.headers,
            header_comments: self.header_comments,
            max_rows: self.max_rows,
        })
    }
}

pub(crate) fn validate_duplicate_headers(
    headers: &[String],
    mode: DuplicateHeaderMode,
) -> Result<(), InvalidDialect> {
    match mode {
        DuplicateHeaderMode::AllowAll => Ok(()),
        DuplicateHeaderMode::AllowEmpty => {
            let mut seen_non_blank: HashSet<&str> = HashSet::new();
            for h in headers {
                if h.trim().is_empty() {
                    continue;
                }
                if !seen_non_blank.insert(h.as_str()) {
                    return Err(InvalidDialect::new(format!(
                        "duplicate header name {h:?}"
                    )));
                }
            }
            Ok(())
        }
        DuplicateHeaderMode::Disallow => {
            let mut seen: HashSet<&str> = HashSet::new();
            for h in headers {
                if !seen.insert(h.as_str()) {
                    return Err(InvalidDialect::new(format!(
                        "duplicate header name {h:?}"
                    )));
                }
            }
            Ok(())
        }
    }
}

/// RFC 4180 plus Excel-friendly extras; the library's catch-all default.
/// `,` delimiter, `"` quote, CRLF record separator, blank lines skipped,
/// duplicate header names freely allowed.
pub fn default_dialect() -> Dialect {
    Dialect::builder()
        .duplicate_header_mode(DuplicateHeaderMode::AllowAll)
        .build()
        .expect("default dialect is always valid")
}

/// Strict RFC 4180: no blank-line skipping.
pub fn rfc4180() -> Dialect {
    Dialect::builder()
        .ignore_empty_lines(false)
        .build()
        .expect("rfc4180 dialect is always valid")
}

/// Microsoft Excel's CSV export/import dialect.
pub fn excel() -> Dialect {
    Dialect::builder()
        .ignore_empty_lines(false)
        .allow_missing_column_names(true)
        .trailing_data(true)
        .lenient_eof(true)
        .build()
        .expect("excel dialect is always valid")
}

/// Tab-delimited format with surrounding-space trimming.
pub fn tdf() -> Dialect {
    Dialect::builder()
        .delimiter("\t")
        .ignore_empty_lines(true)
        .ignore_surrounding_spaces(true)
        .build()
        .expect("tdf dialect is always valid")
}

/// `mysqldump`/`LOAD DATA`/`SELECT ... INTO OUTFILE` text format.
pub fn mysql() -> Dialect {
    Dialect::builder()
        .delimiter("\t")
        .quote(None)
        .escape(Some('\\'))
        .record_separator("\n")
        .null_string(Some("\\N"))
        .quote_mode(QuoteMode::AllNonNull)
        .ignore_empty_lines(false)
        .build()
        .expect("mysql dialect is always valid")
}

/// PostgreSQL `COPY ... CSV` format. NULL is an empty unquoted field; an
/// actual empty string is written as a quoted empty field (`""`) so the two
/// remain distinguishable on read-back.
pub fn postgresql_csv() -> Dialect {
    Dialect::builder()
        .record_separator("\n")
        .null_string(Some(""))
        .quote_mode(QuoteMode::AllNonNull)
        .ignore_empty_lines(false)
        .build()
        .expect("postgresql_csv dialect is always valid")
}

/// PostgreSQL `COPY ... (FORMAT text)` format.
pub fn postgresql_text() -> Dialect {
    Dialect::builder()
        .delimiter("\t")
        .quote(None)
        .escape(Some('\\'))
        .record_separator("\n")
        .null_string(Some("\\N"))
        .quote_mode(QuoteMode::AllNonNull)
        .ignore_empty_lines(false)
        .build()
        .expect("postgresql_text dialect is always valid")
}

#[cfg(windows)]
const OS_LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const OS_LINE_SEPARATOR: &str = "\n";

/// Oracle SQL*Loader export/import format.
pub fn oracle() -> Dialect {
    Dialect::builder()
        .escape(Some('\\'))
        .record_separator(OS_LINE_SEPARATOR)
        .null_string(Some("\\N"))
        .quote_mode(QuoteMode::Minimal)
        .ignore_empty_lines(false)
        .trim(true)
        .build()
        .expect("oracle dialect is always valid")
}

/// Informix `UNLOAD` pipe-delimited format.
pub fn informix_unload() -> Dialect {
    Dialect::builder()
        .delimiter("|")
        .escape(Some('\\'))
        .record_separator("\n")
        .build()
        .expect("informix_unload dialect is always valid")
}

/// Informix `UNLOAD` in CSV form.
pub fn informix_unload_csv() -> Dialect {
    Dialect::builder()
        .record_separator("\n")
        .build()
        .expect("informix_unload_csv dialect is always valid")
}

/// `mongoexport --type=csv` format: doubled-quote escaping, no separate
/// escape character. Source tables list `escape = "` here, but quote and
/// escape must be distinct characters in this dialect model (see
/// `DialectBuilder::build`), and doubled-quote collapsing inside a quoted
/// field is already unconditional in the lexer regardless of `escape` — so
/// `escape = quote` would both fail to build and add nothing. Left unset;
/// see DESIGN.md.
pub fn mongodb_csv() -> Dialect {
    Dialect::builder()
        .quote_mode(QuoteMode::Minimal)
        .build()
        .expect("mongodb_csv dialect is always valid")
}

/// `mongoexport --type=tsv` format. Same escape-column note as
/// [`mongodb_csv`].
pub fn mongodb_tsv() -> Dialect {
    Dialect::builder()
        .delimiter("\t")
        .quote_mode(QuoteMode::Minimal)
        .build()
        .expect("mongodb_tsv dialect is always valid")
}
