//! Lexer output (spec §3 "Token (C3 internal)").

/// The role a [`Token`] plays within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Internal-only placeholder before dispatch decides the real type.
    Invalid,
    /// A field followed by a delimiter; more fields follow in this record.
    Token,
    /// A field terminated by end-of-record.
    Eorecord,
    /// A field terminated by end-of-stream.
    Eof,
    /// A full comment line.
    Comment,
}

/// Reusable lexer token. The lexer resets and refills the same `Token`
/// across calls rather than allocating a fresh one each time (spec §9,
/// "Reusable Token buffer") — callers must call [`Token::reset`] before each
/// `next_token` call, mirroring the teacher's reused `stmt_buffer: Vec<u8>`
/// in `Parser::read_statement`.
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub content: String,
    pub ready: bool,
    pub quoted: bool,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            token_type: TokenType::Invalid,
            content: String::new(),
            ready: false,
            quoted: false,
        }
    }
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears content and flags, readying the token for the next call.
    pub fn reset(&mut self) {
        self.token_type = TokenType::Invalid;
        self.content.clear();
        self.ready = false;
        self.quoted = false;
    }
}
