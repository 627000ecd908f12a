mod input;
mod tokens;

use std::path::PathBuf;

pub use input::{COMMAND_LINE, ProgramSource};
pub use tokens::{
    Builtin, Token, TokenClass, TokenKind, builtin_lookup, keyword_to_token, one_char_token,
    two_char_token,
};

use input::Input;

use crate::error::{Diagnostic, Error, Result};
use crate::value::parse_number_prefix;

/// Characters that may follow `\` in a regex without a warning
const REGEX_META: &[u8] = b".[]()*+?{}|^$-";

/// Lexer configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Echo each program line to stderr as it is read
    pub echo_source: bool,
}

/// AWK lexer producing one token per call
///
/// The current token is overwritten by each call to [`Lexer::next_token`].
/// Whether `/` starts a regex or divides is decided from the kind of the
/// previous token alone, so callers must not skip tokens.
pub struct Lexer {
    input: Input,
    /// One character of lookahead; `None` at end of input
    ch: Option<u8>,
    primed: bool,
    token: Token,
    prev_kind: TokenKind,
    warnings: Vec<Diagnostic>,
}

impl Lexer {
    /// Lexer over an inline program
    pub fn new(source: &str) -> Self {
        Self::from_input(Input::from_text(source.to_string(), false))
    }

    /// Lexer over program files read in order; `-` is standard input
    pub fn from_files<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        Self::with_options(ProgramSource::Files(paths), LexerOptions::default())
    }

    /// Lexer over any program source with explicit options
    pub fn with_options(source: ProgramSource, options: LexerOptions) -> Result<Self> {
        Ok(Self::from_input(Input::new(source, options.echo_source)?))
    }

    fn from_input(input: Input) -> Self {
        let location = input.location();
        Self {
            input,
            ch: None,
            primed: false,
            token: Token::new(TokenKind::Eof, location),
            prev_kind: TokenKind::Eof,
            warnings: Vec::new(),
        }
    }

    /// Tokenize the entire source, returning all tokens through `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?.clone();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Scan the next token. Errors are fatal: the lexer is not meant to be
    /// resumed after one.
    pub fn next_token(&mut self) -> Result<&Token> {
        if !self.primed {
            self.primed = true;
            self.gch()?;
        }
        self.prev_kind = self.token.kind;
        let div_allowed = self.prev_kind.produces_value();
        self.scan(div_allowed)?;
        tracing::trace!(
            kind = %self.token.kind,
            line = self.token.location.line,
            text = %self.token.text_lossy(),
            "token"
        );
        Ok(&self.token)
    }

    /// The most recently scanned token
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Kind of the token before the current one
    pub fn prev_kind(&self) -> TokenKind {
        self.prev_kind
    }

    /// Warnings recorded so far
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Drain the recorded warnings
    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    /// Advance the lookahead, dropping carriage returns
    fn gch(&mut self) -> Result<()> {
        loop {
            self.ch = self.input.get_char()?;
            if self.ch != Some(b'\r') {
                return Ok(());
            }
        }
    }

    fn push(&mut self, c: u8) {
        self.token.text.push(c);
    }

    /// Move the lookahead into the token text
    fn append_char(&mut self) -> Result<()> {
        if let Some(c) = self.ch {
            self.push(c);
        }
        self.gch()
    }

    fn skip_blanks(&mut self) -> Result<()> {
        while matches!(self.ch, Some(b' ' | b'\t')) {
            self.gch()?;
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::lexer(message, self.token.location.clone())
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(Diagnostic::new(self.input.location(), message));
    }

    fn scan(&mut self, div_allowed: bool) -> Result<()> {
        self.token.text.clear();
        self.token.value = 0.0;

        loop {
            self.skip_blanks()?;
            if self.ch != Some(b'\\') {
                break;
            }
            let location = self.input.location();
            self.gch()?;
            if self.ch != Some(b'\n') {
                return Err(Error::lexer("backslash not last char in line", location));
            }
            self.gch()?;
        }
        self.token.location = self.input.location();

        // A backslash-newline inside a comment does not continue it.
        if self.ch == Some(b'#') {
            while !matches!(self.ch, Some(b'\n') | None) {
                self.gch()?;
            }
        }

        self.token.kind = match self.ch {
            None => TokenKind::Eof,
            Some(b'\n') => {
                self.append_char()?;
                TokenKind::Newline
            }
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.scan_word()?,
            Some(b'"') => {
                self.scan_literal(b'"')?;
                TokenKind::String
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => {
                self.scan_number()?;
                TokenKind::Number
            }
            Some(b'/') if !div_allowed => {
                self.scan_literal(b'/')?;
                TokenKind::Regex
            }
            Some(0) => {
                self.append_char()?;
                return Err(self.error("null char"));
            }
            Some(c) => self.scan_operator(c)?,
        };
        Ok(())
    }

    fn scan_word(&mut self) -> Result<TokenKind> {
        while matches!(self.ch, Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.append_char()?;
        }
        if let Some(kind) = keyword_to_token(&self.token.text) {
            return Ok(kind);
        }
        if let Some(builtin) = builtin_lookup(&self.token.text) {
            return Ok(TokenKind::Builtin(builtin));
        }
        if self.ch == Some(b'(') {
            return Ok(TokenKind::UserFunc);
        }
        // Let the parser see a following `,` or `)` directly.
        self.skip_blanks()?;
        Ok(TokenKind::Var)
    }

    /// Numbers never span lines, so the rest of the current line is enough
    /// lookahead for the float parser.
    fn scan_number(&mut self) -> Result<()> {
        let mut text = Vec::with_capacity(32);
        text.extend(self.ch);
        text.extend_from_slice(self.input.rest_of_line());

        match parse_number_prefix(&text) {
            Some((value, len)) => {
                self.token.value = value;
                for _ in 0..len {
                    self.append_char()?;
                }
                Ok(())
            }
            None => {
                self.append_char()?;
                Err(self.error(format!(
                    "Unexpected token '{}'",
                    self.token.text_lossy()
                )))
            }
        }
    }

    /// String or regex body; the lookahead is the opening delimiter
    fn scan_literal(&mut self, endchar: u8) -> Result<()> {
        let is_regex = endchar == b'/';
        let what = if is_regex { "regex" } else { "string" };
        self.gch()?;
        loop {
            match self.ch {
                Some(c) if c == endchar => break,
                None => return Err(self.error(format!("EOF in {what}"))),
                Some(b'\n') => return Err(self.error(format!("unterminated {what}"))),
                Some(b'\\') => {
                    self.gch()?;
                    self.scan_escape(is_regex)?;
                }
                Some(_) => self.append_char()?,
            }
        }
        self.gch()
    }

    /// Escape body; the lookahead is the character after the backslash
    fn scan_escape(&mut self, is_regex: bool) -> Result<()> {
        let Some(c) = self.ch else {
            return Ok(());
        };
        if c == b'\n' {
            // continuation inside the literal
            return self.gch();
        }
        if let Some(mapped) = simple_escape(c) {
            self.push(mapped);
            if is_regex && mapped == b'\\' {
                self.push(b'\\');
            }
            return self.gch();
        }
        if c == b'x' {
            self.gch()?;
            match self.ch.and_then(hex_value) {
                Some(high) => {
                    self.gch()?;
                    let mut byte = high;
                    if let Some(low) = self.ch.and_then(hex_value) {
                        byte = byte * 16 + low;
                        self.gch()?;
                    }
                    self.push(byte);
                }
                None => self.push(b'x'),
            }
            return Ok(());
        }
        if c.is_ascii_digit() {
            if c >= b'8' {
                return self.append_char();
            }
            let mut code: u32 = 0;
            for _ in 0..3 {
                match self.ch {
                    Some(d @ b'0'..=b'7') => {
                        code = code * 8 + u32::from(d - b'0');
                        self.gch()?;
                    }
                    _ => break,
                }
            }
            // \400 and up wrap like a C char
            self.push(code as u8);
            return Ok(());
        }

        // Unknown escape. The character itself is taken by the caller's loop.
        let shown = char::from(c);
        if is_regex {
            if !REGEX_META.contains(&c) {
                self.warn(format!("'\\{shown}' -- unknown regex escape"));
            }
            self.push(b'\\');
        } else {
            self.warn(format!("'\\{shown}' treated as plain '{shown}'"));
        }
        Ok(())
    }

    /// Operators and punctuation; longest match wins
    fn scan_operator(&mut self, first: u8) -> Result<TokenKind> {
        self.append_char()?;

        if first == b'*' && self.ch == Some(b'*') {
            self.append_char()?;
            if self.ch == Some(b'=') {
                self.append_char()?;
                return Ok(TokenKind::PowAssign);
            }
            return Ok(TokenKind::Pow);
        }

        if let Some(second) = self.ch
            && let Some(kind) = two_char_token(first, second)
        {
            self.append_char()?;
            return Ok(kind);
        }

        one_char_token(first).ok_or_else(|| {
            self.error(format!("Unexpected token '{}'", self.token.text_lossy()))
        })
    }
}

/// Escapes shared by strings and regexes
fn simple_escape(c: u8) -> Option<u8> {
    match c {
        b'\\' => Some(b'\\'),
        b'a' => Some(0x07),
        b'b' => Some(0x08),
        b'f' => Some(0x0c),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        b'v' => Some(0x0b),
        b'"' => Some(b'"'),
        b'/' => Some(b'/'),
        _ => None,
    }
}

fn hex_value(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}
