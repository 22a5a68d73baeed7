//! Byte-level tokenizer
//!
//! All delimiters HCL cares about are ASCII, and UTF-8 continuation bytes never
//! collide with ASCII, so scanning bytes is safe. Token boundaries always land
//! on ASCII bytes except for single-byte `Other` tokens, which callers never
//! slice.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// Quoted string, including its quotes (the closing quote may be missing)
    Str,
    Heredoc,
    OpenBrace,
    CloseBrace,
    /// `[` or `(`
    OpenGroup,
    /// `]` or `)`
    CloseGroup,
    /// A lone `=` (never part of `==`, `!=`, `<=`, `>=` or `=>`)
    Assign,
    Newline,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    /// Literal value of a `Str` token with quotes stripped and simple escapes
    /// decoded. Template sequences such as `${path.module}` are kept verbatim.
    pub fn string_value(&self, src: &str) -> Option<String> {
        if self.kind != TokenKind::Str {
            return None;
        }
        let raw = self.text(src);
        let inner = raw.strip_prefix('"').unwrap_or(raw);
        let inner = inner.strip_suffix('"').unwrap_or(inner);

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        }
        Some(out)
    }
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        bytes: src.as_bytes(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) -> Option<Token> {
        self.pos = end;
        Some(Token { kind, start, end })
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let b = *self.bytes.get(self.pos)?;
            let start = self.pos;

            match b {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => return self.emit(TokenKind::Newline, start, start + 1),
                b'#' => self.skip_line(),
                b'/' if self.peek(1) == Some(b'/') => self.skip_line(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
                b'"' => {
                    let end = scan_string(self.bytes, start + 1);
                    return self.emit(TokenKind::Str, start, end);
                }
                b'<' if self.peek(1) == Some(b'<') => {
                    return match scan_heredoc(self.bytes, start) {
                        Some(end) => self.emit(TokenKind::Heredoc, start, end),
                        None => self.emit(TokenKind::Other, start, start + 2),
                    };
                }
                b'{' => return self.emit(TokenKind::OpenBrace, start, start + 1),
                b'}' => return self.emit(TokenKind::CloseBrace, start, start + 1),
                b'[' | b'(' => return self.emit(TokenKind::OpenGroup, start, start + 1),
                b']' | b')' => return self.emit(TokenKind::CloseGroup, start, start + 1),
                b'=' if matches!(self.peek(1), Some(b'=') | Some(b'>')) => {
                    return self.emit(TokenKind::Other, start, start + 2);
                }
                b'=' => return self.emit(TokenKind::Assign, start, start + 1),
                b'!' | b'<' | b'>' if self.peek(1) == Some(b'=') => {
                    return self.emit(TokenKind::Other, start, start + 2);
                }
                b if is_ident_start(b) => {
                    let mut end = start + 1;
                    while end < self.bytes.len() && is_ident_continue(self.bytes[end]) {
                        end += 1;
                    }
                    return self.emit(TokenKind::Ident, start, end);
                }
                _ => return self.emit(TokenKind::Other, start, start + 1),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.bytes.get(self.pos) {
            if *b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn trim_blank(mut line: &[u8]) -> &[u8] {
    while let [b' ' | b'\t' | b'\r', rest @ ..] = line {
        line = rest;
    }
    while let [rest @ .., b' ' | b'\t' | b'\r'] = line {
        line = rest;
    }
    line
}

/// Scans a quoted string starting just after its opening quote and returns the
/// offset just past the closing quote. Quoted strings cannot span lines, so an
/// unterminated string stops at the newline.
fn scan_string(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            b'\n' => return i,
            b'$' | b'%' if bytes.get(i + 1) == Some(&bytes[i]) => i += 2,
            b'$' | b'%' if bytes.get(i + 1) == Some(&b'{') => i = scan_template(bytes, i + 2),
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Scans a `${ ... }` / `%{ ... }` sequence starting after its opening brace.
fn scan_template(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = scan_string(bytes, i + 1),
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Scans `<<MARKER` / `<<-MARKER` heredocs. Returns the offset at the end of
/// the closing marker line (the newline itself is left for the caller), or
/// `None` when the `<<` does not introduce a heredoc.
fn scan_heredoc(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 2;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }

    let marker_start = i;
    while i < bytes.len() && is_ident_continue(bytes[i]) {
        i += 1;
    }
    let marker = &bytes[marker_start..i];
    if marker.is_empty() || !is_ident_start(marker[0]) {
        return None;
    }

    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\r') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'\n') {
        return None;
    }

    let mut line_start = i + 1;
    while line_start < bytes.len() {
        let line_end = bytes[line_start..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|p| line_start + p)
            .unwrap_or(bytes.len());

        if trim_blank(&bytes[line_start..line_end]) == marker {
            return Some(line_end);
        }
        line_start = line_end + 1;
    }
    Some(bytes.len())
}
