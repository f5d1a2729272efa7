//! SQL tokenization
//!
//! This module handles breaking Firebird SQL input into tokens. Whitespace
//! and comments are retained on the token stream in their own lists so the
//! parse-relevant token sequence stays dense, while concatenating every
//! produced token in order still reproduces the input exactly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Problem;
use crate::parser::firebird::{KEYWORDS, RESERVED_WORDS};

/// Token classification for the SQL lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    RegularIdentifier,
    NonRegularIdentifier,
    Variable,
    Introducer,
    String,
    Integer,
    FixedPoint,
    FloatingPoint,
    Operator,
    SpecialCharacter,
    LParen,
    RParen,
    Semicolon,
    Asterisk,
    Comma,
    Dot,
    WhiteSpace,
    Comment,
    Eof,
}

/// A single lexed token with half-open byte offsets into the source.
///
/// `is_keyword`/`is_reserved` are only ever set on regular identifiers,
/// derived from the static Firebird word lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub start: u32,
    pub end: u32,
    pub kind: TokenKind,
    pub is_keyword: bool,
    pub is_reserved: bool,
}

impl Token {
    fn new(text: impl Into<String>, start: u32, end: u32, kind: TokenKind) -> Self {
        Token {
            text: text.into(),
            start,
            end,
            kind,
            is_keyword: false,
            is_reserved: false,
        }
    }

    /// True for regular and quoted identifiers.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::RegularIdentifier | TokenKind::NonRegularIdentifier
        )
    }

    /// Case-insensitive text comparison, for keyword checks.
    pub fn text_is(&self, word: &str) -> bool {
        self.text.eq_ignore_ascii_case(word)
    }
}

/// The lexed form of one document version.
///
/// Produced once by [`lex`] and immutable afterwards; the parser only reads
/// from it.
#[derive(Debug, Clone)]
pub struct TokenStream {
    pub text: String,
    pub tokens: Vec<Token>,
    pub comments: Vec<Token>,
    pub whitespace: Vec<Token>,
    pub problems: Vec<Problem>,
}

static REGULAR_IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][\w$]*").unwrap());
static NON_REGULAR_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"((?:[^"]|"")*(?:[^ "]|""))? *(?:"|$)"#).unwrap());
static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^:(?:[A-Za-z][\w$]*|"((?:[^"]|"")*(?:[^ "]|""))? *(?:"|$))"#).unwrap());
static INTRODUCER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_[\w$]*").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(--.*|/\*[\s\S]*?\*/)").unwrap());
static OPERATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(<[>=]?|>=?|[!~^][<>=]|\|\||[-+*/=])").unwrap());
static SPECIAL_CHARACTERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[\\"%&'()*+,\-./:;<=>?\[\]^{}]"#).unwrap());

const WHITESPACE: &[char] = &['\t', ' ', '\n', '\r', '\u{0B}', '\u{12}'];

/// Tokenize SQL input. Total: always terminates with a zero-width EOF token,
/// recording problems (unterminated strings, unexpected characters) instead
/// of failing.
pub fn lex(source: &str) -> TokenStream {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    text: &'a str,
    index: usize,
    stream: TokenStream,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            text,
            index: 0,
            stream: TokenStream {
                text: text.to_string(),
                tokens: Vec::new(),
                comments: Vec::new(),
                whitespace: Vec::new(),
                problems: Vec::new(),
            },
        }
    }

    fn run(mut self) -> TokenStream {
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            self.index += token.text.len();
            match token.kind {
                TokenKind::Comment => self.stream.comments.push(token),
                TokenKind::WhiteSpace => self.stream.whitespace.push(token),
                _ => self.stream.tokens.push(token),
            }
            if is_eof {
                break;
            }
        }
        self.stream
    }

    fn token(&self, text: impl Into<String>, kind: TokenKind) -> Token {
        let text = text.into();
        let start = self.index as u32;
        let end = (self.index + text.len()) as u32;
        Token::new(text, start, end, kind)
    }

    fn next_token(&mut self) -> Token {
        let rest = &self.text[self.index..];
        if rest.is_empty() {
            return self.token("", TokenKind::Eof);
        }

        if let Some(ws) = match_whitespace(rest) {
            return self.token(ws, TokenKind::WhiteSpace);
        }

        if let Some(m) = REGULAR_IDENTIFIER_RE.find(rest) {
            // A lone `q` or `x` directly followed by a quote opens a string
            // literal, not an identifier.
            let opens_string =
                m.len() == 1 && matches!(m.as_str(), "q" | "Q" | "x" | "X") && rest[1..].starts_with('\'');
            if !opens_string {
                let mut token = self.token(m.as_str(), TokenKind::RegularIdentifier);
                let upper = token.text.to_uppercase();
                if KEYWORDS.contains(upper.as_str()) {
                    token.is_keyword = true;
                    if RESERVED_WORDS.contains(upper.as_str()) {
                        token.is_reserved = true;
                    }
                }
                return token;
            }
        }

        if rest.starts_with('.') {
            return self.token(".", TokenKind::Dot);
        }

        if rest.starts_with(',') {
            return self.token(",", TokenKind::Comma);
        }

        if rest.starts_with('"') {
            if let Some(m) = NON_REGULAR_IDENTIFIER_RE.find(rest) {
                return self.token(m.as_str(), TokenKind::NonRegularIdentifier);
            }
        }

        if rest.starts_with(':') {
            if let Some(m) = VARIABLE_RE.find(rest) {
                return self.token(m.as_str(), TokenKind::Variable);
            }
        }

        if rest.starts_with('_') {
            if let Some(m) = INTRODUCER_RE.find(rest) {
                return self.token(m.as_str(), TokenKind::Introducer);
            }
        }

        if let Some(scanned) = scan_string(rest) {
            let token = self.token(&rest[..scanned.len], TokenKind::String);
            if scanned.unterminated {
                self.stream.problems.push(Problem::error(
                    token.start,
                    self.text.len() as u32,
                    "Unterminated String Literal",
                ));
            }
            return token;
        }

        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            if let Some((len, kind)) = match_number(rest) {
                return self.token(&rest[..len], kind);
            }
        }

        if rest.starts_with('(') {
            return self.token("(", TokenKind::LParen);
        }
        if rest.starts_with(')') {
            return self.token(")", TokenKind::RParen);
        }
        if rest.starts_with(';') {
            return self.token(";", TokenKind::Semicolon);
        }
        if rest.starts_with('*') {
            return self.token("*", TokenKind::Asterisk);
        }

        if let Some(m) = COMMENT_RE.find(rest) {
            return self.token(m.as_str(), TokenKind::Comment);
        }

        if let Some(m) = OPERATORS_RE.find(rest) {
            return self.token(m.as_str(), TokenKind::Operator);
        }

        if let Some(m) = SPECIAL_CHARACTERS_RE.find(rest) {
            return self.token(m.as_str(), TokenKind::SpecialCharacter);
        }

        // Should be unreachable for legal SQL text; absorb the character so
        // lexing stays total and the concatenation invariant holds.
        let ch = rest.chars().next().unwrap();
        let token = self.token(ch.to_string(), TokenKind::SpecialCharacter);
        self.stream.problems.push(Problem::error(
            token.start,
            token.end,
            format!("Unknown character: '{}'", ch),
        ));
        token
    }
}

fn match_whitespace(rest: &str) -> Option<&str> {
    let len: usize = rest
        .chars()
        .take_while(|c| WHITESPACE.contains(c))
        .map(|c| c.len_utf8())
        .sum();
    if len > 0 {
        Some(&rest[..len])
    } else {
        None
    }
}

pub(crate) struct ScannedString {
    pub len: usize,
    pub contents: String,
    pub unterminated: bool,
    /// `q'<d>...<d>'` form
    pub quoted_delimiter: bool,
    /// `x'...'` form
    pub hex: bool,
}

fn delimiter_pair(open: char) -> char {
    match open {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        '<' => '>',
        other => other,
    }
}

static PLAIN_STRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'((?:[^']|'')*)(?:'|($))").unwrap());
static HEX_STRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[xX]'((?:[^']|'')*)(?:'|($))").unwrap());

/// Probe `rest` for a string literal in any of the three Firebird forms.
/// Unterminated literals capture to end of input.
pub(crate) fn scan_string(rest: &str) -> Option<ScannedString> {
    let lower2 = rest.get(..2).map(|s| s.to_lowercase());
    if lower2.as_deref() == Some("q'") {
        let Some(open) = rest[2..].chars().next() else {
            // Input ends right after the opener.
            return Some(ScannedString {
                len: rest.len(),
                contents: String::new(),
                unterminated: true,
                quoted_delimiter: true,
                hex: false,
            });
        };
        let body_start = 2 + open.len_utf8();
        let close = delimiter_pair(open);
        let terminator: String = format!("{}'", close);
        return Some(match rest[body_start..].find(&terminator) {
            Some(pos) => ScannedString {
                len: body_start + pos + terminator.len(),
                contents: rest[body_start..body_start + pos].to_string(),
                unterminated: false,
                quoted_delimiter: true,
                hex: false,
            },
            None => ScannedString {
                len: rest.len(),
                contents: rest[body_start..].to_string(),
                unterminated: true,
                quoted_delimiter: true,
                hex: false,
            },
        });
    }
    if lower2.as_deref() == Some("x'") {
        let caps = HEX_STRING_RE.captures(rest)?;
        return Some(ScannedString {
            len: caps.get(0).unwrap().len(),
            contents: caps.get(1).map_or(String::new(), |m| m.as_str().to_string()),
            unterminated: caps.get(2).is_some(),
            quoted_delimiter: false,
            hex: true,
        });
    }
    if rest.starts_with('\'') {
        let caps = PLAIN_STRING_RE.captures(rest)?;
        return Some(ScannedString {
            len: caps.get(0).unwrap().len(),
            contents: caps
                .get(1)
                .map_or(String::new(), |m| m.as_str().replace("''", "'")),
            unterminated: caps.get(2).is_some(),
            quoted_delimiter: false,
            hex: false,
        });
    }
    None
}

/// Numeric literal scanning. Reproduces the reference patterns, including
/// their lookahead restrictions:
///
/// - integer: `0x[0-9a-f]+` or `\d+` not followed by `.`, a digit, or `e<digit>`
/// - fixed point: `\d+\.\d+` not followed by a digit or `e<digit>`
/// - floating point: `\d+\.?\d+e-?\d*` not followed by a digit
fn match_number(rest: &str) -> Option<(usize, TokenKind)> {
    let bytes = rest.as_bytes();
    let digits_at = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let exponent_follows = |at: usize| {
        bytes.get(at).is_some_and(|b| (b | 0x20) == b'e')
            && bytes.get(at + 1).is_some_and(|b| b.is_ascii_digit())
    };

    if bytes.first() == Some(&b'0') && bytes.get(1).is_some_and(|b| (b | 0x20) == b'x') {
        let hex = bytes[2..]
            .iter()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if hex > 0 {
            return Some((2 + hex, TokenKind::Integer));
        }
    }

    let int_len = digits_at(0);

    if bytes.get(int_len) != Some(&b'.') && !exponent_follows(int_len) {
        return Some((int_len, TokenKind::Integer));
    }

    if bytes.get(int_len) == Some(&b'.') {
        let frac = digits_at(int_len + 1);
        if frac > 0 {
            let end = int_len + 1 + frac;
            if !exponent_follows(end) {
                return Some((end, TokenKind::FixedPoint));
            }
            let mut i = end + 1;
            if bytes.get(i) == Some(&b'-') {
                i += 1;
            }
            i += digits_at(i);
            return Some((i, TokenKind::FloatingPoint));
        }
        return None;
    }

    // No dot: the floating form needs at least two digits before the exponent.
    if int_len >= 2 && exponent_follows(int_len) {
        let mut i = int_len + 1;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        i += digits_at(i);
        return Some((i, TokenKind::FloatingPoint));
    }

    None
}
