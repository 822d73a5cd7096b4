//! The scanner: turns query text into a token stream.

use tracing::trace;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AndOr {
    And,
    Or,
}

/// A token produced by [`scan`]. `span` is a half-open `[start, end)`
/// range of *char* offsets into the source (not byte offsets), useful
/// for error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Integer(i64),
    Float(f64),
    String(String),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    /// The `@` context sigil.
    Context,
    /// A recognised operator keyword, canonicalised to lowercase
    /// (`is`, `==`, `isnot`, `!=`, `<`, `<=`, `>`, `>=`, `contains`,
    /// `notcontains`, `inset`, `notinset`, `regexp`).
    Operator(String),
    AndOr(AndOr),
    End,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier '{s}'"),
            TokenKind::Integer(n) => write!(f, "integer {n}"),
            TokenKind::Float(n) => write!(f, "float {n}"),
            TokenKind::String(s) => write!(f, "string '{s}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Context => write!(f, "'@'"),
            TokenKind::Operator(s) => write!(f, "operator '{s}'"),
            TokenKind::AndOr(AndOr::And) => write!(f, "'AND'"),
            TokenKind::AndOr(AndOr::Or) => write!(f, "'OR'"),
            TokenKind::End => write!(f, "end of input"),
        }
    }
}

const OPERATOR_KEYWORDS: &[&str] = &[
    "isnot",
    "is",
    "contains",
    "notcontains",
    "inset",
    "notinset",
    "regexp",
];

/// Scans `input` into a token stream, always terminated by `End`.
pub fn scan(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (kind, next) = match c {
            '@' => (TokenKind::Context, i + 1),
            '(' => (TokenKind::LParen, i + 1),
            ')' => (TokenKind::RParen, i + 1),
            '[' => (TokenKind::LBracket, i + 1),
            ']' => (TokenKind::RBracket, i + 1),
            ',' => (TokenKind::Comma, i + 1),
            '\'' | '"' => scan_string(&chars, i)?,
            '=' if peek(&chars, i + 1) == Some('=') => (TokenKind::Operator("==".into()), i + 2),
            '!' if peek(&chars, i + 1) == Some('=') => (TokenKind::Operator("!=".into()), i + 2),
            '<' if peek(&chars, i + 1) == Some('=') => (TokenKind::Operator("<=".into()), i + 2),
            '<' => (TokenKind::Operator("<".into()), i + 1),
            '>' if peek(&chars, i + 1) == Some('=') => (TokenKind::Operator(">=".into()), i + 2),
            '>' => (TokenKind::Operator(">".into()), i + 1),
            c if c.is_ascii_digit() => scan_number(&chars, i)?,
            c if c.is_alphabetic() || c == '_' => scan_word(&chars, i),
            other => return Err(ParseError::UnexpectedChar { ch: other, pos: i }),
        };
        trace!(?kind, start = i, end = next, "scanned token");
        tokens.push(Token {
            kind,
            start: i,
            end: next,
        });
        i = next;
    }

    tokens.push(Token {
        kind: TokenKind::End,
        start: chars.len(),
        end: chars.len(),
    });
    Ok(tokens)
}

fn peek(chars: &[char], i: usize) -> Option<char> {
    chars.get(i).copied()
}

fn scan_word(chars: &[char], start: usize) -> (TokenKind, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
        i += 1;
    }
    let word: String = chars[start..i].iter().collect();

    if word == "AND" {
        return (TokenKind::AndOr(AndOr::And), i);
    }
    if word == "OR" {
        return (TokenKind::AndOr(AndOr::Or), i);
    }
    let lower = word.to_lowercase();
    if let Some(keyword) = OPERATOR_KEYWORDS.iter().find(|kw| **kw == lower) {
        return (TokenKind::Operator((*keyword).to_string()), i);
    }
    (TokenKind::Identifier(word), i)
}

fn scan_number(chars: &[char], start: usize) -> Result<(TokenKind, usize), ParseError> {
    let mut i = start;

    if chars[i] == '0' && matches!(peek(chars, i + 1), Some('x') | Some('X')) {
        i += 2;
        let digits_start = i;
        while i < chars.len() && chars[i].is_ascii_hexdigit() {
            i += 1;
        }
        if i == digits_start {
            return Err(ParseError::MalformedNumber { pos: start });
        }
        if peek(chars, i).is_some_and(|c| c.is_alphanumeric()) {
            return Err(ParseError::MalformedNumber { pos: start });
        }
        let text: String = chars[digits_start..i].iter().collect();
        let value = i64::from_str_radix(&text, 16)
            .map_err(|_| ParseError::MalformedNumber { pos: start })?;
        return Ok((TokenKind::Integer(value), i));
    }

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }

    // Scientific notation is explicitly unsupported; a letter glued to
    // a numeral of any kind is a lex error, which naturally rejects
    // `1a` and `1e3` alike.
    if peek(chars, i).is_some_and(|c| c.is_alphabetic()) {
        return Err(ParseError::MalformedNumber { pos: start });
    }

    if peek(chars, i) == Some('.') && peek(chars, i + 1).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if peek(chars, i).is_some_and(|c| c.is_alphabetic() || c == '.') {
            return Err(ParseError::MalformedNumber { pos: start });
        }
        let text: String = chars[start..i].iter().collect();
        let value = text
            .parse::<f64>()
            .map_err(|_| ParseError::MalformedNumber { pos: start })?;
        return Ok((TokenKind::Float(value), i));
    }

    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<i64>()
        .map_err(|_| ParseError::MalformedNumber { pos: start })?;
    Ok((TokenKind::Integer(value), i))
}

fn scan_string(chars: &[char], start: usize) -> Result<(TokenKind, usize), ParseError> {
    let quote = chars[start];
    let mut i = start + 1;
    let mut decoded = String::new();

    loop {
        match peek(chars, i) {
            None => return Err(ParseError::UnterminatedString { pos: start }),
            Some(c) if c == quote => {
                i += 1;
                break;
            }
            Some('\\') => {
                i += 1;
                match peek(chars, i) {
                    Some('\\') => {
                        decoded.push('\\');
                        i += 1;
                    }
                    Some('n') => {
                        decoded.push('\n');
                        i += 1;
                    }
                    Some('x') => {
                        let hex: Option<String> = match (peek(chars, i + 1), peek(chars, i + 2)) {
                            (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit() => {
                                Some([a, b].iter().collect())
                            }
                            _ => None,
                        };
                        let Some(hex) = hex else {
                            return Err(ParseError::InvalidHexEscape { pos: i - 1 });
                        };
                        let byte = u8::from_str_radix(&hex, 16)
                            .map_err(|_| ParseError::InvalidHexEscape { pos: i - 1 })?;
                        decoded.push(byte as char);
                        i += 3;
                    }
                    Some(other) => return Err(ParseError::InvalidEscape { ch: other, pos: i - 1 }),
                    None => return Err(ParseError::UnterminatedString { pos: start }),
                }
            }
            Some(c) => {
                decoded.push(c);
                i += 1;
            }
        }
    }

    Ok((TokenKind::String(decoded), i))
}
