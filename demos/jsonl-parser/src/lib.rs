#![allow(clippy::len_without_is_empty)]
#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! JSON Lines Parser Example
//!
//! This example builds a JSON Lines (JSONL) parser on top of parsume. Each
//! line of the input is one JSON value, which makes the format a natural fit
//! for chunk-fed parsing: text arrives in arbitrary pieces, complete lines
//! are lexed as they become available, and the token chunks drive a single
//! resumable session.
//!
//! # Features
//!
//! - Complete JSON value parsing (objects, arrays, strings, numbers,
//!   booleans, null), including string escapes and surrogate pairs
//! - One grammar for both batch and chunk-fed runs; records may span lines
//!   (pretty-printed JSON suspends mid-record and resumes on the next chunk)
//! - Lazy per-record streaming over already-complete input
//!
//! # Format
//!
//! ```text
//! {"name": "Alice", "age": 30}
//! {"name": "Bob", "age": 25}
//! {"name": "Charlie", "age": 35}
//! ```

use logos::Logos;
use thiserror::Error;

#[derive(Error, Debug, Clone, Default, PartialEq)]
pub enum JsonError {
    #[default]
    #[error("unrecognized input")]
    Lex,

    #[error("invalid escape sequence")]
    Escape,

    #[error("{0}")]
    Parse(parsume::Error<usize>),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<JsonError>,
    },
}

impl From<parsume::Error<usize>> for JsonError {
    fn from(err: parsume::Error<usize>) -> Self {
        JsonError::Parse(err)
    }
}

impl JsonError {
    /// Wraps the failure with the input line it occurred on. Already-located
    /// failures pass through unchanged.
    pub fn on_line(self, line: usize) -> Self {
        match self {
            located @ JsonError::Line { .. } => located,
            source => JsonError::Line {
                line,
                source: Box::new(source),
            },
        }
    }

    /// The line a located failure occurred on.
    pub fn line(&self) -> Option<usize> {
        match self {
            JsonError::Line { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = JsonError)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Structural tokens
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    // Literals
    #[token("null")]
    Null,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // Strings, unescaped during lexing
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    // Numbers (kept textual to preserve precision)
    #[regex(r"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?", |lex| lex.slice().to_string())]
    Number(String),
}

/// Lexes a complete piece of source text into tokens.
///
/// Whitespace and newlines disappear here; JSON values are self-delimiting,
/// so the grammar never needs to see them. Line discipline lives in
/// [`stream::LineFeeder`], which refuses to lex a line until its newline has
/// arrived.
pub fn lex(text: &str) -> Result<Vec<Token>, JsonError> {
    Token::lexer(text).collect()
}

/// Resolves the escapes in a quoted string slice.
fn unescape(quoted: &str) -> Result<String, JsonError> {
    let body = &quoted[1..quoted.len() - 1];
    if !body.contains('\\') {
        return Ok(body.to_string());
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => out.push(unescape_unicode(&mut chars)?),
            _ => return Err(JsonError::Escape),
        }
    }
    Ok(out)
}

fn unescape_unicode(chars: &mut std::str::Chars<'_>) -> Result<char, JsonError> {
    let high = hex4(chars)?;
    if (0xd800..0xdc00).contains(&high) {
        // A high surrogate is only valid with an escaped low surrogate
        // right behind it.
        if chars.next() != Some('\\') || chars.next() != Some('u') {
            return Err(JsonError::Escape);
        }
        let low = hex4(chars)?;
        if !(0xdc00..0xe000).contains(&low) {
            return Err(JsonError::Escape);
        }
        let combined = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
        return char::from_u32(combined).ok_or(JsonError::Escape);
    }
    char::from_u32(high).ok_or(JsonError::Escape)
}

fn hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, JsonError> {
    let mut value = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(JsonError::Escape)?;
        value = value * 16 + digit;
    }
    Ok(value)
}

pub mod ast;
pub mod grammar;
pub mod stream;

pub use ast::*;
