#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! CSV Streaming Example
//!
//! This example demonstrates character-level parsing on parsume: there is
//! no lexer in front, the grammar consumes characters directly, so one
//! grammar serves batch parsing, chunk-fed sessions, and lazy row streams.
//! Quoted fields may contain commas, doubled quotes, and line breaks,
//! which is exactly the input that line-based splitters get wrong.
//!
//! The dialect is a small RFC 4180 subset: comma separators, LF or CRLF
//! row ends, double-quoted fields with `""` escapes. A blank line is a row
//! with one empty field; a bare carriage return is an error.

use thiserror::Error;

use parsume::async_stream::FeedError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsvError {
    #[error("{0}")]
    Parse(parsume::Error<usize>),

    #[error("missing header row")]
    MissingHeader,

    #[error("row {row} has {found} fields, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    Feed(FeedError),
}

impl From<parsume::Error<usize>> for CsvError {
    fn from(err: parsume::Error<usize>) -> Self {
        Self::Parse(err)
    }
}

impl From<FeedError> for CsvError {
    fn from(err: FeedError) -> Self {
        Self::Feed(err)
    }
}

pub mod ast;
pub mod grammar;
pub mod print;
pub mod stream;

pub use ast::*;
