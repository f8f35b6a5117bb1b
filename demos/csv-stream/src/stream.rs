//! Chunk-fed and lazy readers over the CSV grammar.
//!
//! [`CsvReader`] carries a suspended parse between chunks. There is no
//! buffering layer in front of it: the grammar is character-level, so a
//! chunk may end anywhere, including inside a quoted field or between a
//! closing quote and the doubled quote that would extend it. The reader
//! simply stays suspended until the text that settles the question
//! arrives.
//!
//! [`stream_rows`] trades suspension for laziness over complete text,
//! and [`read_stream`] drives a whole parse from an async chunk stream.

use futures_core::Stream;
use parsume::async_stream::futures_impl::drive;
use parsume::{Session, SliceInput, run_inc, run_many};

use crate::CsvError;
use crate::ast::Table;
use crate::grammar::{Chunked, document, row};

/// An incremental CSV parse, fed text as it arrives.
pub struct CsvReader {
    session: Session<Vec<Vec<String>>, Chunked>,
}

impl CsvReader {
    /// Starts a reader with nothing consumed yet.
    pub fn new() -> Self {
        Self {
            session: run_inc(document(), ()),
        }
    }

    /// Returns true once the outcome is settled, success or failure.
    ///
    /// A malformed chunk settles it early; feeding after that changes
    /// nothing.
    pub fn is_done(&self) -> bool {
        self.session.is_done()
    }

    /// Feeds the next piece of text. An empty string is a no-op.
    pub fn feed(self, text: &str) -> Self {
        Self {
            session: self.session.provide_str(text),
        }
    }

    /// Declares the input over and returns every row.
    pub fn finish(self) -> Result<Vec<Vec<String>>, CsvError> {
        self.session.finish().map_err(CsvError::from)
    }

    /// [`CsvReader::finish`], splitting off the header row.
    pub fn finish_table(self) -> Result<Table, CsvError> {
        Table::from_rows(self.finish()?)
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazily parses one line-terminated row at a time from complete text.
///
/// Rows before a malformed one still come out; the error arrives in
/// order as the final item. The final row must end in a line break,
/// since an unterminated [`row`] is an error here even though the batch
/// entry points accept one.
pub fn stream_rows(text: &str) -> impl Iterator<Item = Result<Vec<String>, CsvError>> {
    run_many(row(), text, ())
        .into_iter()
        .map(|record| record.map_err(CsvError::from))
}

/// Parses every row from an async stream of chunks.
///
/// Resolves once the parse settles or the stream ends, whichever comes
/// first.
pub async fn read_stream(
    chunks: impl Stream<Item = SliceInput<char>> + Unpin,
) -> Result<Vec<Vec<String>>, CsvError> {
    drive(chunks, run_inc(document(), ()))
        .await
        .map_err(CsvError::from)
}
