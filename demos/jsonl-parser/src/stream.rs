//! Chunk-fed JSONL reading.
//!
//! Text arrives in arbitrary pieces (network reads, file blocks) that may
//! split a line, a token, or a multi-byte character. The pipeline here keeps
//! each concern in its own layer:
//!
//! 1. [`LineFeeder`] buffers raw text and lexes only newline-terminated
//!    lines, so the lexer never sees a cut token.
//! 2. [`JsonReader`] pushes the lexed token chunks into one resumable
//!    session over the whole-document grammar. A record that stops at a
//!    chunk boundary suspends and resumes on the next feed, which is why
//!    pretty-printed records spanning lines need no special handling.
//! 3. [`read_channel`] drives a reader from a tokio channel of text chunks.
//!
//! For input that is already complete, [`stream_values`] skips the session
//! and parses records lazily, paying only for the records consumed.

use std::mem;

use parsume::config::SessionConfig;
use parsume::{Session, SliceInput, State, run_inc, run_inc_state_with, run_many};
use tokio::sync::mpsc;

use crate::ast::JsonValue;
use crate::grammar::{Chunked, document, value};
use crate::{JsonError, Token, lex};

/// Buffers raw text and releases tokens a complete line at a time.
///
/// Holding back the trailing partial line is what makes lexing safe under
/// arbitrary chunking: a number or string cut by the chunk boundary stays in
/// the buffer until its line ends.
pub struct LineFeeder {
    buffer: String,
    line: usize,
}

impl LineFeeder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            line: 1,
        }
    }

    /// The 1-based line number the next complete line will get.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The buffered partial line, still waiting for its newline.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Buffers `text` and lexes every complete line now available.
    ///
    /// Lexing failures name the line they occurred on.
    pub fn feed(&mut self, text: &str) -> Result<Vec<Token>, JsonError> {
        self.buffer.push_str(text);
        let Some(split) = self.buffer.rfind('\n').map(|pos| pos + 1) else {
            return Ok(Vec::new());
        };
        let tail = self.buffer.split_off(split);
        let ready = mem::replace(&mut self.buffer, tail);

        let mut tokens = Vec::new();
        for line in ready.split_inclusive('\n') {
            match lex(line) {
                Ok(lexed) => tokens.extend(lexed),
                Err(err) => return Err(err.on_line(self.line)),
            }
            self.line += 1;
        }
        Ok(tokens)
    }

    /// Lexes whatever is still buffered, newline-terminated or not.
    pub fn finish(self) -> Result<Vec<Token>, JsonError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        lex(&self.buffer).map_err(|err| err.on_line(self.line))
    }
}

impl Default for LineFeeder {
    fn default() -> Self {
        Self::new()
    }
}

/// A push-fed JSONL reader: a [`LineFeeder`] in front of one resumable
/// session over [`document`].
///
/// Calls move the reader by value, mirroring the session it wraps; feeding
/// after the parse has resolved is a no-op.
pub struct JsonReader {
    feeder: LineFeeder,
    session: Session<Vec<JsonValue>, Chunked>,
}

impl JsonReader {
    pub fn new() -> Self {
        Self {
            feeder: LineFeeder::new(),
            session: run_inc(document(), ()),
        }
    }

    /// A reader whose session pre-allocates for the expected chunk count.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            feeder: LineFeeder::new(),
            session: run_inc_state_with(document(), State::new(SliceInput::new(Vec::new()), ()), config),
        }
    }

    /// Returns true once the parse has resolved, successfully or not.
    ///
    /// A malformed record resolves the parse mid-stream; callers can stop
    /// feeding as soon as this reports true.
    pub fn is_done(&self) -> bool {
        self.session.is_done()
    }

    /// Feeds one piece of raw text, of any size and split anywhere.
    pub fn feed(mut self, text: &str) -> Result<Self, JsonError> {
        let tokens = self.feeder.feed(text)?;
        let session = self.session;
        self.session = session.provide(SliceInput::from(tokens));
        Ok(self)
    }

    /// Declares the input complete and returns every record parsed.
    pub fn finish(self) -> Result<Vec<JsonValue>, JsonError> {
        let JsonReader { feeder, session } = self;
        let session = session.provide(SliceInput::from(feeder.finish()?));
        session.finish().map_err(JsonError::from)
    }
}

impl Default for JsonReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a whole document from an iterator of text chunks.
pub fn read_chunks<'a>(chunks: impl IntoIterator<Item = &'a str>) -> Result<Vec<JsonValue>, JsonError> {
    let mut reader = JsonReader::new();
    for chunk in chunks {
        reader = reader.feed(chunk)?;
        if reader.is_done() {
            break;
        }
    }
    reader.finish()
}

/// Collects every record arriving over `chunks`.
///
/// The receive loop mirrors the pump in [`parsume::async_stream`]: receive,
/// feed, stop early once the parse has resolved, then declare end-of-input
/// when the channel closes.
pub async fn read_channel(mut chunks: mpsc::Receiver<String>) -> Result<Vec<JsonValue>, JsonError> {
    let mut reader = JsonReader::new();
    while let Some(text) = chunks.recv().await {
        reader = reader.feed(&text)?;
        if reader.is_done() {
            break;
        }
    }
    reader.finish()
}

/// Lazily parses successive top-level values from complete text.
///
/// Nothing is parsed until the iterator is advanced; each step pays for
/// exactly one record. A malformed record is yielded once as an error and
/// ends the iteration.
pub fn stream_values(
    text: &str,
) -> Result<impl Iterator<Item = Result<JsonValue, JsonError>>, JsonError> {
    let tokens = lex(text)?;
    Ok(run_many(value(), tokens, ())
        .into_iter()
        .map(|record| record.map_err(JsonError::from)))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::grammar::{Direct, parse_document};

    #[test]
    fn test_feeder_holds_a_partial_line() {
        let mut feeder = LineFeeder::new();
        let tokens = feeder.feed(r#"{"name": "#).unwrap();
        assert!(tokens.is_empty());
        assert_eq!(feeder.pending(), r#"{"name": "#);

        let tokens = feeder.feed("\"Alice\"}\n").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(feeder.pending(), "");
    }

    #[test]
    fn test_feeder_releases_complete_lines_only() {
        let mut feeder = LineFeeder::new();
        let tokens = feeder.feed("{\"a\": 1}\n{\"b\"").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(feeder.pending(), "{\"b\"");
        assert_eq!(feeder.line(), 2);
    }

    #[test]
    fn test_feeder_finish_lexes_the_tail() {
        let mut feeder = LineFeeder::new();
        assert!(feeder.feed("[1, 2]").unwrap().is_empty());
        let tokens = feeder.finish().unwrap();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_feeder_reports_the_failing_line() {
        let mut feeder = LineFeeder::new();
        let err = feeder.feed("{}\noops\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.to_string(), "line 2: unrecognized input");
    }

    #[test]
    fn test_reader_matches_batch_for_any_split() {
        let text = "{\"id\": 1, \"tags\": [\"a\", \"b\"]}\n{\"id\": 2}\n{\"id\": 3, \"ok\": true}\n";
        let batch = parse_document(text).unwrap();

        for chunk_len in [1, 3, 7, 16, text.len()] {
            let chunks: Vec<&str> = text
                .as_bytes()
                .chunks(chunk_len)
                .map(|piece| std::str::from_utf8(piece).unwrap())
                .collect();
            let records = read_chunks(chunks).unwrap();
            assert_eq!(records, batch, "chunk_len {}", chunk_len);
        }
    }

    #[test]
    fn test_reader_handles_records_spanning_lines() {
        let text = "{\n  \"a\": [1,\n       2]\n}\n{\"b\": 2}\n";
        let mut reader = JsonReader::new();
        for line in text.split_inclusive('\n') {
            reader = reader.feed(line).unwrap();
        }
        let records = reader.finish().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("a").and_then(JsonValue::len), Some(2));
    }

    #[test]
    fn test_reader_resolves_early_on_a_malformed_record() {
        let reader = JsonReader::new().feed("{\"a\": 1}\n{]\n").unwrap();
        assert!(reader.is_done());
        let err = reader.finish().unwrap_err();
        assert_eq!(err.to_string(), "unexpected RBracket at 6");
    }

    #[test]
    fn test_reader_accepts_empty_input() {
        assert_eq!(JsonReader::new().finish(), Ok(Vec::new()));
    }

    #[test]
    fn test_reader_accepts_a_final_unterminated_line() {
        let reader = JsonReader::new().feed("{\"a\": 1}\n{\"b\": 2}").unwrap();
        let records = reader.finish().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_stream_values_is_lazy() {
        let runs = Rc::new(Cell::new(0));
        let counted = {
            let runs = Rc::clone(&runs);
            value::<Direct>().map(move |record| {
                runs.set(runs.get() + 1);
                record
            })
        };
        let tokens = lex("1 2 3 4 5").unwrap();
        let stream = run_many(counted, tokens, ());
        assert_eq!(runs.get(), 0);

        let first: Vec<_> = stream.into_iter().take(2).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_stream_values_collects_records() {
        let records: Result<Vec<_>, _> = stream_values("{\"a\": 1}\n[2, 3]\nnull\n")
            .unwrap()
            .collect();
        let records = records.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], JsonValue::Null);
    }

    #[test]
    fn test_stream_values_surfaces_errors_in_order() {
        let mut iter = stream_values("1 2 {]").unwrap();
        assert_eq!(iter.next(), Some(Ok(JsonValue::Number("1".into()))));
        assert_eq!(iter.next(), Some(Ok(JsonValue::Number("2".into()))));
        match iter.next() {
            Some(Err(JsonError::Parse(err))) => {
                assert_eq!(err.to_string(), "unexpected RBracket at 3");
            }
            other => panic!("expected a parse failure, got {:?}", other),
        }
        assert!(iter.next().is_none());
    }

    #[tokio::test]
    async fn test_read_channel_collects_records() {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send("{\"id\": 1}\n{\"id\"".to_string()).await.unwrap();
            tx.send(": 2}\n{\"id\": 3}\n".to_string()).await.unwrap();
        });
        let records = read_channel(rx).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_read_channel_stops_on_a_malformed_record() {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send("{\"ok\": true}\n".to_string()).await.unwrap();
            tx.send("{]\n".to_string()).await.unwrap();
            // The reader resolves on the malformed record; whether this
            // last send lands is up to timing, and must not matter.
            let _ = tx.send("{\"never\": 0}\n".to_string()).await;
        });
        let err = read_channel(rx).await.unwrap_err();
        assert!(matches!(err, JsonError::Parse(_)));
    }
}
