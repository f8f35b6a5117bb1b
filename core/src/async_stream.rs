//! Async feeding for suspended parse sessions.
//!
//! A [`Session`] is synchronous: something has to call `provide` whenever a
//! chunk arrives. This module supplies that something for async sources.
//! Chunks flow through a bounded channel into a pump that owns the session
//! and drives it to completion:
//!
//! - **Source** hands chunks to a **ChunkFeeder** (validation + backpressure)
//! - **ChunkFeeder** forwards them to a **SessionPump** (session + drive loop)
//! - **SessionPump** resolves the parsed value once the session completes
//!
#![cfg_attr(feature = "docs", doc = simple_mermaid::mermaid!("../docs/diagrams/async_stream.mmd"))]
//!
//! # Features
//!
//! - **Backpressure**: the chunk channel is bounded, so a slow parse stalls
//!   the producer instead of buffering without limit
//! - **Early exit**: the pump resolves as soon as the parse completes, even
//!   mid-stream; later feeds observe the closed channel
//! - **Runtime-agnostic option**: `futures_impl::drive` works on any
//!   `futures_core::Stream` of chunks, no executor assumed
//!
//! # Example
//!
//! ```ignore
//! use parsume::async_stream::{tokio_impl, FeedConfig, FeedError};
//!
//! async fn parse_feed(
//!     mut lines: tokio::sync::mpsc::Receiver<String>,
//! ) -> Result<Document, FeedError> {
//!     let session = parsume::run_inc(document(), ());
//!     let (feeder, pump) = tokio_impl::channel(session, FeedConfig::default());
//!
//!     tokio::spawn(async move {
//!         while let Some(line) = lines.recv().await {
//!             if feeder.feed_str(&line).await.is_err() {
//!                 break; // the pump already resolved
//!             }
//!         }
//!         feeder.finish();
//!     });
//!
//!     pump.run().await
//! }
//! ```

use core::fmt;

use crate::error::Error;
use crate::session::Session;
use crate::traits::ParserState;

/// Error type for async feeding.
///
/// Parse failures are carried as rendered messages rather than as
/// [`Error`] values so that feeding errors stay independent of the
/// state's position type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The pump went away while a feed was in flight.
    ///
    /// Usually benign: the parse completed early and the remaining input
    /// has nowhere to go.
    ChannelClosed,
    /// The parse failed with the rendered error message.
    Parse(String),
    /// The stream ended inside an unfinished value.
    Incomplete,
    /// An input chunk exceeded the configured maximum length.
    ChunkTooLarge {
        /// Length of the chunk that was rejected, in items.
        len: usize,
        /// Maximum allowed chunk length.
        max: usize,
    },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::ChannelClosed => write!(f, "channel closed before the parse finished"),
            FeedError::Parse(msg) => write!(f, "parse failed: {}", msg),
            FeedError::Incomplete => write!(f, "input ended inside an unfinished value"),
            FeedError::ChunkTooLarge { len, max } => {
                write!(f, "chunk length {} exceeds maximum {}", len, max)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FeedError {}

/// Configuration for async feeding.
///
/// # Presets
///
/// - [`FeedConfig::small()`]: short feeds, e.g. interactive input
/// - [`FeedConfig::medium()`]: balanced (default)
/// - [`FeedConfig::large()`]: high-throughput feeds with big chunks
/// - [`FeedConfig::from_chunk_len()`]: tune from an expected chunk length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    /// Capacity of the chunk channel, in chunks.
    ///
    /// Bounds how far the producer can run ahead of the parse.
    /// Default: 32.
    pub chunk_buffer: usize,
    /// Maximum chunk length, in items.
    ///
    /// Longer chunks are rejected with [`FeedError::ChunkTooLarge`] before
    /// they reach the session. Default: 65536.
    pub max_chunk_len: usize,
}

impl FeedConfig {
    /// The default configuration.
    pub const DEFAULT: Self = Self {
        chunk_buffer: 32,
        max_chunk_len: 64 * 1024,
    };

    /// Preset for short feeds: line-at-a-time input, tests.
    #[inline]
    pub const fn small() -> Self {
        Self {
            chunk_buffer: 8,
            max_chunk_len: 4 * 1024,
        }
    }

    /// Balanced preset, same as [`FeedConfig::DEFAULT`].
    #[inline]
    pub const fn medium() -> Self {
        Self::DEFAULT
    }

    /// Preset for high-throughput feeds.
    #[inline]
    pub const fn large() -> Self {
        Self {
            chunk_buffer: 256,
            max_chunk_len: 256 * 1024,
        }
    }

    /// Derives a configuration from the expected chunk length, leaving
    /// headroom for the occasional oversized chunk.
    #[inline]
    pub const fn from_chunk_len(len: usize) -> Self {
        Self {
            chunk_buffer: 32,
            max_chunk_len: len.saturating_mul(2),
        }
    }

    /// Returns the configuration with a different channel capacity.
    #[inline]
    pub const fn with_chunk_buffer(mut self, chunks: usize) -> Self {
        self.chunk_buffer = chunks;
        self
    }

    /// Returns the configuration with a different maximum chunk length.
    #[inline]
    pub const fn with_max_chunk_len(mut self, len: usize) -> Self {
        self.max_chunk_len = len;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Flushes a fully fed session and maps its outcome into a [`FeedError`].
///
/// An unexpected-end failure is reported as [`FeedError::Incomplete`],
/// since at this point it always means the stream stopped inside a value.
/// Useful when writing a custom drive loop.
pub fn finish_feed<O: 'static, S: ParserState>(session: Session<O, S>) -> Result<O, FeedError> {
    match session.finish() {
        Ok(value) => Ok(value),
        Err(Error::UnexpectedEnd { .. }) => Err(FeedError::Incomplete),
        Err(error) => Err(FeedError::Parse(error.to_string())),
    }
}

#[cfg(feature = "tokio")]
pub mod tokio_impl {
    //! Tokio-based session feeding.

    use super::*;
    use ::tokio::sync::mpsc;

    use crate::state::SliceInput;
    use crate::traits::Input;

    /// Create a connected [`ChunkFeeder`]/[`SessionPump`] pair.
    ///
    /// The channel capacity comes from [`FeedConfig::chunk_buffer`].
    pub fn channel<O: 'static, S: ParserState>(
        session: Session<O, S>,
        config: FeedConfig,
    ) -> (ChunkFeeder<S::Input>, SessionPump<O, S>) {
        // tokio requires a positive capacity
        let (tx, rx) = mpsc::channel(config.chunk_buffer.max(1));
        (
            ChunkFeeder::with_config(tx, config),
            SessionPump::new(rx, session),
        )
    }

    /// Sending half of a feed pipeline.
    ///
    /// Validates chunks and forwards them to the pump, blocking when the
    /// channel is full. Dropping the feeder ends the stream.
    pub struct ChunkFeeder<I> {
        chunk_tx: mpsc::Sender<I>,
        config: FeedConfig,
    }

    impl<I: Input> ChunkFeeder<I> {
        /// Create a feeder over an existing channel with default limits.
        pub fn new(chunk_tx: mpsc::Sender<I>) -> Self {
            Self::with_config(chunk_tx, FeedConfig::default())
        }

        /// Create a feeder over an existing channel with custom limits.
        pub fn with_config(chunk_tx: mpsc::Sender<I>, config: FeedConfig) -> Self {
            Self { chunk_tx, config }
        }

        /// Feed one chunk.
        ///
        /// Empty chunks are forwarded and ignored by the session. Fails
        /// with [`FeedError::ChannelClosed`] once the pump has resolved,
        /// and with [`FeedError::ChunkTooLarge`] when the chunk exceeds
        /// [`FeedConfig::max_chunk_len`]. Chunks of unknown length are
        /// not length-checked.
        pub async fn feed(&self, chunk: I) -> Result<(), FeedError> {
            if let Some(len) = chunk.len() {
                if len > self.config.max_chunk_len {
                    return Err(FeedError::ChunkTooLarge {
                        len,
                        max: self.config.max_chunk_len,
                    });
                }
            }
            self.chunk_tx
                .send(chunk)
                .await
                .map_err(|_| FeedError::ChannelClosed)
        }

        /// Signal that no more input will arrive.
        ///
        /// Dropping the feeder has the same effect. The pump answers the
        /// closed channel by flushing the session and resolving.
        pub fn finish(self) {}
    }

    impl ChunkFeeder<SliceInput<char>> {
        /// [`ChunkFeeder::feed`] for string chunks.
        pub async fn feed_str(&self, chunk: &str) -> Result<(), FeedError> {
            self.feed(SliceInput::from(chunk)).await
        }
    }

    /// Receiving half of a feed pipeline.
    ///
    /// Owns the session and drives it with each received chunk.
    pub struct SessionPump<O, S: ParserState> {
        chunk_rx: mpsc::Receiver<S::Input>,
        session: Session<O, S>,
    }

    impl<O: 'static, S: ParserState> SessionPump<O, S> {
        /// Create a pump over an existing channel.
        pub fn new(chunk_rx: mpsc::Receiver<S::Input>, session: Session<O, S>) -> Self {
            Self { chunk_rx, session }
        }

        /// Drive the session until it completes or the channel closes,
        /// then resolve its final value.
        ///
        /// A close before completion is treated as end of input: the
        /// session is flushed, so a parse that can finish at that point
        /// still succeeds. Completing early drops the receiver, which is
        /// how the feeder learns to stop.
        pub async fn run(self) -> Result<O, FeedError> {
            let Self {
                mut chunk_rx,
                mut session,
            } = self;
            while let Some(chunk) = chunk_rx.recv().await {
                session = session.provide(chunk);
                if session.is_done() {
                    break;
                }
            }
            finish_feed(session)
        }
    }
}

#[cfg(feature = "futures")]
pub mod futures_impl {
    //! Futures-based session feeding (runtime-agnostic).

    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll};

    use futures_core::Stream;

    use super::*;
    use crate::traits::Input;

    /// Drive a session from a stream of chunks with default limits.
    ///
    /// Resolves when the session completes or the stream ends, whichever
    /// comes first.
    pub fn drive<St, O, S>(chunks: St, session: Session<O, S>) -> DriveFuture<St, O, S>
    where
        St: Stream<Item = S::Input> + Unpin,
        S: ParserState,
    {
        drive_with(chunks, session, FeedConfig::DEFAULT)
    }

    /// [`drive`] with an explicit [`FeedConfig`].
    pub fn drive_with<St, O, S>(
        chunks: St,
        session: Session<O, S>,
        config: FeedConfig,
    ) -> DriveFuture<St, O, S>
    where
        St: Stream<Item = S::Input> + Unpin,
        S: ParserState,
    {
        DriveFuture {
            chunks,
            session: Some(session),
            config,
        }
    }

    /// Future returned by [`drive`] and [`drive_with`].
    pub struct DriveFuture<St, O, S: ParserState> {
        chunks: St,
        session: Option<Session<O, S>>,
        config: FeedConfig,
    }

    impl<St, O, S> Future for DriveFuture<St, O, S>
    where
        St: Stream<Item = S::Input> + Unpin,
        O: Unpin + 'static,
        S: ParserState + Unpin,
        S::Input: Unpin,
        S::Position: Unpin,
    {
        type Output = Result<O, FeedError>;

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            let this = self.get_mut();
            let Some(mut session) = this.session.take() else {
                // Resolved on an earlier poll. Park instead of panicking.
                return Poll::Pending;
            };
            loop {
                match Pin::new(&mut this.chunks).poll_next(cx) {
                    Poll::Ready(Some(chunk)) => {
                        if let Some(len) = chunk.len() {
                            let max = this.config.max_chunk_len;
                            if len > max {
                                return Poll::Ready(Err(FeedError::ChunkTooLarge { len, max }));
                            }
                        }
                        session = session.provide(chunk);
                        if session.is_done() {
                            return Poll::Ready(finish_feed(session));
                        }
                    }
                    Poll::Ready(None) => return Poll::Ready(finish_feed(session)),
                    Poll::Pending => {
                        this.session = Some(session);
                        return Poll::Pending;
                    }
                }
            }
        }
    }
}
