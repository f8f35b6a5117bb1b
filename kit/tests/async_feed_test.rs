//! Tests for async session feeding.
//!
//! Covers the tokio pipeline (feeder + pump) and the runtime-agnostic
//! stream driver.

#![cfg(any(feature = "tokio", feature = "futures"))]

use parsume::async_stream::{FeedConfig, FeedError};
use parsume::{Incremental, Parser, SliceInput, State, elements, run_inc};

type CharP<O> = Parser<O, Incremental<State<SliceInput<char>, ()>>>;

pub fn word(s: &str) -> CharP<Vec<char>> {
    elements(s.chars().collect())
}

#[test]
fn test_feed_error_display() {
    let err = FeedError::ChannelClosed;
    assert_eq!(format!("{}", err), "channel closed before the parse finished");

    let err = FeedError::Parse("unexpected 'x' at 2".to_string());
    assert_eq!(format!("{}", err), "parse failed: unexpected 'x' at 2");

    let err = FeedError::Incomplete;
    assert_eq!(format!("{}", err), "input ended inside an unfinished value");

    let err = FeedError::ChunkTooLarge { len: 10, max: 4 };
    assert_eq!(format!("{}", err), "chunk length 10 exceeds maximum 4");
}

#[test]
fn test_feed_config_default() {
    let config = FeedConfig::default();
    assert_eq!(config.chunk_buffer, 32);
    assert_eq!(config.max_chunk_len, 64 * 1024);
    assert_eq!(config, FeedConfig::medium());
}

#[test]
fn test_feed_config_from_chunk_len() {
    let config = FeedConfig::from_chunk_len(100);
    assert_eq!(config.max_chunk_len, 200);

    let config = FeedConfig::from_chunk_len(usize::MAX);
    assert_eq!(config.max_chunk_len, usize::MAX);
}

#[cfg(feature = "tokio")]
mod tokio_tests {
    use parsume::async_stream::tokio_impl::channel;
    use parsume::{many1, satisfy};

    use super::*;

    fn digit() -> CharP<char> {
        satisfy(|c: &char| c.is_ascii_digit(), "digit")
    }

    #[tokio::test]
    async fn test_pump_resolves_after_feeder_finishes() {
        let session = run_inc(word("hello"), ());
        let (feeder, pump) = channel(session, FeedConfig::small());

        tokio::spawn(async move {
            feeder.feed_str("he").await.unwrap();
            feeder.feed_str("llo").await.unwrap();
            feeder.finish();
        });

        let value = pump.run().await.unwrap();
        assert_eq!(value, vec!['h', 'e', 'l', 'l', 'o']);
    }

    #[tokio::test]
    async fn test_pump_resolves_early_mid_stream() {
        let session = run_inc(word("hi"), ());
        let (feeder, pump) = channel(session, FeedConfig::small());

        feeder.feed_str("hi there").await.unwrap();
        let value = pump.run().await.unwrap();
        assert_eq!(value, vec!['h', 'i']);

        // The pump resolved and dropped its receiver.
        let late = feeder.feed_str("late").await;
        assert_eq!(late, Err(FeedError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_incomplete_stream_reports_incomplete() {
        let session = run_inc(word("abc"), ());
        let (feeder, pump) = channel(session, FeedConfig::small());

        feeder.feed_str("a").await.unwrap();
        feeder.finish();
        assert_eq!(pump.run().await, Err(FeedError::Incomplete));
    }

    #[tokio::test]
    async fn test_parse_failure_reports_the_message() {
        let session = run_inc(word("abc"), ());
        let (feeder, pump) = channel(session, FeedConfig::small());

        feeder.feed_str("abx").await.unwrap();
        let err = pump.run().await.unwrap_err();
        assert_eq!(err, FeedError::Parse("unexpected 'x' at 2".to_string()));
    }

    #[tokio::test]
    async fn test_oversized_chunk_is_rejected_at_the_feeder() {
        let session = run_inc(word("abc"), ());
        let (feeder, pump) = channel(session, FeedConfig::default().with_max_chunk_len(4));

        let err = feeder.feed_str("way too long").await.unwrap_err();
        assert_eq!(err, FeedError::ChunkTooLarge { len: 12, max: 4 });

        drop(feeder);
        assert_eq!(pump.run().await, Err(FeedError::Incomplete));
    }

    #[tokio::test]
    async fn test_backpressure_with_tiny_buffer() {
        let session = run_inc(many1(digit()), ());
        let (feeder, pump) = channel(session, FeedConfig::small().with_chunk_buffer(1));

        let feed_task = tokio::spawn(async move {
            for _ in 0..100 {
                feeder.feed_str("5").await.unwrap();
            }
            feeder.finish();
        });

        let digits = pump.run().await.unwrap();
        feed_task.await.unwrap();
        assert_eq!(digits.len(), 100);
    }
}

#[cfg(feature = "futures")]
mod futures_tests {
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, Waker};

    use futures_core::Stream;
    use parsume::async_stream::futures_impl::{drive, drive_with};

    use super::*;

    /// A stream of immediately ready chunks, then the end.
    pub struct Chunks {
        chunks: Vec<SliceInput<char>>,
        index: usize,
    }

    impl Chunks {
        pub fn of(parts: &[&str]) -> Self {
            Self {
                chunks: parts.iter().map(|p| SliceInput::from(*p)).collect(),
                index: 0,
            }
        }
    }

    impl Stream for Chunks {
        type Item = SliceInput<char>;

        fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            if self.index < self.chunks.len() {
                let chunk = self.chunks[self.index].clone();
                self.index += 1;
                Poll::Ready(Some(chunk))
            } else {
                Poll::Ready(None)
            }
        }
    }

    #[test]
    fn test_drive_resolves_on_a_ready_stream() {
        let mut future = drive(Chunks::of(&["he", "ll", "o"]), run_inc(word("hello"), ()));
        let mut cx = Context::from_waker(Waker::noop());

        let Poll::Ready(result) = Pin::new(&mut future).poll(&mut cx) else {
            panic!("a ready stream resolves in one poll");
        };
        assert_eq!(result.unwrap(), vec!['h', 'e', 'l', 'l', 'o']);
    }

    #[test]
    fn test_drive_reports_incomplete_when_the_stream_ends_early() {
        let mut future = drive(Chunks::of(&["he"]), run_inc(word("hello"), ()));
        let mut cx = Context::from_waker(Waker::noop());

        assert_eq!(
            Pin::new(&mut future).poll(&mut cx),
            Poll::Ready(Err(FeedError::Incomplete))
        );
    }

    #[test]
    fn test_drive_with_rejects_oversized_chunks() {
        let mut future = drive_with(
            Chunks::of(&["hello world"]),
            run_inc(word("hello world"), ()),
            FeedConfig::default().with_max_chunk_len(4),
        );
        let mut cx = Context::from_waker(Waker::noop());

        assert_eq!(
            Pin::new(&mut future).poll(&mut cx),
            Poll::Ready(Err(FeedError::ChunkTooLarge { len: 11, max: 4 }))
        );
    }

    #[test]
    fn test_poll_after_resolution_parks() {
        let mut future = drive(Chunks::of(&["hi"]), run_inc(word("hi"), ()));
        let mut cx = Context::from_waker(Waker::noop());

        let first = Pin::new(&mut future).poll(&mut cx);
        assert!(matches!(first, Poll::Ready(Ok(_))));
        assert_eq!(Pin::new(&mut future).poll(&mut cx), Poll::Pending);
    }
}

#[cfg(all(feature = "tokio", feature = "futures"))]
mod integration_tests {
    use parsume::async_stream::futures_impl::drive;

    use super::futures_tests::Chunks;
    use super::*;

    #[tokio::test]
    async fn test_drive_future_awaits_under_tokio() {
        let value = drive(Chunks::of(&["ab", "cd"]), run_inc(word("abcd"), ()))
            .await
            .unwrap();
        assert_eq!(value, vec!['a', 'b', 'c', 'd']);
    }
}
