//! Core error type for parse failures.
//!
//! `Error` is the failure value carried by the four-way parse outcome. It is
//! deliberately small: the engine reports *where* and *what kind*, and leaves
//! richer diagnostics to the grammar. Demo and application crates wrap it in
//! their own error types (typically via `thiserror`) and implement
//! `From<parsume::Error<_>>` for integration.

use core::fmt;

/// A parse failure, parameterized over the position type of the state it
/// occurred in.
///
/// The engine never recovers from these itself; they travel through the
/// failure side of the parse outcome to whichever surface the caller chose
/// (callback, session result, or stream item).
///
/// # Example
///
/// ```ignore
/// use thiserror::Error;
///
/// #[derive(Error, Debug)]
/// pub enum RecordError {
///     #[error("bad record: {0}")]
///     Parse(parsume::Error<usize>),
/// }
///
/// impl From<parsume::Error<usize>> for RecordError {
///     fn from(err: parsume::Error<usize>) -> Self {
///         RecordError::Parse(err)
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Error<P> {
    /// Input ran out where the grammar required another element.
    ///
    /// In a chunked session this is only produced after the end-of-input
    /// signal; before that, running out of a chunk suspends rather than
    /// fails.
    UnexpectedEnd {
        /// Position at which more input was required.
        at: P,
    },

    /// The next element did not satisfy the grammar.
    Unexpected {
        /// Debug rendering of the offending element.
        found: String,
        /// Position of the offending element.
        at: P,
    },

    /// A labeled expectation was not met.
    ///
    /// Produced by primitives constructed with a label, for example
    /// `satisfy(|c| c.is_ascii_digit(), "digit")`.
    Expected {
        /// What the grammar expected at this position.
        label: &'static str,
        /// Position of the mismatch.
        at: P,
    },

    /// A failure raised directly by the grammar.
    Message {
        /// The failure text.
        text: &'static str,
        /// Position at which the grammar failed.
        at: P,
    },
}

impl<P> Error<P> {
    /// Returns the position the failure occurred at.
    #[inline]
    pub fn at(&self) -> &P {
        match self {
            Error::UnexpectedEnd { at }
            | Error::Unexpected { at, .. }
            | Error::Expected { at, .. }
            | Error::Message { at, .. } => at,
        }
    }

    /// Maps the position type, preserving the failure kind.
    pub fn map_position<Q>(self, f: impl FnOnce(P) -> Q) -> Error<Q> {
        match self {
            Error::UnexpectedEnd { at } => Error::UnexpectedEnd { at: f(at) },
            Error::Unexpected { found, at } => Error::Unexpected { found, at: f(at) },
            Error::Expected { label, at } => Error::Expected { label, at: f(at) },
            Error::Message { text, at } => Error::Message { text, at: f(at) },
        }
    }
}

impl<P: fmt::Display> fmt::Display for Error<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEnd { at } => {
                write!(f, "unexpected end of input at {}", at)
            }
            Error::Unexpected { found, at } => {
                write!(f, "unexpected {} at {}", found, at)
            }
            Error::Expected { label, at } => {
                write!(f, "expected {} at {}", label, at)
            }
            Error::Message { text, at } => {
                write!(f, "{} at {}", text, at)
            }
        }
    }
}

#[cfg(feature = "std")]
impl<P: fmt::Display + fmt::Debug> std::error::Error for Error<P> {}
