//! The chunked input state: element consumption across chunk boundaries.
//!
//! [`Incremental`] wraps any [`ParserState`] and adds a chunk index. All
//! reads forward to the inner state. The one place it intervenes is
//! [`ParserState::next`]: after advancing the inner state it checks whether
//! the chunk just ran out, and if so answers with a boundary for the next
//! chunk index instead of a ready state. The boundary's resume installs the
//! arriving chunk as the inner state's input and increments the chunk index,
//! so parsers built from the primitives never observe where one chunk ends
//! and the next begins.
//!
//! Exhaustion is not failure: a parser over an exhausted chunk is suspended,
//! not dead. Only the end-of-input signal (resuming a boundary with `None`)
//! lets the parse run out of input for real.

use crate::traits::{Advance, Boundary, Input, ParserState};

/// A parser state with a chunk index, suspending at chunk boundaries.
///
/// Equality requires both the chunk index and the inner state to match.
/// The index participates deliberately: the end of chunk N and the start of
/// chunk N+1 are distinct positions even when no element separates them,
/// which keeps progress detection in repetition combinators honest at
/// boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Incremental<S> {
    chunk: usize,
    inner: S,
}

impl<S: ParserState> Incremental<S> {
    /// Wraps a state at chunk index zero.
    #[inline]
    pub fn new(inner: S) -> Self {
        Self { chunk: 0, inner }
    }

    /// The index of the chunk this state is reading from.
    #[inline]
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// The wrapped state.
    #[inline]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps into the inner state, discarding the chunk index.
    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ParserState> ParserState for Incremental<S> {
    type Item = S::Item;
    type Input = S::Input;
    type Position = S::Position;
    type User = S::User;

    #[inline]
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    fn first(&self) -> Option<S::Item> {
        self.inner.first()
    }

    fn next(&self, item: &S::Item) -> Advance<Self> {
        match self.inner.next(item) {
            Advance::Ready(advanced) => {
                if advanced.is_empty() {
                    // The chunk is spent. The element itself was consumed
                    // successfully; the successor state lives in the next
                    // chunk, whenever it arrives.
                    let chunk = self.chunk;
                    Advance::Boundary(Boundary::new(chunk + 1, move |input| {
                        let input = input.unwrap_or_else(S::Input::empty);
                        Incremental {
                            chunk: chunk + 1,
                            inner: advanced.with_input(input),
                        }
                    }))
                } else {
                    Advance::Ready(Incremental {
                        chunk: self.chunk,
                        inner: advanced,
                    })
                }
            }
            // A suspending inner state keeps its own request numbering.
            Advance::Boundary(boundary) => {
                let chunk = self.chunk;
                let wanted = boundary.chunk();
                Advance::Boundary(Boundary::new(wanted, move |input| Incremental {
                    chunk,
                    inner: boundary.resume(input),
                }))
            }
        }
    }

    #[inline]
    fn position(&self) -> S::Position {
        self.inner.position()
    }

    #[inline]
    fn input(&self) -> &S::Input {
        self.inner.input()
    }

    #[inline]
    fn user_state(&self) -> &S::User {
        self.inner.user_state()
    }

    #[inline]
    fn with_input(&self, input: S::Input) -> Self {
        Self {
            chunk: self.chunk,
            inner: self.inner.with_input(input),
        }
    }

    #[inline]
    fn with_position(&self, position: S::Position) -> Self {
        Self {
            chunk: self.chunk,
            inner: self.inner.with_position(position),
        }
    }

    #[inline]
    fn with_user_state(&self, user: S::User) -> Self {
        Self {
            chunk: self.chunk,
            inner: self.inner.with_user_state(user),
        }
    }
}
