//! Lazy repeated application: memoized, possibly-infinite result streams.
//!
//! [`run_many`] and its siblings apply one parser again and again from
//! successive states, but no application runs until something looks at the
//! stream. Each [`ResultStream`] cell is computed at most once and cached,
//! so walking the stream twice re-reads the cache instead of re-parsing,
//! and an endless input only ever costs as many applications as the caller
//! actually consumes.
//!
//! The stream ends when the parser fails without consuming ([`StreamCell::End`],
//! a normal stop) or fails after consuming ([`StreamCell::Failed`], a real
//! parse error surfaced as the last element). It never ends on its own if
//! the parser can always succeed; bounding consumption is the caller's job.
//!
//! # Example
//!
//! ```ignore
//! use parsume::{run_many, satisfy};
//!
//! let digits = satisfy(|c: &char| c.is_ascii_digit(), "digit");
//! let stream = run_many(digits, "123x", ());
//! let parsed: Vec<_> = stream.into_iter().collect::<Result<_, _>>()?;
//! assert_eq!(parsed, vec!['1', '2', '3']);
//! ```

use core::fmt;
use core::mem;
use std::cell::RefCell;
use std::rc::Rc;

use crate::Error;
use crate::parser::Parser;
use crate::reply::Reply;
use crate::state::{SliceInput, State};
use crate::step::Step;
use crate::traits::{Input, ParserState};

enum Slot<O, S: ParserState> {
    Pending(Box<dyn FnOnce() -> StreamCell<O, S>>),
    Forcing,
    Forced(StreamCell<O, S>),
}

/// A lazily computed, memoized stream of parse results.
///
/// Cheap to clone; clones share the same cells, so forcing through one
/// handle is visible through all of them.
pub struct ResultStream<O, S: ParserState> {
    cell: Rc<RefCell<Slot<O, S>>>,
}

/// One forced cell of a [`ResultStream`].
#[derive(Clone)]
pub enum StreamCell<O, S: ParserState> {
    /// One more result, then a lazily computed rest.
    Yield(O, ResultStream<O, S>),
    /// The parser failed without consuming: the sequence ends here. Carries
    /// the state the stream stopped in.
    End(S),
    /// The parser failed after consuming input. Terminal; carries the
    /// failure and the state at the point of failure.
    Failed(Error<S::Position>, S),
}

impl<O, S: ParserState> Clone for ResultStream<O, S> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<O, S: ParserState> ResultStream<O, S> {
    /// Wraps a deferred computation as an unforced stream.
    pub fn from_thunk(thunk: impl FnOnce() -> StreamCell<O, S> + 'static) -> Self {
        Self {
            cell: Rc::new(RefCell::new(Slot::Pending(Box::new(thunk)))),
        }
    }

    /// Wraps an already-computed cell.
    pub fn forced(cell: StreamCell<O, S>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(Slot::Forced(cell))),
        }
    }

    /// Returns true if this cell has been computed.
    pub fn is_forced(&self) -> bool {
        matches!(&*self.cell.borrow(), Slot::Forced(..))
    }
}

impl<O: Clone + 'static, S: ParserState> ResultStream<O, S> {
    /// Computes this cell if it has not been computed yet, and returns it.
    ///
    /// At most one evaluation ever happens per cell; later calls and calls
    /// through clones of this handle read the cache.
    pub fn force(&self) -> StreamCell<O, S> {
        {
            let slot = self.cell.borrow();
            if let Slot::Forced(cell) = &*slot {
                return cell.clone();
            }
        }
        let thunk = match mem::replace(&mut *self.cell.borrow_mut(), Slot::Forcing) {
            Slot::Pending(thunk) => thunk,
            // A cell's thunk never references its own handle.
            Slot::Forcing => unreachable!("stream cell forced re-entrantly"),
            Slot::Forced(cell) => {
                let view = cell.clone();
                *self.cell.borrow_mut() = Slot::Forced(cell);
                return view;
            }
        };
        let cell = thunk();
        *self.cell.borrow_mut() = Slot::Forced(cell.clone());
        cell
    }

    /// Iterates the stream from this cell without consuming the handle.
    pub fn iter(&self) -> StreamIter<O, S> {
        StreamIter {
            stream: Some(self.clone()),
        }
    }
}

impl<O, S: ParserState> fmt::Debug for ResultStream<O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStream")
            .field("forced", &self.is_forced())
            .finish_non_exhaustive()
    }
}

/// Iterator over a [`ResultStream`], forcing cells on demand.
///
/// Yields `Ok` per parsed result; a consumed failure is yielded once as
/// `Err` and ends the iteration.
pub struct StreamIter<O, S: ParserState> {
    stream: Option<ResultStream<O, S>>,
}

impl<O: Clone + 'static, S: ParserState> Iterator for StreamIter<O, S> {
    type Item = Result<O, Error<S::Position>>;

    fn next(&mut self) -> Option<Self::Item> {
        let stream = self.stream.take()?;
        match stream.force() {
            StreamCell::Yield(value, tail) => {
                self.stream = Some(tail);
                Some(Ok(value))
            }
            StreamCell::End(_) => None,
            StreamCell::Failed(err, _) => Some(Err(err)),
        }
    }
}

impl<O: Clone + 'static, S: ParserState> IntoIterator for ResultStream<O, S> {
    type Item = Result<O, Error<S::Position>>;
    type IntoIter = StreamIter<O, S>;

    fn into_iter(self) -> StreamIter<O, S> {
        StreamIter { stream: Some(self) }
    }
}

/// Runs one application directly and builds the resulting cell.
fn force_cell<O: Clone + 'static, S: ParserState>(
    parser: Parser<O, S>,
    state: S,
) -> StreamCell<O, S> {
    let before = state.clone();
    match parser.parse(state) {
        Reply::ConsumedOk(value, next) | Reply::EmptyOk(value, next) => {
            let tail = ResultStream::from_thunk({
                let parser = parser.clone();
                let next = next.clone();
                move || force_cell(parser, next)
            });
            StreamCell::Yield(value, tail)
        }
        Reply::ConsumedErr(err, state) => StreamCell::Failed(err, state),
        Reply::EmptyErr(..) => StreamCell::End(before),
    }
}

/// Lifts repeated application into a parser producing the result stream.
///
/// Applies `parser` once eagerly: failure without consumption succeeds with
/// the ended stream, success emits the value as the stream's head with a
/// lazy tail rerunning from the new state. Either way the combined parser
/// reports success through the empty variant, so zero-width matches still
/// emit under optional-style wrapping. A consumed failure propagates as a
/// parse failure.
///
/// The lazy tail runs direct applications; most callers want the
/// [`run_many`] family rather than composing this further.
pub fn many_stream<O: Clone + 'static, S: ParserState>(
    parser: Parser<O, S>,
) -> Parser<ResultStream<O, S>, S> {
    Parser::new(move |state: S| {
        let parser = parser.clone();
        let before = state.clone();
        parser.run(state).bind(move |reply| {
            Step::done(match reply {
                Reply::ConsumedOk(value, next) | Reply::EmptyOk(value, next) => {
                    let tail = ResultStream::from_thunk({
                        let parser = parser.clone();
                        let next = next.clone();
                        move || force_cell(parser, next)
                    });
                    Reply::EmptyOk(
                        ResultStream::forced(StreamCell::Yield(value, tail)),
                        next,
                    )
                }
                Reply::ConsumedErr(err, state) => Reply::ConsumedErr(err, state),
                Reply::EmptyErr(..) => Reply::EmptyOk(
                    ResultStream::forced(StreamCell::End(before.clone())),
                    before,
                ),
            })
        })
    })
}

/// Repeatedly applies `parser` from `state`, lazily.
///
/// Nothing runs until the stream is forced; each forced cell performs
/// exactly one direct (non-incremental) application.
pub fn run_many_state<O: Clone + 'static, S: ParserState>(
    parser: Parser<O, S>,
    state: S,
) -> ResultStream<O, S> {
    ResultStream::from_thunk(move || force_cell(parser, state))
}

/// [`run_many_state`] over a raw element stream, with user data.
///
/// Accepts any [`Input`], including endless ones like
/// [`crate::RepeatInput`].
pub fn run_many_stream<O, I, U>(
    parser: Parser<O, State<I, U>>,
    input: I,
    user: U,
) -> ResultStream<O, State<I, U>>
where
    O: Clone + 'static,
    I: Input,
    U: Clone + PartialEq + 'static,
{
    run_many_state(parser, State::new(input, user))
}

/// [`run_many_state`] over array-like input, with user data.
pub fn run_many<O, T, U>(
    parser: Parser<O, State<SliceInput<T>, U>>,
    input: impl Into<SliceInput<T>>,
    user: U,
) -> ResultStream<O, State<SliceInput<T>, U>>
where
    O: Clone + 'static,
    T: Clone + PartialEq + fmt::Debug + 'static,
    U: Clone + PartialEq + 'static,
{
    run_many_state(parser, State::new(input.into(), user))
}
