//! Resumable parse sessions: the provide/finish drive loop.
//!
//! A [`Session`] is the handle a caller holds while feeding input to a
//! suspended parse. It owns the append-only chunk history and the single
//! pending continuation, and it moves through exactly two stages:
//!
//! - **Suspended**: the parse wants a chunk that has not arrived.
//! - **Completed**: the parse finished; the outcome is stored. Terminal.
//!
#![cfg_attr(feature = "docs", doc = simple_mermaid::mermaid!("../docs/diagrams/session.mmd"))]
//!
//! Every call consumes the session and returns the successor value, so a
//! completed session can never be re-driven and stale handles cannot
//! diverge. Feeding is push-based and synchronous; see
//! [`crate::async_stream`] for adapters that feed a session from channels
//! and streams.
//!
//! # Example
//!
//! ```ignore
//! use parsume::{elements, run_inc};
//!
//! let session = run_inc(elements("hello".chars().collect()), ());
//! let session = session.provide_str("he");
//! let session = session.provide_str("llo");
//! let greeting = session.finish()?;
//! ```

use core::fmt;

use crate::Error;
use crate::config::SessionConfig;
use crate::incremental::Incremental;
use crate::parser::Parser;
use crate::reply::Reply;
use crate::state::{SliceInput, State};
use crate::step::{Control, Request};
use crate::traits::{Input, ParserState};

type OkHandler<O> = Box<dyn FnOnce(&O)>;
type ErrHandler<P> = Box<dyn FnOnce(&Error<P>)>;

enum Stage<O, S: ParserState> {
    Suspended(Request<O, S>),
    Completed(Reply<O, S>),
}

/// A resumable parse over chunk-fed input.
///
/// Obtained from [`parse_inc`], [`run_inc`] or their `_state` variants.
/// Chunks go in through [`Session::provide`]; the terminal outcome comes out
/// of [`Session::finish`]. Between calls the session is an inert value.
pub struct Session<O, S: ParserState> {
    stage: Stage<O, S>,
    chunks: Vec<S::Input>,
    on_ok: Option<OkHandler<O>>,
    on_err: Option<ErrHandler<S::Position>>,
}

impl<O: 'static, S: ParserState> Session<O, S> {
    /// Returns true once the parse has completed, successfully or not.
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Completed(..))
    }

    /// Number of chunks submitted so far, including the flush chunk once
    /// [`Session::finish`] has run.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The chunk index the parse is suspended on, or `None` once completed.
    #[inline]
    pub fn wanted(&self) -> Option<usize> {
        match &self.stage {
            Stage::Suspended(request) => Some(request.chunk()),
            Stage::Completed(..) => None,
        }
    }

    /// The stored outcome of a completed session.
    #[inline]
    pub fn outcome(&self) -> Option<&Reply<O, S>> {
        match &self.stage {
            Stage::Suspended(..) => None,
            Stage::Completed(reply) => Some(reply),
        }
    }

    /// Feeds one chunk.
    ///
    /// An empty chunk is a pure no-op: "no new data" never forces a drive
    /// cycle. Feeding a completed session is also a no-op.
    pub fn provide(self, chunk: S::Input) -> Self {
        if chunk.is_empty() {
            return self;
        }
        self.force_provide(chunk)
    }

    /// Feeds one chunk unconditionally, empty or not.
    ///
    /// Appends the chunk to the history, resumes the pending continuation,
    /// and keeps resuming while the continuation asks for chunk indices the
    /// history already holds. One call therefore drains every buffered
    /// request it can satisfy. Evaluation between resumptions runs on the
    /// trampoline, so consuming a chunk of any length uses bounded stack.
    pub fn force_provide(self, chunk: S::Input) -> Self {
        let Session {
            stage,
            mut chunks,
            on_ok,
            on_err,
        } = self;
        let mut request = match stage {
            Stage::Completed(reply) => {
                return Session {
                    stage: Stage::Completed(reply),
                    chunks,
                    on_ok,
                    on_err,
                };
            }
            Stage::Suspended(request) => request,
        };
        chunks.push(chunk);
        loop {
            // A request for chunk N is only ever satisfied by the Nth
            // submission, replayed from the history.
            let Some(buffered) = chunks.get(request.chunk()).cloned() else {
                return Session {
                    stage: Stage::Suspended(request),
                    chunks,
                    on_ok,
                    on_err,
                };
            };
            match request.resume(Some(buffered)).evaluate() {
                Control::Suspend(next) => request = next,
                Control::Done(reply) => {
                    fire_handlers(&reply, on_ok, on_err);
                    return Session {
                        stage: Stage::Completed(reply),
                        chunks,
                        on_ok: None,
                        on_err: None,
                    };
                }
            }
        }
    }

    /// Declares the input finished and returns the terminal outcome.
    ///
    /// First force-drives an empty chunk so buffered-but-undriven state
    /// progresses, then answers any remaining suspension with the
    /// end-of-input signal. A grammar that tolerates ending here succeeds;
    /// one that needs more input fails with its natural error. A session
    /// that already completed yields its stored outcome without re-invoking
    /// anything.
    pub fn finish(self) -> Result<O, Error<S::Position>> {
        let Session {
            stage,
            on_ok,
            on_err,
            ..
        } = self.force_provide(S::Input::empty());
        let reply = match stage {
            Stage::Completed(reply) => reply,
            Stage::Suspended(request) => {
                // No chunk will ever arrive now.
                let mut step = request.resume(None);
                let reply = loop {
                    match step.evaluate() {
                        Control::Done(reply) => break reply,
                        Control::Suspend(request) => step = request.resume(None),
                    }
                };
                fire_handlers(&reply, on_ok, on_err);
                reply
            }
        };
        match reply.into_result() {
            Ok((value, _)) => Ok(value),
            Err((err, _)) => Err(err),
        }
    }
}

impl<O: 'static, U: Clone + PartialEq + 'static> Session<O, Incremental<State<SliceInput<char>, U>>> {
    /// Feeds a string slice as one chunk. Convenience for character-level
    /// sessions.
    pub fn provide_str(self, chunk: &str) -> Self {
        self.provide(SliceInput::from(chunk))
    }
}

impl<O, S: ParserState> fmt::Debug for Session<O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (done, wanted) = match &self.stage {
            Stage::Suspended(request) => (false, Some(request.chunk())),
            Stage::Completed(..) => (true, None),
        };
        f.debug_struct("Session")
            .field("done", &done)
            .field("wanted", &wanted)
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}

fn fire_handlers<O, S: ParserState>(
    reply: &Reply<O, S>,
    on_ok: Option<OkHandler<O>>,
    on_err: Option<ErrHandler<S::Position>>,
) {
    match reply {
        Reply::ConsumedOk(value, _) | Reply::EmptyOk(value, _) => {
            if let Some(handler) = on_ok {
                handler(value);
            }
        }
        Reply::ConsumedErr(err, _) | Reply::EmptyErr(err, _) => {
            if let Some(handler) = on_err {
                handler(err);
            }
        }
    }
}

fn start<O: 'static, S: ParserState>(
    parser: Parser<O, Incremental<S>>,
    state: S,
    on_ok: Option<OkHandler<O>>,
    on_err: Option<ErrHandler<S::Position>>,
    config: SessionConfig,
) -> Session<O, Incremental<S>> {
    let initial = state.input().clone();
    // The parse does not start until chunk 0 arrives; the initial state's
    // own input is fed back below so pre-loaded input becomes chunk 0.
    let request = Request::new(0, move |input| {
        let input = input.unwrap_or_else(S::Input::empty);
        parser.run(Incremental::new(state.with_input(input)))
    });
    let session = Session {
        stage: Stage::Suspended(request),
        chunks: Vec::with_capacity(config.chunk_capacity),
        on_ok,
        on_err,
    };
    session.provide(initial)
}

/// Starts an incremental parse from an explicit initial state, delivering
/// the outcome to `on_ok` or `on_err`.
///
/// The handlers fire exactly once, during whichever `provide` or `finish`
/// call completes the parse. Input already held by `state` is submitted as
/// chunk 0.
pub fn parse_inc_state<O: 'static, S: ParserState>(
    parser: Parser<O, Incremental<S>>,
    state: S,
    on_ok: impl FnOnce(&O) + 'static,
    on_err: impl FnOnce(&Error<S::Position>) + 'static,
) -> Session<O, Incremental<S>> {
    parse_inc_state_with(parser, state, on_ok, on_err, SessionConfig::DEFAULT)
}

/// [`parse_inc_state`] with an explicit [`SessionConfig`].
pub fn parse_inc_state_with<O: 'static, S: ParserState>(
    parser: Parser<O, Incremental<S>>,
    state: S,
    on_ok: impl FnOnce(&O) + 'static,
    on_err: impl FnOnce(&Error<S::Position>) + 'static,
    config: SessionConfig,
) -> Session<O, Incremental<S>> {
    start(
        parser,
        state,
        Some(Box::new(on_ok)),
        Some(Box::new(on_err)),
        config,
    )
}

/// Starts an incremental parse from an explicit initial state, delivering
/// the outcome through [`Session::finish`]'s result.
pub fn run_inc_state<O: 'static, S: ParserState>(
    parser: Parser<O, Incremental<S>>,
    state: S,
) -> Session<O, Incremental<S>> {
    run_inc_state_with(parser, state, SessionConfig::DEFAULT)
}

/// [`run_inc_state`] with an explicit [`SessionConfig`].
pub fn run_inc_state_with<O: 'static, S: ParserState>(
    parser: Parser<O, Incremental<S>>,
    state: S,
    config: SessionConfig,
) -> Session<O, Incremental<S>> {
    start(parser, state, None, None, config)
}

/// Starts an incremental parse over empty initial input, with handlers.
///
/// All input arrives through [`Session::provide`]; `user` seeds the user
/// state.
pub fn parse_inc<O: 'static, I: Input, U: Clone + PartialEq + 'static>(
    parser: Parser<O, Incremental<State<I, U>>>,
    user: U,
    on_ok: impl FnOnce(&O) + 'static,
    on_err: impl FnOnce(&Error<usize>) + 'static,
) -> Session<O, Incremental<State<I, U>>> {
    parse_inc_state(parser, State::new(I::empty(), user), on_ok, on_err)
}

/// Starts an incremental parse over empty initial input, result-delivered.
pub fn run_inc<O: 'static, I: Input, U: Clone + PartialEq + 'static>(
    parser: Parser<O, Incremental<State<I, U>>>,
    user: U,
) -> Session<O, Incremental<State<I, U>>> {
    run_inc_state(parser, State::new(I::empty(), user))
}
