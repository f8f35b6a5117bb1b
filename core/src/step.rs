//! The trampoline: suspended computations evaluated in bounded stack space.
//!
//! Parsers do not call their continuations directly. Every continuation call
//! is reified as a [`Step`], and [`Step::evaluate`] spins an explicit loop
//! until the computation either finishes or asks for a chunk that is not
//! available yet. Stack depth is therefore constant per loop iteration no
//! matter how many elements a single drive call consumes, which is the
//! property that lets one `provide` of a 10,000-element chunk run without
//! growing the call stack.
//!
//! Two things can interrupt evaluation:
//!
//! - [`Step::Continue`]: plain chaining. The loop unwraps it and keeps going.
//! - [`Step::Suspend`]: a [`Request`] for a chunk by index. Evaluation stops
//!   and control returns to whoever can supply input (the session drive
//!   loop, or direct execution which answers with the end-of-input signal).

use crate::reply::Reply;
use crate::traits::ParserState;

/// A deferred step of a parse computation.
pub type Thunk<O, S> = Box<dyn FnOnce() -> Step<O, S>>;

/// A one-shot continuation expecting a chunk, or `None` for end-of-input.
pub type Resume<O, S> = Box<dyn FnOnce(Option<<S as ParserState>::Input>) -> Step<O, S>>;

/// One step of a possibly-suspended parse computation.
pub enum Step<O, S: ParserState> {
    /// The computation finished with a four-way outcome.
    Done(Reply<O, S>),
    /// More work remains; the thunk performs the next step.
    Continue(Thunk<O, S>),
    /// The computation needs a chunk that has not been supplied yet.
    Suspend(Request<O, S>),
}

/// A suspended computation waiting for a specific chunk.
///
/// Requests are intermediate values: the drive loop either satisfies one
/// immediately from buffered history or parks it as the session's pending
/// continuation. They are never stored anywhere else.
pub struct Request<O, S: ParserState> {
    chunk: usize,
    resume: Resume<O, S>,
}

/// A fully evaluated computation: finished, or suspended on missing input.
pub enum Control<O, S: ParserState> {
    /// The terminal outcome.
    Done(Reply<O, S>),
    /// A request for a chunk index that was not available.
    Suspend(Request<O, S>),
}

impl<O, S: ParserState> Request<O, S> {
    /// Creates a request for the given chunk index.
    #[inline]
    pub fn new(
        chunk: usize,
        resume: impl FnOnce(Option<S::Input>) -> Step<O, S> + 'static,
    ) -> Self {
        Self {
            chunk,
            resume: Box::new(resume),
        }
    }

    /// The chunk index this request is waiting for.
    #[inline]
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Resumes the computation with the arrived chunk, or with the
    /// end-of-input signal when `input` is `None`.
    #[inline]
    pub fn resume(self, input: Option<S::Input>) -> Step<O, S> {
        (self.resume)(input)
    }
}

impl<O, S: ParserState> Step<O, S> {
    /// Wraps a terminal outcome.
    #[inline]
    pub fn done(reply: Reply<O, S>) -> Self {
        Step::Done(reply)
    }

    /// Defers `f` as the next step.
    #[inline]
    pub fn continue_with(f: impl FnOnce() -> Step<O, S> + 'static) -> Self {
        Step::Continue(Box::new(f))
    }

    /// Evaluates chained steps to a fixed point.
    ///
    /// Loops over [`Step::Continue`] in place, so the native stack depth
    /// stays constant regardless of chain length.
    pub fn evaluate(self) -> Control<O, S> {
        let mut step = self;
        loop {
            match step {
                Step::Done(reply) => return Control::Done(reply),
                Step::Suspend(request) => return Control::Suspend(request),
                Step::Continue(thunk) => step = thunk(),
            }
        }
    }

    /// Evaluates to a terminal outcome, answering every request with the
    /// end-of-input signal.
    ///
    /// This is direct (non-incremental) execution: the input the state
    /// already holds is all the input there is. A request met here resumes
    /// over empty input and the parse runs to its natural success or
    /// failure, exactly as `finish` does for a session.
    pub fn run_to_end(self) -> Reply<O, S> {
        let mut step = self;
        loop {
            match step.evaluate() {
                Control::Done(reply) => return reply,
                Control::Suspend(request) => step = request.resume(None),
            }
        }
    }
}

impl<O: 'static, S: ParserState> Step<O, S> {
    /// Chains `f` onto the eventual outcome of this step.
    ///
    /// The continuation is deferred through [`Step::Continue`] rather than
    /// called directly, and a suspended step re-wraps its request so the
    /// chain survives across the suspension. This method is what keeps every
    /// combinator stack-safe.
    pub fn bind<O2: 'static>(
        self,
        f: impl FnOnce(Reply<O, S>) -> Step<O2, S> + 'static,
    ) -> Step<O2, S> {
        match self {
            Step::Done(reply) => Step::continue_with(move || f(reply)),
            Step::Continue(thunk) => Step::continue_with(move || thunk().bind(f)),
            Step::Suspend(Request { chunk, resume }) => Step::Suspend(Request {
                chunk,
                resume: Box::new(move |input| resume(input).bind(f)),
            }),
        }
    }

    /// Maps the eventual success value.
    #[inline]
    pub fn map<O2: 'static>(self, f: impl FnOnce(O) -> O2 + 'static) -> Step<O2, S> {
        self.bind(move |reply| Step::Done(reply.map(f)))
    }
}

impl<O, S: ParserState> core::fmt::Debug for Request<O, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Request").field("chunk", &self.chunk).finish_non_exhaustive()
    }
}
