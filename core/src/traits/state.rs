use core::fmt;

use super::input::Input;

/// The capability set a parser state exposes to the execution engine.
///
/// A parser state bundles three things: the remaining input, a position, and
/// caller-supplied user data. All operations are pure; "mutation" means
/// producing a new state value, which is what makes backtracking and
/// suspension safe. Equality (the `PartialEq` supertrait) is how combinators
/// detect lack of progress, so two states may only compare equal when a
/// parser genuinely could not distinguish them.
///
/// The one operation that is not a plain accessor is [`ParserState::next`]:
/// advancing past an element may hit the end of the currently available
/// input, in which case the state answers with [`Advance::Boundary`] instead
/// of a ready successor. Plain in-memory states never do this; the chunked
/// wrapper in [`crate::Incremental`] is where boundaries come from.
pub trait ParserState: Clone + PartialEq + 'static {
    /// The element type consumed by parsers over this state.
    type Item: Clone + fmt::Debug + 'static;
    /// The remaining-input representation.
    type Input: Input<Item = Self::Item>;
    /// The position representation, carried into errors.
    type Position: Clone + PartialEq + fmt::Debug + fmt::Display + 'static;
    /// Caller-supplied user data threaded through the parse.
    type User: Clone + PartialEq + 'static;

    /// Returns true if no input remains.
    fn is_empty(&self) -> bool;

    /// Returns the next element without consuming it, or `None` when empty.
    fn first(&self) -> Option<Self::Item>;

    /// Produces the state after having just consumed `item`.
    ///
    /// `item` is the element previously observed via [`ParserState::first`];
    /// it is passed back so position schemes that depend on the element (for
    /// example line counting) can update correctly.
    fn next(&self, item: &Self::Item) -> Advance<Self>;

    /// Returns the current position.
    fn position(&self) -> Self::Position;

    /// Returns the remaining input.
    fn input(&self) -> &Self::Input;

    /// Returns the user data.
    fn user_state(&self) -> &Self::User;

    /// Returns a state with the remaining input replaced.
    fn with_input(&self, input: Self::Input) -> Self;

    /// Returns a state with the position replaced.
    fn with_position(&self, position: Self::Position) -> Self;

    /// Returns a state with the user data replaced.
    fn with_user_state(&self, user: Self::User) -> Self;
}

/// The outcome of advancing a state past one element.
pub enum Advance<S: ParserState> {
    /// The successor state is available immediately.
    Ready(S),
    /// The element was the last one available; the successor state cannot be
    /// built until the next chunk of input arrives.
    Boundary(Boundary<S>),
}

impl<S: ParserState> Advance<S> {
    /// Returns the ready successor, or `None` if this advance suspended.
    #[inline]
    pub fn ready(self) -> Option<S> {
        match self {
            Advance::Ready(state) => Some(state),
            Advance::Boundary(_) => None,
        }
    }
}

/// A pending state transition across a chunk boundary.
///
/// Holds the index of the chunk that must arrive before the successor state
/// exists, plus the one-shot constructor that builds the successor from that
/// chunk's input. Resuming with `None` signals that no further input will
/// ever arrive; the successor is then built over empty input so the parse
/// can run to its natural success or failure.
pub struct Boundary<S: ParserState> {
    chunk: usize,
    build: Box<dyn FnOnce(Option<S::Input>) -> S>,
}

impl<S: ParserState> Boundary<S> {
    /// Creates a boundary awaiting the given chunk index.
    #[inline]
    pub fn new(chunk: usize, build: impl FnOnce(Option<S::Input>) -> S + 'static) -> Self {
        Self {
            chunk,
            build: Box::new(build),
        }
    }

    /// The chunk index this boundary is waiting for.
    #[inline]
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Builds the successor state from the arrived chunk, or from empty
    /// input when `None` signals end-of-input.
    #[inline]
    pub fn resume(self, input: Option<S::Input>) -> S {
        (self.build)(input)
    }
}

impl<S: ParserState> fmt::Debug for Boundary<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boundary").field("chunk", &self.chunk).finish_non_exhaustive()
    }
}
