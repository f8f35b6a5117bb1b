use core::fmt;

/// An immutable view over a sequence of input elements.
///
/// Inputs are the unit of chunked feeding: every chunk handed to a session is
/// one `Input` value, and the remaining-input portion of a parser state is an
/// `Input` as well. Implementations must be cheap to clone, because every
/// pure state transition produces a new state holding a new view.
///
/// An input is never mutated after construction. Advancing past an element
/// produces a fresh view via [`Input::rest`].
pub trait Input: Clone + PartialEq + 'static {
    /// The element type yielded by this input.
    type Item: Clone + fmt::Debug + 'static;

    /// Returns the empty input value.
    ///
    /// Used when a parse is resumed with the end-of-input signal and when a
    /// session force-drives an empty chunk.
    fn empty() -> Self;

    /// Returns true if no elements remain.
    fn is_empty(&self) -> bool;

    /// Returns the first element without advancing, or `None` when empty.
    fn first(&self) -> Option<Self::Item>;

    /// Returns the view past the first element.
    ///
    /// Calling this on an empty input must return an empty input, not panic.
    fn rest(&self) -> Self;

    /// Returns the number of remaining elements, or `None` for inputs with
    /// no finite length (synthetic endless streams).
    fn len(&self) -> Option<usize>;
}
