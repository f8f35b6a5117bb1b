//! Concrete inputs and the standard parser state.
//!
//! [`SliceInput`] is the workhorse: a cheaply cloneable window over shared
//! element storage, advanced by moving its start index. [`RepeatInput`] is a
//! synthetic endless input used to exercise lazy result streams against
//! unbounded matches. [`State`] combines an input with an absolute element
//! offset and user data to satisfy the full [`ParserState`] capability set.

use core::fmt;
use std::sync::Arc;

use crate::traits::{Advance, Input, ParserState};

/// A window over reference-counted element storage.
///
/// Cloning shares the backing storage; advancing bumps the window start.
/// Equality compares the remaining elements, with a pointer-identity fast
/// path for windows over the same backing storage.
#[derive(Clone)]
pub struct SliceInput<T> {
    items: Arc<[T]>,
    start: usize,
}

impl<T> SliceInput<T> {
    /// Creates an input over the given elements.
    pub fn new(items: impl Into<Arc<[T]>>) -> Self {
        Self {
            items: items.into(),
            start: 0,
        }
    }

    /// The remaining elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items[self.start.min(self.items.len())..]
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Input for SliceInput<T> {
    type Item = T;

    #[inline]
    fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            start: 0,
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.start >= self.items.len()
    }

    #[inline]
    fn first(&self) -> Option<T> {
        self.items.get(self.start).cloned()
    }

    #[inline]
    fn rest(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            start: (self.start + 1).min(self.items.len()),
        }
    }

    #[inline]
    fn len(&self) -> Option<usize> {
        Some(self.items.len() - self.start.min(self.items.len()))
    }
}

impl<T: PartialEq> PartialEq for SliceInput<T> {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.items, &other.items) && self.start == other.start)
            || self.items[self.start.min(self.items.len())..]
                == other.items[other.start.min(other.items.len())..]
    }
}

impl<T: fmt::Debug> fmt::Debug for SliceInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> From<Vec<T>> for SliceInput<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone> From<&[T]> for SliceInput<T> {
    fn from(items: &[T]) -> Self {
        Self::new(items.to_vec())
    }
}

impl From<&str> for SliceInput<char> {
    fn from(text: &str) -> Self {
        Self::new(text.chars().collect::<Vec<_>>())
    }
}

impl<T> FromIterator<T> for SliceInput<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// An endless synthetic input yielding the same element forever.
///
/// `rest()` returns an identical view, so the input never empties. The empty
/// value exists only to satisfy end-of-input plumbing; a `RepeatInput`
/// constructed with [`RepeatInput::new`] reports non-empty indefinitely and
/// has no finite length.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatInput<T> {
    item: Option<T>,
}

impl<T> RepeatInput<T> {
    /// Creates an endless supply of `item`.
    #[inline]
    pub fn new(item: T) -> Self {
        Self { item: Some(item) }
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Input for RepeatInput<T> {
    type Item = T;

    #[inline]
    fn empty() -> Self {
        Self { item: None }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    #[inline]
    fn first(&self) -> Option<T> {
        self.item.clone()
    }

    #[inline]
    fn rest(&self) -> Self {
        self.clone()
    }

    #[inline]
    fn len(&self) -> Option<usize> {
        match self.item {
            Some(_) => None,
            None => Some(0),
        }
    }
}

/// The standard parser state: input, absolute element offset, user data.
///
/// `next` ignores the element it is handed; the position is a plain offset
/// that advances by one per consumed element. States that need element-aware
/// positions (line/column tracking, byte offsets over variable-width tokens)
/// can wrap or replace this type; the engine only requires [`ParserState`].
#[derive(Debug, Clone, PartialEq)]
pub struct State<I, U> {
    input: I,
    offset: usize,
    user: U,
}

impl<I: Input, U: Clone + PartialEq + 'static> State<I, U> {
    /// Creates a state at offset zero.
    pub fn new(input: I, user: U) -> Self {
        Self {
            input,
            offset: 0,
            user,
        }
    }

    /// The absolute element offset consumed so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<I: Input, U: Clone + PartialEq + 'static> ParserState for State<I, U> {
    type Item = I::Item;
    type Input = I;
    type Position = usize;
    type User = U;

    #[inline]
    fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    #[inline]
    fn first(&self) -> Option<I::Item> {
        self.input.first()
    }

    #[inline]
    fn next(&self, _item: &I::Item) -> Advance<Self> {
        Advance::Ready(Self {
            input: self.input.rest(),
            offset: self.offset + 1,
            user: self.user.clone(),
        })
    }

    #[inline]
    fn position(&self) -> usize {
        self.offset
    }

    #[inline]
    fn input(&self) -> &I {
        &self.input
    }

    #[inline]
    fn user_state(&self) -> &U {
        &self.user
    }

    #[inline]
    fn with_input(&self, input: I) -> Self {
        Self {
            input,
            offset: self.offset,
            user: self.user.clone(),
        }
    }

    #[inline]
    fn with_position(&self, position: usize) -> Self {
        Self {
            input: self.input.clone(),
            offset: position,
            user: self.user.clone(),
        }
    }

    #[inline]
    fn with_user_state(&self, user: U) -> Self {
        Self {
            input: self.input.clone(),
            offset: self.offset,
            user,
        }
    }
}
