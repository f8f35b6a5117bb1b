//! Core traits for the parsume engine.
//!
//! Two traits carry the whole execution model:
//!
//! ```text
//! Input (element-sequence view)
//!     └── one chunk, or the remaining-input part of a state
//!
//! ParserState (input + position + user data)
//!     └── next() -> Advance { Ready | Boundary }
//! ```
//!
//! [`ParserState`] is the capability set parsers are written against; the
//! engine never sees a concrete state type. [`Advance`] is how chunk
//! suspension enters the system: a state whose current chunk is exhausted
//! answers `next()` with a [`Boundary`] naming the chunk it needs, and the
//! primitives convert that into a suspended computation.
//!
//! # Feature Flags
//!
//! - `std`: Enables `std::error::Error` implementations elsewhere in the
//!   crate; the traits themselves are feature-independent.

mod input;
mod state;

pub use input::Input;
pub use state::{Advance, Boundary, ParserState};
