//! Session configuration for buffer tuning.
//!
//! This module provides [`SessionConfig`] for sizing the chunk history a
//! session keeps. The history is append-only for the life of the session, so
//! a capacity hint that matches the expected number of chunks avoids
//! reallocation during long feeds.
//!
//! # Example
//!
//! ```ignore
//! use parsume::SessionConfig;
//!
//! // Use the default capacity (16 chunks)
//! let config = SessionConfig::default();
//!
//! // Feeding a file in 4 KiB reads of known total size
//! let config = SessionConfig::from_expected_chunks(file_len / 4096 + 1);
//!
//! // Long-lived network session
//! let config = SessionConfig::large();
//! ```

/// Configuration for session buffer behavior.
///
/// Purely a performance knob: no setting here changes what a session
/// accepts or produces, only how its chunk history allocates.
///
/// # Default Values
///
/// | Setting | Default | Rationale |
/// |---------|---------|-----------|
/// | `chunk_capacity` | 16 | Covers typical hand-fed and test sessions |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct SessionConfig {
    /// Initial capacity of the chunk history, in chunks.
    ///
    /// The history grows past this freely; the hint only pre-sizes the
    /// buffer.
    ///
    /// Default: 16
    pub chunk_capacity: usize,
}

impl Default for SessionConfig {
    /// Returns the default configuration.
    ///
    /// - `chunk_capacity`: 16
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SessionConfig {
    /// Default configuration, usable in const contexts.
    pub const DEFAULT: Self = Self { chunk_capacity: 16 };

    /// Creates a new configuration with default values.
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Small preset: a handful of chunks, e.g. a string split for a test.
    #[inline]
    pub const fn small() -> Self {
        Self { chunk_capacity: 4 }
    }

    /// Medium preset, same as [`SessionConfig::DEFAULT`].
    #[inline]
    pub const fn medium() -> Self {
        Self::DEFAULT
    }

    /// Large preset: long-lived sessions fed many reads.
    #[inline]
    pub const fn large() -> Self {
        Self { chunk_capacity: 64 }
    }

    /// Sizes the history for a known number of chunks.
    ///
    /// `finish` appends one final flush chunk, which the extra slot absorbs.
    #[inline]
    pub const fn from_expected_chunks(chunks: usize) -> Self {
        Self {
            chunk_capacity: chunks.saturating_add(1),
        }
    }

    /// Sets the chunk history capacity hint.
    #[inline]
    pub const fn with_chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity;
        self
    }
}
