//! The four-way outcome of running a parser.

use crate::Error;
use crate::traits::ParserState;

/// What running a parser against a state produced.
///
/// Every parser resolves to exactly one of these four variants. The
/// consumed/empty axis records whether any input was consumed, which is what
/// alternation and repetition branch on: an empty failure may be retried
/// from the same position, a consumed failure commits. The empty-success
/// variant is load-bearing for repetition, where a result must be emitted
/// without claiming consumption (see [`crate::many_stream`]).
///
/// Failure variants keep the state at the point of failure so callers can
/// inspect where the parse stood.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<O, S: ParserState> {
    /// Succeeded after consuming at least one element.
    ConsumedOk(O, S),
    /// Succeeded without consuming anything.
    EmptyOk(O, S),
    /// Failed after consuming at least one element. The failure is committed.
    ConsumedErr(Error<S::Position>, S),
    /// Failed without consuming anything. Alternatives may still be tried.
    EmptyErr(Error<S::Position>, S),
}

impl<O, S: ParserState> Reply<O, S> {
    /// Returns true for either success variant.
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::ConsumedOk(..) | Reply::EmptyOk(..))
    }

    /// Returns true if any input was consumed, success or failure.
    #[inline]
    pub fn is_consumed(&self) -> bool {
        matches!(self, Reply::ConsumedOk(..) | Reply::ConsumedErr(..))
    }

    /// Returns the success value by reference, if any.
    #[inline]
    pub fn value(&self) -> Option<&O> {
        match self {
            Reply::ConsumedOk(value, _) | Reply::EmptyOk(value, _) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure by reference, if any.
    #[inline]
    pub fn error(&self) -> Option<&Error<S::Position>> {
        match self {
            Reply::ConsumedErr(err, _) | Reply::EmptyErr(err, _) => Some(err),
            _ => None,
        }
    }

    /// Returns the state the parse ended in.
    #[inline]
    pub fn state(&self) -> &S {
        match self {
            Reply::ConsumedOk(_, state)
            | Reply::EmptyOk(_, state)
            | Reply::ConsumedErr(_, state)
            | Reply::EmptyErr(_, state) => state,
        }
    }

    /// Splits into the success pair or the failure pair.
    pub fn into_result(self) -> Result<(O, S), (Error<S::Position>, S)> {
        match self {
            Reply::ConsumedOk(value, state) | Reply::EmptyOk(value, state) => Ok((value, state)),
            Reply::ConsumedErr(err, state) | Reply::EmptyErr(err, state) => Err((err, state)),
        }
    }

    /// Maps the success value, preserving the variant.
    pub fn map<O2>(self, f: impl FnOnce(O) -> O2) -> Reply<O2, S> {
        match self {
            Reply::ConsumedOk(value, state) => Reply::ConsumedOk(f(value), state),
            Reply::EmptyOk(value, state) => Reply::EmptyOk(f(value), state),
            Reply::ConsumedErr(err, state) => Reply::ConsumedErr(err, state),
            Reply::EmptyErr(err, state) => Reply::EmptyErr(err, state),
        }
    }

    /// Upgrades the empty variants to their consumed counterparts.
    ///
    /// Sequencing uses this: once an earlier step has consumed, the compound
    /// outcome is consumed no matter what the later step reports.
    pub fn into_consumed(self) -> Self {
        match self {
            Reply::EmptyOk(value, state) => Reply::ConsumedOk(value, state),
            Reply::EmptyErr(err, state) => Reply::ConsumedErr(err, state),
            consumed => consumed,
        }
    }
}
