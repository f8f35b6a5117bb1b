//! The minimal combinator set the execution engine is driven by.
//!
//! A [`Parser`] is a reusable function from a state to a [`Step`], and every
//! combinator here routes its continuations through [`Step::bind`] so that
//! arbitrarily long parses stay in bounded stack space and suspend cleanly at
//! chunk boundaries. Grammars are written once, generic over the state, and
//! then run directly (all input up front) or through a session (input fed in
//! chunks) without changing a line.
//!
//! Sequencing follows consumed-commit semantics: once a step of a compound
//! parser has consumed input, a later failure inside that compound is
//! committed and [`Parser::or`] will not retry the alternative. Only a
//! failure that consumed nothing backtracks.
//!
//! # Example
//!
//! ```ignore
//! use parsume::{element, satisfy, Parser, SliceInput, State};
//!
//! fn digits<S>() -> Parser<Vec<char>, S>
//! where
//!     S: parsume::ParserState<Item = char>,
//! {
//!     parsume::many1(satisfy(|c: &char| c.is_ascii_digit(), "digit"))
//! }
//!
//! let state = State::new(SliceInput::from("42!"), ());
//! let reply = digits().parse(state);
//! assert_eq!(reply.value(), Some(&vec!['4', '2']));
//! ```

use std::rc::Rc;

use crate::Error;
use crate::reply::Reply;
use crate::step::{Request, Step};
use crate::traits::{Advance, ParserState};

/// A parser from states of type `S` to values of type `O`.
///
/// Cheap to clone; clones share the underlying function.
pub struct Parser<O, S: ParserState> {
    run: Rc<dyn Fn(S) -> Step<O, S>>,
}

impl<O, S: ParserState> Clone for Parser<O, S> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<O: 'static, S: ParserState> Parser<O, S> {
    /// Wraps a run function as a parser.
    pub fn new(run: impl Fn(S) -> Step<O, S> + 'static) -> Self {
        Self { run: Rc::new(run) }
    }

    /// Runs one application against `state`, yielding a possibly-suspended
    /// computation. Sessions drive this; most callers want
    /// [`Parser::parse`].
    #[inline]
    pub fn run(&self, state: S) -> Step<O, S> {
        (self.run)(state)
    }

    /// Runs to a terminal outcome, treating the state's current input as all
    /// the input there is.
    pub fn parse(&self, state: S) -> Reply<O, S> {
        self.run(state).run_to_end()
    }

    /// Applies `f` to the success value.
    pub fn map<O2: 'static>(self, f: impl Fn(O) -> O2 + 'static) -> Parser<O2, S> {
        let f = Rc::new(f);
        Parser::new(move |state| {
            let f = Rc::clone(&f);
            self.run(state).map(move |value| f(value))
        })
    }

    /// Sequences a parser chosen from the success value.
    ///
    /// If this parser consumed input, the compound outcome is consumed no
    /// matter what `f`'s parser reports.
    pub fn and_then<O2: 'static>(
        self,
        f: impl Fn(O) -> Parser<O2, S> + 'static,
    ) -> Parser<O2, S> {
        let f = Rc::new(f);
        Parser::new(move |state| {
            let f = Rc::clone(&f);
            self.run(state).bind(move |reply| match reply {
                Reply::ConsumedOk(value, next) => f(value)
                    .run(next)
                    .bind(|second| Step::done(second.into_consumed())),
                Reply::EmptyOk(value, next) => f(value).run(next),
                Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
                Reply::EmptyErr(err, state) => Step::done(Reply::EmptyErr(err, state)),
            })
        })
    }

    /// Runs `next` after this parser, keeping only `next`'s value.
    pub fn then<O2: 'static>(self, next: Parser<O2, S>) -> Parser<O2, S> {
        self.and_then(move |_| next.clone())
    }

    /// Runs `next` after this parser, keeping only this parser's value.
    pub fn skip<O2: 'static>(self, next: Parser<O2, S>) -> Parser<O, S> {
        Parser::new(move |state| {
            let next = next.clone();
            self.run(state).bind(move |reply| match reply {
                Reply::ConsumedOk(value, after) => next.run(after).bind(move |second| {
                    Step::done(match second {
                        Reply::ConsumedOk(_, state) | Reply::EmptyOk(_, state) => {
                            Reply::ConsumedOk(value, state)
                        }
                        Reply::ConsumedErr(err, state) | Reply::EmptyErr(err, state) => {
                            Reply::ConsumedErr(err, state)
                        }
                    })
                }),
                Reply::EmptyOk(value, after) => next.run(after).bind(move |second| {
                    Step::done(match second {
                        Reply::ConsumedOk(_, state) => Reply::ConsumedOk(value, state),
                        Reply::EmptyOk(_, state) => Reply::EmptyOk(value, state),
                        Reply::ConsumedErr(err, state) => Reply::ConsumedErr(err, state),
                        Reply::EmptyErr(err, state) => Reply::EmptyErr(err, state),
                    })
                }),
                Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
                Reply::EmptyErr(err, state) => Step::done(Reply::EmptyErr(err, state)),
            })
        })
    }

    /// Tries this parser; on failure without consumption, tries `other` from
    /// the same position.
    ///
    /// A failure that consumed input is committed and propagates unchanged.
    /// When both alternatives fail empty, the second failure stands.
    pub fn or(self, other: Parser<O, S>) -> Parser<O, S> {
        Parser::new(move |state: S| {
            let other = other.clone();
            let saved = state.clone();
            self.run(state).bind(move |reply| match reply {
                Reply::EmptyErr(..) => Step::continue_with(move || other.run(saved)),
                decided => Step::done(decided),
            })
        })
    }

    /// Makes this parser optional, succeeding with `None` where it would
    /// have failed without consuming.
    pub fn optional(self) -> Parser<Option<O>, S> {
        Parser::new(move |state: S| {
            let saved = state.clone();
            self.run(state).bind(move |reply| {
                Step::done(match reply {
                    Reply::ConsumedOk(value, state) => Reply::ConsumedOk(Some(value), state),
                    Reply::EmptyOk(value, state) => Reply::EmptyOk(Some(value), state),
                    Reply::ConsumedErr(err, state) => Reply::ConsumedErr(err, state),
                    Reply::EmptyErr(..) => Reply::EmptyOk(None, saved),
                })
            })
        })
    }
}

/// Succeeds with `value` without consuming input.
pub fn pure<O: Clone + 'static, S: ParserState>(value: O) -> Parser<O, S> {
    Parser::new(move |state| Step::done(Reply::EmptyOk(value.clone(), state)))
}

/// Fails with `text` without consuming input.
pub fn fail<O: 'static, S: ParserState>(text: &'static str) -> Parser<O, S> {
    Parser::new(move |state: S| {
        let at = state.position();
        Step::done(Reply::EmptyErr(Error::Message { text, at }, state))
    })
}

/// Produces the consumed-success step for `item`, suspending if consuming it
/// crossed a chunk boundary.
fn consume<S: ParserState>(state: &S, item: S::Item) -> Step<S::Item, S> {
    match state.next(&item) {
        Advance::Ready(next) => Step::done(Reply::ConsumedOk(item, next)),
        Advance::Boundary(boundary) => Step::Suspend(Request::new(boundary.chunk(), move |input| {
            Step::done(Reply::ConsumedOk(item, boundary.resume(input)))
        })),
    }
}

/// Consumes and returns the next element, whatever it is.
pub fn any<S: ParserState>() -> Parser<S::Item, S> {
    Parser::new(|state: S| match state.first() {
        Some(item) => consume(&state, item),
        None => {
            let at = state.position();
            Step::done(Reply::EmptyErr(Error::UnexpectedEnd { at }, state))
        }
    })
}

/// Consumes the next element if it satisfies `pred`; fails with `label`
/// otherwise.
pub fn satisfy<S: ParserState>(
    pred: impl Fn(&S::Item) -> bool + 'static,
    label: &'static str,
) -> Parser<S::Item, S> {
    Parser::new(move |state: S| match state.first() {
        Some(item) if pred(&item) => consume(&state, item),
        Some(_) => {
            let at = state.position();
            Step::done(Reply::EmptyErr(Error::Expected { label, at }, state))
        }
        None => {
            let at = state.position();
            Step::done(Reply::EmptyErr(Error::UnexpectedEnd { at }, state))
        }
    })
}

/// Consumes the next element if it equals `expected`.
pub fn element<S: ParserState>(expected: S::Item) -> Parser<S::Item, S>
where
    S::Item: PartialEq,
{
    Parser::new(move |state: S| match state.first() {
        Some(item) if item == expected => consume(&state, item),
        Some(item) => {
            let at = state.position();
            let found = format!("{:?}", item);
            Step::done(Reply::EmptyErr(Error::Unexpected { found, at }, state))
        }
        None => {
            let at = state.position();
            Step::done(Reply::EmptyErr(Error::UnexpectedEnd { at }, state))
        }
    })
}

/// Consumes a fixed sequence of elements, element at a time.
///
/// Fails without consumption only if the very first element differs; a
/// mismatch later in the sequence is a committed failure. Because each
/// element is consumed individually, the sequence matches identically
/// whether it sits inside one chunk or spans several.
pub fn elements<S: ParserState>(expected: Vec<S::Item>) -> Parser<Vec<S::Item>, S>
where
    S::Item: PartialEq,
{
    let expected = Rc::new(expected);
    Parser::new(move |state| {
        let expected = Rc::clone(&expected);
        Step::continue_with(move || step_elements(expected, 0, state))
    })
}

fn step_elements<S: ParserState>(
    expected: Rc<Vec<S::Item>>,
    index: usize,
    state: S,
) -> Step<Vec<S::Item>, S>
where
    S::Item: PartialEq,
{
    let Some(want) = expected.get(index) else {
        let value = (*expected).clone();
        return Step::done(if index == 0 {
            Reply::EmptyOk(value, state)
        } else {
            Reply::ConsumedOk(value, state)
        });
    };
    let fail = |err: Error<S::Position>, state: S| {
        Step::done(if index == 0 {
            Reply::EmptyErr(err, state)
        } else {
            Reply::ConsumedErr(err, state)
        })
    };
    match state.first() {
        Some(item) if item == *want => match state.next(&item) {
            Advance::Ready(next) => {
                Step::continue_with(move || step_elements(expected, index + 1, next))
            }
            Advance::Boundary(boundary) => {
                Step::Suspend(Request::new(boundary.chunk(), move |input| {
                    step_elements(expected, index + 1, boundary.resume(input))
                }))
            }
        },
        Some(item) => {
            let at = state.position();
            let found = format!("{:?}", item);
            fail(Error::Unexpected { found, at }, state)
        }
        None => {
            let at = state.position();
            fail(Error::UnexpectedEnd { at }, state)
        }
    }
}

/// Succeeds without consuming when no input remains.
///
/// Inside a session this is only decidable once the end-of-input signal has
/// arrived; before that, an exhausted chunk suspends rather than presenting
/// an empty state.
pub fn eof<S: ParserState>() -> Parser<(), S> {
    Parser::new(|state: S| match state.first() {
        None => Step::done(Reply::EmptyOk((), state)),
        Some(item) => {
            let at = state.position();
            let found = format!("{:?}", item);
            Step::done(Reply::EmptyErr(Error::Unexpected { found, at }, state))
        }
    })
}

/// Defers parser construction until the parser runs, breaking definition
/// cycles in recursive grammars.
pub fn defer<O: 'static, S: ParserState>(build: impl Fn() -> Parser<O, S> + 'static) -> Parser<O, S> {
    Parser::new(move |state| {
        let parser = build();
        Step::continue_with(move || parser.run(state))
    })
}

/// Applies `parser` zero or more times, collecting the values.
///
/// Stops at the first failure without consumption. A repetition step that
/// succeeds without advancing the state ends the loop after emitting its
/// value, so zero-width grammars terminate instead of spinning.
pub fn many<O: 'static, S: ParserState>(parser: Parser<O, S>) -> Parser<Vec<O>, S> {
    Parser::new(move |state| {
        let parser = parser.clone();
        Step::continue_with(move || step_many(parser, Vec::new(), false, state))
    })
}

/// Applies `parser` one or more times, collecting the values.
pub fn many1<O: 'static, S: ParserState>(parser: Parser<O, S>) -> Parser<Vec<O>, S> {
    Parser::new(move |state: S| {
        let parser = parser.clone();
        let before = state.clone();
        parser.run(state).bind(move |reply| match reply {
            Reply::ConsumedOk(value, next) => {
                Step::continue_with(move || step_many(parser, vec![value], true, next))
            }
            Reply::EmptyOk(value, next) => {
                if next == before {
                    Step::done(Reply::EmptyOk(vec![value], next))
                } else {
                    Step::continue_with(move || step_many(parser, vec![value], false, next))
                }
            }
            Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
            Reply::EmptyErr(err, state) => Step::done(Reply::EmptyErr(err, state)),
        })
    })
}

/// Applies `parser` zero or more times, discarding the values.
pub fn skip_many<O: 'static, S: ParserState>(parser: Parser<O, S>) -> Parser<(), S> {
    Parser::new(move |state| {
        let parser = parser.clone();
        Step::continue_with(move || step_skip_many(parser, false, state))
    })
}

/// Parses zero or more `parser` occurrences separated by `separator`.
///
/// A separator with nothing after it is a committed failure once the
/// separator consumed input.
pub fn sep_by<O: 'static, O2: 'static, S: ParserState>(
    parser: Parser<O, S>,
    separator: Parser<O2, S>,
) -> Parser<Vec<O>, S> {
    Parser::new(move |state: S| {
        let parser = parser.clone();
        let separator = separator.clone();
        let before = state.clone();
        parser.run(state).bind(move |reply| match reply {
            Reply::ConsumedOk(value, next) => Step::continue_with(move || {
                step_sep_by(parser, separator, vec![value], true, next)
            }),
            Reply::EmptyOk(value, next) => {
                if next == before {
                    Step::done(Reply::EmptyOk(vec![value], next))
                } else {
                    Step::continue_with(move || {
                        step_sep_by(parser, separator, vec![value], false, next)
                    })
                }
            }
            Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
            Reply::EmptyErr(..) => Step::done(Reply::EmptyOk(Vec::new(), before)),
        })
    })
}

fn finish_repeat<O, S: ParserState>(acc: O, consumed: bool, state: S) -> Reply<O, S> {
    if consumed {
        Reply::ConsumedOk(acc, state)
    } else {
        Reply::EmptyOk(acc, state)
    }
}

fn step_many<O: 'static, S: ParserState>(
    parser: Parser<O, S>,
    acc: Vec<O>,
    consumed: bool,
    state: S,
) -> Step<Vec<O>, S> {
    let before = state.clone();
    let attempt = parser.run(state);
    attempt.bind(move |reply| {
        let mut acc = acc;
        match reply {
            Reply::ConsumedOk(value, next) => {
                acc.push(value);
                Step::continue_with(move || step_many(parser, acc, true, next))
            }
            Reply::EmptyOk(value, next) => {
                acc.push(value);
                if next == before {
                    Step::done(finish_repeat(acc, consumed, next))
                } else {
                    Step::continue_with(move || step_many(parser, acc, consumed, next))
                }
            }
            Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
            Reply::EmptyErr(..) => Step::done(finish_repeat(acc, consumed, before)),
        }
    })
}

fn step_skip_many<O: 'static, S: ParserState>(
    parser: Parser<O, S>,
    consumed: bool,
    state: S,
) -> Step<(), S> {
    let before = state.clone();
    let attempt = parser.run(state);
    attempt.bind(move |reply| match reply {
        Reply::ConsumedOk(_, next) => {
            Step::continue_with(move || step_skip_many(parser, true, next))
        }
        Reply::EmptyOk(_, next) => {
            if next == before {
                Step::done(finish_repeat((), consumed, next))
            } else {
                Step::continue_with(move || step_skip_many(parser, consumed, next))
            }
        }
        Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
        Reply::EmptyErr(..) => Step::done(finish_repeat((), consumed, before)),
    })
}

fn step_sep_by<O: 'static, O2: 'static, S: ParserState>(
    parser: Parser<O, S>,
    separator: Parser<O2, S>,
    acc: Vec<O>,
    consumed: bool,
    state: S,
) -> Step<Vec<O>, S> {
    let before = state.clone();
    let sep_attempt = separator.run(state);
    sep_attempt.bind(move |sep_reply| {
        let (sep_consumed, after) = match sep_reply {
            Reply::ConsumedOk(_, after) => (true, after),
            Reply::EmptyOk(_, after) => (false, after),
            Reply::ConsumedErr(err, state) => {
                return Step::done(Reply::ConsumedErr(err, state));
            }
            Reply::EmptyErr(..) => {
                return Step::done(finish_repeat(acc, consumed, before));
            }
        };
        let item_attempt = parser.run(after);
        item_attempt.bind(move |item_reply| {
            let mut acc = acc;
            match item_reply {
                Reply::ConsumedOk(value, next) => {
                    acc.push(value);
                    Step::continue_with(move || step_sep_by(parser, separator, acc, true, next))
                }
                Reply::EmptyOk(value, next) => {
                    acc.push(value);
                    if !sep_consumed && next == before {
                        Step::done(finish_repeat(acc, consumed, next))
                    } else {
                        Step::continue_with(move || {
                            step_sep_by(parser, separator, acc, consumed || sep_consumed, next)
                        })
                    }
                }
                Reply::ConsumedErr(err, state) => Step::done(Reply::ConsumedErr(err, state)),
                Reply::EmptyErr(err, state) => {
                    if sep_consumed {
                        // The separator committed us to another item.
                        Step::done(Reply::ConsumedErr(err, state))
                    } else {
                        Step::done(finish_repeat(acc, consumed, before))
                    }
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SliceInput, State};

    type S = State<SliceInput<char>, ()>;

    fn run<O: 'static>(parser: &Parser<O, S>, text: &str) -> Reply<O, S> {
        parser.parse(State::new(SliceInput::from(text), ()))
    }

    fn digit() -> Parser<char, S> {
        satisfy(|c: &char| c.is_ascii_digit(), "digit")
    }

    #[test]
    fn any_consumes_one_element() {
        match run(&any(), "xy") {
            Reply::ConsumedOk(c, state) => {
                assert_eq!(c, 'x');
                assert_eq!(state.offset(), 1);
            }
            other => panic!("unexpected reply: {:?}", other.error()),
        }
    }

    #[test]
    fn any_fails_empty_on_no_input() {
        match run(&any(), "") {
            Reply::EmptyErr(Error::UnexpectedEnd { at }, _) => assert_eq!(at, 0),
            _ => panic!("expected empty failure"),
        }
    }

    #[test]
    fn satisfy_rejects_without_consuming() {
        match run(&digit(), "x") {
            Reply::EmptyErr(Error::Expected { label, at }, _) => {
                assert_eq!(label, "digit");
                assert_eq!(at, 0);
            }
            _ => panic!("expected labeled failure"),
        }
    }

    #[test]
    fn sequencing_commits_after_consumption() {
        let parser = element('a').then(element('b'));
        match run(&parser, "ac") {
            Reply::ConsumedErr(Error::Unexpected { found, at }, _) => {
                assert_eq!(found, "'c'");
                assert_eq!(at, 1);
            }
            _ => panic!("expected committed failure"),
        }
    }

    #[test]
    fn or_retries_only_empty_failures() {
        let backtrackable = element('a').or(element('b'));
        assert_eq!(run(&backtrackable, "b").value(), Some(&'b'));

        // 'a' matched, so the first branch consumed before failing; the
        // alternative must not run.
        let committed = element('a').then(element('b')).or(element('a').then(element('c')));
        match run(&committed, "ac") {
            Reply::ConsumedErr(..) => {}
            _ => panic!("consumed failure must not backtrack"),
        }
    }

    #[test]
    fn optional_turns_empty_failure_into_none() {
        let parser = digit().optional();
        assert_eq!(run(&parser, "x").value(), Some(&None));
        assert_eq!(run(&parser, "7x").value(), Some(&Some('7')));
    }

    #[test]
    fn skip_keeps_the_first_value() {
        let parser = digit().skip(element('!'));
        match run(&parser, "7!") {
            Reply::ConsumedOk(c, _) => assert_eq!(c, '7'),
            _ => panic!("expected success"),
        }
        match run(&parser, "7?") {
            Reply::ConsumedErr(..) => {}
            _ => panic!("expected committed failure"),
        }
    }

    #[test]
    fn elements_matches_a_fixed_sequence() {
        let parser = elements("abc".chars().collect());
        match run(&parser, "abcd") {
            Reply::ConsumedOk(value, state) => {
                assert_eq!(value, vec!['a', 'b', 'c']);
                assert_eq!(state.offset(), 3);
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn elements_commits_after_a_partial_match() {
        let parser = elements("abc".chars().collect());
        match run(&parser, "abx") {
            Reply::ConsumedErr(Error::Unexpected { at, .. }, _) => assert_eq!(at, 2),
            _ => panic!("expected committed failure"),
        }
        match run(&parser, "xbc") {
            Reply::EmptyErr(..) => {}
            _ => panic!("first-element mismatch must stay retryable"),
        }
    }

    #[test]
    fn eof_distinguishes_empty_from_leftover() {
        assert!(run(&eof(), "").is_ok());
        match run(&eof(), "x") {
            Reply::EmptyErr(Error::Unexpected { found, .. }, _) => assert_eq!(found, "'x'"),
            _ => panic!("expected failure on leftover input"),
        }
    }

    #[test]
    fn many_collects_until_mismatch() {
        let parser = many(digit());
        assert_eq!(run(&parser, "123x").value(), Some(&vec!['1', '2', '3']));
        assert_eq!(run(&parser, "x").value(), Some(&Vec::new()));
    }

    #[test]
    fn many_terminates_on_zero_width_success() {
        let parser = many(pure::<_, S>(1));
        assert_eq!(run(&parser, "abc").value(), Some(&vec![1]));
    }

    #[test]
    fn many1_requires_one_match() {
        let parser = many1(digit());
        assert_eq!(run(&parser, "12").value(), Some(&vec!['1', '2']));
        assert!(matches!(run(&parser, "x"), Reply::EmptyErr(..)));
    }

    #[test]
    fn many_propagates_committed_failures() {
        let parser = many(element('a').then(element('b')));
        match run(&parser, "abax") {
            Reply::ConsumedErr(..) => {}
            _ => panic!("mid-item failure must propagate"),
        }
    }

    #[test]
    fn sep_by_handles_empty_single_and_multiple() {
        let parser = sep_by(digit(), element(','));
        assert_eq!(run(&parser, "").value(), Some(&Vec::new()));
        assert_eq!(run(&parser, "7").value(), Some(&vec!['7']));
        assert_eq!(run(&parser, "1,2,3").value(), Some(&vec!['1', '2', '3']));
    }

    #[test]
    fn sep_by_rejects_a_dangling_separator() {
        let parser = sep_by(digit(), element(','));
        match run(&parser, "1,2,") {
            Reply::ConsumedErr(..) => {}
            _ => panic!("dangling separator must fail"),
        }
    }

    #[test]
    fn and_then_threads_values() {
        let parser = digit().and_then(|d| element(d));
        assert_eq!(run(&parser, "77").value(), Some(&'7'));
        assert!(matches!(run(&parser, "78"), Reply::ConsumedErr(..)));
    }

    #[test]
    fn deep_repetition_stays_in_bounded_stack() {
        let text: String = "x".repeat(10_000);
        let parser = many(any());
        match run(&parser, &text) {
            Reply::ConsumedOk(values, _) => assert_eq!(values.len(), 10_000),
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn fail_reports_the_grammar_message() {
        let parser: Parser<char, S> = fail("nope");
        match run(&parser, "x") {
            Reply::EmptyErr(Error::Message { text, .. }, _) => assert_eq!(text, "nope"),
            _ => panic!("expected message failure"),
        }
    }
}
