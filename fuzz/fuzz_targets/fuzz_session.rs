#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parsume::{
    Parser, ParserState, SessionConfig, SliceInput, State, element, eof, many1, run_inc_state_with,
    run_many, satisfy, sep_by,
};

fn number<S>() -> Parser<u64, S>
where
    S: ParserState<Item = char>,
{
    many1(satisfy(|c: &char| c.is_ascii_digit(), "digit")).map(|digits| {
        digits
            .iter()
            .collect::<String>()
            .parse::<u64>()
            .unwrap_or(u64::MAX)
    })
}

fn numbers<S>() -> Parser<Vec<u64>, S>
where
    S: ParserState<Item = char>,
{
    sep_by(number(), element(',')).skip(eof())
}

fn item<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    many1(satisfy(|c: &char| *c != ',', "item character"))
        .map(|chars| chars.into_iter().collect::<String>())
        .skip(element(','))
}

#[derive(Arbitrary, Debug)]
struct SessionCase {
    config: SessionConfig,
    chunks: Vec<String>,
    take: u8,
}

// No chunk sequence, capacity hint, or stream consumption pattern may
// panic. Feeding past completion and finishing without input are both
// legal, and a letter anywhere fails the number grammar mid-feed.
fuzz_target!(|case: SessionCase| {
    let config = case
        .config
        .with_chunk_capacity(case.config.chunk_capacity % 1024);

    let state = State::new(SliceInput::from(""), ());
    let mut session = run_inc_state_with(numbers(), state, config);
    for chunk in &case.chunks {
        session = session.provide_str(chunk);
    }
    let _ = session.finish();

    let text: String = case.chunks.concat();
    for record in run_many(item(), text.as_str(), ())
        .into_iter()
        .take(case.take as usize)
    {
        let _ = record;
    }
});
