#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parsume::{
    Parser, ParserState, SliceInput, State, element, eof, many, many1, run_inc, satisfy, sep_by,
};

// A list grammar with backtracking, repetition, and committed failure
// paths, so fuzzed text can reach every reply variant.

fn word<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    many1(satisfy(|c: &char| c.is_ascii_alphanumeric(), "word character"))
        .map(|chars| chars.into_iter().collect())
}

fn bracketed<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    element('[')
        .then(many(satisfy(|c: &char| *c != ']', "bracketed character")))
        .map(|chars| chars.into_iter().collect::<String>())
        .skip(element(']'))
}

fn list<S>() -> Parser<Vec<String>, S>
where
    S: ParserState<Item = char>,
{
    sep_by(bracketed().or(word()), element(',')).skip(eof())
}

#[derive(Arbitrary, Debug)]
struct ChunkCase {
    text: String,
    cuts: Vec<u8>,
}

// Splitting the input into chunks must not change the outcome: value,
// error, and error position all match a direct parse of the whole text.
fuzz_target!(|case: ChunkCase| {
    let direct = list()
        .parse(State::new(SliceInput::from(case.text.as_str()), ()))
        .into_result();

    let chars: Vec<char> = case.text.chars().collect();
    let mut session = run_inc(list(), ());
    let mut start = 0;
    for cut in case.cuts {
        let end = (start + cut as usize).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        session = session.provide_str(&piece);
        start = end;
    }
    let tail: String = chars[start..].iter().collect();
    session = session.provide_str(&tail);

    match (direct, session.finish()) {
        (Ok((value, _)), Ok(found)) => assert_eq!(value, found),
        (Err((err, _)), Err(found)) => assert_eq!(err, found),
        (direct, chunked) => panic!("outcomes diverged: {direct:?} vs {chunked:?}"),
    }
});
