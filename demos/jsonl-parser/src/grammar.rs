//! The JSON grammar.
//!
//! Written once, generic over the parser state: the same combinators run
//! against complete token input ([`Direct`]) and against chunk-fed sessions
//! ([`Chunked`]) without changing a line. Recursion goes through
//! [`parsume::defer`], so values nest arbitrarily.

use crate::ast::{JsonObject, JsonValue};
use crate::{JsonError, Token, lex};
use parsume::{
    Incremental, Parser, ParserState, SliceInput, State, defer, element, eof, many, satisfy,
    sep_by,
};

/// State for parses over complete token input.
pub type Direct = State<SliceInput<Token>, ()>;

/// State for chunk-fed parses driven by a session.
pub type Chunked = Incremental<Direct>;

fn string_lit<S>() -> Parser<String, S>
where
    S: ParserState<Item = Token>,
{
    satisfy(|t: &Token| matches!(t, Token::Str(_)), "string").map(|t| match t {
        Token::Str(s) => s,
        _ => unreachable!(),
    })
}

fn number_lit<S>() -> Parser<String, S>
where
    S: ParserState<Item = Token>,
{
    satisfy(|t: &Token| matches!(t, Token::Number(_)), "number").map(|t| match t {
        Token::Number(n) => n,
        _ => unreachable!(),
    })
}

/// One JSON value of any kind.
pub fn value<S>() -> Parser<JsonValue, S>
where
    S: ParserState<Item = Token>,
{
    element(Token::Null)
        .map(|_| JsonValue::Null)
        .or(element(Token::True).map(|_| JsonValue::Bool(true)))
        .or(element(Token::False).map(|_| JsonValue::Bool(false)))
        .or(number_lit().map(JsonValue::Number))
        .or(string_lit().map(JsonValue::String))
        .or(array())
        .or(object())
}

/// A bracketed array of values.
pub fn array<S>() -> Parser<JsonValue, S>
where
    S: ParserState<Item = Token>,
{
    element(Token::LBracket)
        .then(sep_by(defer(value), element(Token::Comma)))
        .skip(element(Token::RBracket))
        .map(JsonValue::Array)
}

fn member<S>() -> Parser<(String, JsonValue), S>
where
    S: ParserState<Item = Token>,
{
    string_lit().and_then(|key: String| {
        element(Token::Colon)
            .then(defer(value))
            .map(move |val| (key.clone(), val))
    })
}

/// A braced object of string-keyed members.
pub fn object<S>() -> Parser<JsonValue, S>
where
    S: ParserState<Item = Token>,
{
    element(Token::LBrace)
        .then(sep_by(member(), element(Token::Comma)))
        .skip(element(Token::RBrace))
        .map(|entries| JsonValue::Object(JsonObject { entries }))
}

/// Every top-level value in the input, in order, with nothing left over.
pub fn document<S>() -> Parser<Vec<JsonValue>, S>
where
    S: ParserState<Item = Token>,
{
    many(value()).skip(eof())
}

/// Parses exactly one JSON value from a string.
pub fn parse_value(text: &str) -> Result<JsonValue, JsonError> {
    let tokens = lex(text)?;
    value()
        .skip(eof())
        .parse(State::new(SliceInput::from(tokens), ()))
        .into_result()
        .map(|(parsed, _)| parsed)
        .map_err(|(err, _)| err.into())
}

/// Parses a whole JSONL document from a string.
pub fn parse_document(text: &str) -> Result<Vec<JsonValue>, JsonError> {
    let tokens = lex(text)?;
    document()
        .parse(State::new(SliceInput::from(tokens), ()))
        .into_result()
        .map(|(parsed, _)| parsed)
        .map_err(|(err, _)| err.into())
}
