//! The CSV grammar.
//!
//! Written once, generic over the parser state: the same combinators run
//! against complete text ([`Direct`]) and against chunk-fed sessions
//! ([`Chunked`]). There is no lexer in front; fields are built character
//! by character, so a quoted field spanning lines or chunks needs nothing
//! special.

use crate::CsvError;
use crate::ast::Table;
use parsume::{
    Incremental, Parser, ParserState, SliceInput, State, defer, element, eof, many, pure, satisfy,
};

/// State for parses over complete text.
pub type Direct = State<SliceInput<char>, ()>;

/// State for chunk-fed parses driven by a session.
pub type Chunked = Incremental<Direct>;

fn unquoted_field<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    many(satisfy(
        |c: &char| !matches!(*c, ',' | '"' | '\n' | '\r'),
        "field character",
    ))
    .map(|chars| chars.into_iter().collect())
}

/// The rest of a quoted field, after its opening quote.
///
/// An embedded quote is written doubled, so reading one means consuming
/// the closing quote, checking for an immediate second quote, and
/// continuing the field when it is there.
fn quoted_tail<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    many(satisfy(|c: &char| *c != '"', "quoted character")).and_then(|chars: Vec<char>| {
        let prefix: String = chars.into_iter().collect();
        element('"')
            .then(element('"').optional())
            .and_then(move |escaped| match escaped {
                Some(_) => {
                    let prefix = prefix.clone();
                    defer(quoted_tail).map(move |rest: String| {
                        let mut field = prefix.clone();
                        field.push('"');
                        field.push_str(&rest);
                        field
                    })
                }
                None => pure(prefix.clone()),
            })
    })
}

fn quoted_field<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    element('"').then(quoted_tail())
}

/// One field, quoted or bare. Matches the empty string.
pub fn field<S>() -> Parser<String, S>
where
    S: ParserState<Item = char>,
{
    quoted_field().or(unquoted_field())
}

/// One record: comma-separated fields, no line ending.
///
/// Never fails without input; an empty line is a record with one empty
/// field. The repetition hangs off the separator because the leading
/// field may match nothing at all, and every repeated unit has to
/// consume.
pub fn record<S>() -> Parser<Vec<String>, S>
where
    S: ParserState<Item = char>,
{
    field().and_then(|first: String| {
        many(element(',').then(field())).map(move |rest| {
            let mut fields = vec![first.clone()];
            fields.extend(rest);
            fields
        })
    })
}

/// An LF or CRLF line ending. A bare carriage return is a committed
/// failure.
pub fn newline<S>() -> Parser<(), S>
where
    S: ParserState<Item = char>,
{
    element('\r')
        .skip(element('\n'))
        .or(element('\n'))
        .map(|_| ())
}

/// One line-break-terminated record.
///
/// This is the unit the lazy streams repeat: it always consumes its line
/// break, so repetition cannot spin on an empty match. A final record
/// without a trailing break is not a `row`; the batch entry points accept
/// one, the streams do not.
pub fn row<S>() -> Parser<Vec<String>, S>
where
    S: ParserState<Item = char>,
{
    record().skip(newline())
}

/// Every record in the input, with nothing left over.
///
/// A trailing line break does not produce a final empty record.
pub fn document<S>() -> Parser<Vec<Vec<String>>, S>
where
    S: ParserState<Item = char>,
{
    record()
        .and_then(|first: Vec<String>| {
            many(newline().then(record())).map(move |rest| {
                let mut rows = vec![first.clone()];
                rows.extend(rest);
                rows
            })
        })
        .map(|mut rows: Vec<Vec<String>>| {
            if rows
                .last()
                .is_some_and(|last| last.len() == 1 && last[0].is_empty())
            {
                rows.pop();
            }
            rows
        })
        .skip(eof())
}

/// Parses a whole document into raw rows.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    document()
        .parse(State::new(SliceInput::from(text), ()))
        .into_result()
        .map(|(rows, _)| rows)
        .map_err(|(err, _)| err.into())
}

/// Parses a document and splits off its header row.
pub fn parse_table(text: &str) -> Result<Table, CsvError> {
    Table::from_rows(parse_rows(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<Vec<String>> {
        parse_rows(text).unwrap()
    }

    fn row_of(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_bare_fields() {
        assert_eq!(rows("a,b,c"), vec![row_of(&["a", "b", "c"])]);
    }

    #[test]
    fn test_parse_multiple_rows() {
        assert_eq!(
            rows("a,b\nc,d\n"),
            vec![row_of(&["a", "b"]), row_of(&["c", "d"])]
        );
    }

    #[test]
    fn test_trailing_line_break_adds_no_row() {
        assert_eq!(rows("a\nb"), rows("a\nb\n"));
    }

    #[test]
    fn test_empty_input_is_an_empty_document() {
        assert_eq!(rows(""), Vec::<Vec<String>>::new());
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(rows("a,,c"), vec![row_of(&["a", "", "c"])]);
        assert_eq!(rows("a,b,"), vec![row_of(&["a", "b", ""])]);
        assert_eq!(rows(",a"), vec![row_of(&["", "a"])]);
    }

    #[test]
    fn test_blank_line_is_a_single_empty_field() {
        assert_eq!(
            rows("a\n\nb\n"),
            vec![row_of(&["a"]), row_of(&[""]), row_of(&["b"])]
        );
        assert_eq!(rows("\na\n"), vec![row_of(&[""]), row_of(&["a"])]);
    }

    #[test]
    fn test_quoted_field_with_comma() {
        assert_eq!(rows("\"a,b\",c"), vec![row_of(&["a,b", "c"])]);
    }

    #[test]
    fn test_quoted_field_with_line_break() {
        assert_eq!(
            rows("\"line one\nline two\",x\n"),
            vec![row_of(&["line one\nline two", "x"])]
        );
    }

    #[test]
    fn test_doubled_quotes_unescape() {
        assert_eq!(rows("\"a\"\"b\""), vec![row_of(&["a\"b"])]);
        assert_eq!(rows("\"\"\"\""), vec![row_of(&["\""])]);
        assert_eq!(rows("\"\""), vec![row_of(&[""])]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            rows("a,b\r\nc,d\r\n"),
            vec![row_of(&["a", "b"]), row_of(&["c", "d"])]
        );
    }

    #[test]
    fn test_bare_carriage_return_is_rejected() {
        let err = parse_rows("a\rb").unwrap_err();
        assert_eq!(err.to_string(), "unexpected 'b' at 2");
    }

    #[test]
    fn test_unclosed_quote_is_rejected() {
        let err = parse_rows("\"abc").unwrap_err();
        assert_eq!(err.to_string(), "unexpected end of input at 4");
    }

    #[test]
    fn test_stray_quote_after_a_bare_field_is_rejected() {
        let err = parse_rows("ab\"cd").unwrap_err();
        assert_eq!(err.to_string(), "unexpected '\"' at 2");
    }

    #[test]
    fn test_parse_table_splits_the_header() {
        let table = parse_table("name,age\nAlice,30\nBob,25\n").unwrap();
        assert_eq!(table.header, row_of(&["name", "age"]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "name"), Some("Bob"));
    }

    #[test]
    fn test_parse_table_requires_a_header() {
        assert_eq!(parse_table(""), Err(CsvError::MissingHeader));
    }

    #[test]
    fn test_parse_table_rejects_ragged_rows() {
        assert_eq!(
            parse_table("a,b\n1\n"),
            Err(CsvError::Ragged {
                row: 2,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_row_requires_its_line_break() {
        let reply = row().parse(State::new(SliceInput::from("a,b"), ()));
        assert!(reply.error().is_some());

        let reply = row().parse(State::new(SliceInput::from("a,b\nrest"), ()));
        assert_eq!(reply.value(), Some(&row_of(&["a", "b"])));
    }
}
