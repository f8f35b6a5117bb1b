//! Round-trip tests: parse CSV, write it back, compare

use csv_stream::grammar::{parse_rows, parse_table};
use csv_stream::print::write_rows;

fn roundtrip(input: &str) -> String {
    write_rows(&parse_rows(input).unwrap())
}

#[test]
fn test_roundtrip_plain_rows() {
    assert_eq!(roundtrip("a,b\nc,d\n"), "a,b\nc,d\n");
}

#[test]
fn test_roundtrip_terminates_the_final_row() {
    assert_eq!(roundtrip("a,b"), "a,b\n");
}

#[test]
fn test_roundtrip_normalizes_crlf() {
    assert_eq!(roundtrip("a\r\nb\r\n"), "a\nb\n");
}

#[test]
fn test_roundtrip_keeps_escaped_quotes() {
    let input = "id,quote\n1,\"say \"\"hi\"\"\"\n";
    assert_eq!(roundtrip(input), input);
}

#[test]
fn test_roundtrip_keeps_quoted_line_breaks() {
    let input = "1,\"two\nlines\"\n";
    assert_eq!(roundtrip(input), input);
}

#[test]
fn test_quotes_are_dropped_when_not_needed() {
    // "plain" needs no quoting once parsed, so it comes back bare
    assert_eq!(roundtrip("\"plain\",b\n"), "plain,b\n");
}

#[test]
fn test_write_then_parse_is_identity() {
    let rows = vec![
        vec!["name".to_string(), "note".to_string()],
        vec!["Jane, R.".to_string(), "said \"ok\"".to_string()],
        vec![String::new(), "two\nlines".to_string()],
    ];
    assert_eq!(parse_rows(&write_rows(&rows)).unwrap(), rows);
}

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[test]
    fn snapshot_table_display() {
        let table = parse_table("name,age\nAlice,30\nBob,25\n").unwrap();
        insta::assert_snapshot!(table.to_string().trim_end(), @r"
        name,age
        Alice,30
        Bob,25
        ");
    }

    #[test]
    fn snapshot_quoting_on_display() {
        let table = parse_table("id,note\n1,\"say \"\"hi\"\"\"\n2,\"a,b\"\n").unwrap();
        insta::assert_snapshot!(table.to_string().trim_end(), @r#"
        id,note
        1,"say ""hi"""
        2,"a,b"
        "#);
    }

    #[test]
    fn snapshot_written_rows() {
        let output = roundtrip("a,\"b\nc\",d\nlast,,\n");
        insta::assert_snapshot!(output.trim_end(), @r#"
        a,"b
        c",d
        last,,
        "#);
    }
}
