//! Stress tests for the chunk-fed reader.
//!
//! These push one session through tens of thousands of suspensions and
//! verify that:
//! - chunked feeding agrees with batch parsing for every split tried
//! - deep nesting and large arrays resolve without blowing the stack
//! - the lazy record stream pays only for the records consumed

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use jsonl_parser::grammar::{Direct, parse_document, parse_value, value};
use jsonl_parser::stream::{JsonReader, read_chunks};
use jsonl_parser::JsonValue;
use parsume::run_many;

const SAMPLE_OBJECTS: [&str; 5] = [
    r#"{"type": "simple", "value": 1}"#,
    r#"{"type": "nested", "data": {"inner": true}}"#,
    r#"{"type": "array", "items": [1, 2, 3, 4, 5]}"#,
    r#"{"type": "complex", "users": [{"name": "a"}, {"name": "b"}], "count": 2}"#,
    r#"{"type": "string", "text": "hello world with some longer text content here"}"#,
];

fn make_jsonl(count: usize) -> String {
    let mut text = String::new();
    for i in 0..count {
        text.push_str(SAMPLE_OBJECTS[i % SAMPLE_OBJECTS.len()]);
        text.push('\n');
    }
    text
}

fn feed_in_chunks(text: &str, chunk_size: usize) -> Vec<JsonValue> {
    let chunks = text
        .as_bytes()
        .chunks(chunk_size)
        .map(|chunk| std::str::from_utf8(chunk).unwrap());
    read_chunks(chunks).unwrap()
}

#[test]
fn test_many_records_through_one_session() {
    let count = 50_000;
    let text = make_jsonl(count);

    let start = Instant::now();
    let mut reader = JsonReader::new();
    for chunk in text.as_bytes().chunks(4096) {
        reader = reader.feed(std::str::from_utf8(chunk).unwrap()).unwrap();
    }
    let records = reader.finish().unwrap();
    let elapsed = start.elapsed();

    let rate = count as f64 / elapsed.as_secs_f64();
    eprintln!(
        "Parsed {} records in {:?} ({:.0} records/sec)",
        count, elapsed, rate
    );

    assert_eq!(records.len(), count);
    assert_eq!(
        records[0].get("type").and_then(JsonValue::as_str),
        Some("simple")
    );
    assert_eq!(
        records[count - 1].get("type").and_then(JsonValue::as_str),
        Some("string")
    );
}

#[test]
fn test_varied_record_shapes() {
    let count = 10_000;
    let records = feed_in_chunks(&make_jsonl(count), 4096);

    assert_eq!(records.len(), count);
    for (i, record) in records.iter().enumerate() {
        let object = record.as_object().unwrap_or_else(|| {
            panic!("expected an object at record {}", i);
        });
        assert!(object.contains_key("type"), "record {} lacks a type", i);
    }
}

#[test]
fn test_any_chunk_size_matches_batch() {
    let text = make_jsonl(200);
    let batch = parse_document(&text).unwrap();

    // Sizes chosen to split mid-token, mid-string, and mid-line.
    for chunk_size in [7, 13, 31, 64, 127] {
        let records = feed_in_chunks(&text, chunk_size);
        assert_eq!(records, batch, "mismatch for chunk_size {}", chunk_size);
    }
}

#[test]
fn test_empty_and_whitespace_lines() {
    let inputs = ["{}\n", "{}\n\n", "{}\n  \n", "\n{}\n", "{}\n\n{}\n\n{}\n"];

    for (idx, input) in inputs.iter().enumerate() {
        let records = read_chunks([*input]).unwrap();
        let expected = input.lines().filter(|line| line.trim() == "{}").count();
        assert_eq!(records.len(), expected, "input {}: {:?}", idx, input);
    }
}

#[test]
fn test_deeply_nested_records() {
    fn make_nested(depth: usize) -> String {
        let mut text = String::new();
        for _ in 0..depth {
            text.push_str(r#"{"inner": "#);
        }
        text.push('1');
        for _ in 0..depth {
            text.push('}');
        }
        text.push('\n');
        text
    }

    for depth in [10, 50, 100] {
        let text = make_nested(depth);
        let batch = parse_value(text.trim_end()).unwrap();
        let chunked = feed_in_chunks(&text, 16);
        assert_eq!(chunked.len(), 1, "depth {}", depth);
        assert_eq!(chunked[0], batch, "depth {}", depth);

        let mut cursor = &chunked[0];
        for _ in 0..depth {
            cursor = cursor.get("inner").unwrap_or_else(|| {
                panic!("missing inner at depth {}", depth);
            });
        }
        assert_eq!(*cursor, JsonValue::Number("1".into()));
    }
}

#[test]
fn test_large_arrays() {
    fn make_array(size: usize) -> String {
        let items: Vec<String> = (0..size).map(|i| i.to_string()).collect();
        format!("{{\"data\": [{}]}}", items.join(", "))
    }

    for size in [100, 1000, 10_000] {
        let line = make_array(size);
        let record = parse_value(&line).unwrap();
        assert_eq!(
            record.get("data").and_then(JsonValue::len),
            Some(size),
            "array size {}",
            size
        );
    }

    // One line much larger than the chunk size: the feeder buffers the
    // whole line, then the session takes it as a single token chunk.
    let line = make_array(10_000);
    let text = format!("{}\n", line);
    let records = feed_in_chunks(&text, 4096);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("data").and_then(JsonValue::len), Some(10_000));
}

#[test]
fn test_lazy_stream_pays_per_record() {
    let count = 10_000;
    let text = make_jsonl(count);
    let tokens = jsonl_parser::lex(&text).unwrap();

    let runs = Rc::new(Cell::new(0usize));
    let counted = {
        let runs = Rc::clone(&runs);
        value::<Direct>().map(move |record| {
            runs.set(runs.get() + 1);
            record
        })
    };

    let stream = run_many(counted, tokens, ());
    assert_eq!(runs.get(), 0);

    let mut iter = stream.into_iter();
    for _ in 0..10 {
        iter.next().unwrap().unwrap();
    }
    assert_eq!(runs.get(), 10);

    let rest = iter.count();
    assert_eq!(rest, count - 10);
    assert_eq!(runs.get(), count);
}

#[test]
fn test_memory_estimation() {
    let test_cases = [
        ("null", "null"),
        ("true", "bool"),
        ("42", "number"),
        (r#""hello""#, "string"),
        ("[]", "empty array"),
        ("[1, 2, 3]", "array"),
        ("{}", "empty object"),
        (r#"{"a": 1, "b": 2}"#, "object"),
    ];

    for (json, desc) in test_cases {
        let record = parse_value(json).unwrap();
        let size = record.estimated_size();
        assert!(size > 0, "size should be > 0 for {}", desc);
        assert!(size < 10_000, "size should be < 10KB for simple {}", desc);
        eprintln!("{}: {} bytes (estimated)", desc, size);
    }
}
