//! Canonical CSV output.
//!
//! Fields are quoted only when they need it, quotes are doubled, and rows
//! end in a bare LF. Writing a parsed document back therefore normalizes
//! CRLF endings and redundant quoting.

use core::fmt;

use crate::ast::Table;

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        for c in field.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Renders one row without a line ending.
pub fn write_row(fields: &[String]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(&mut out, field);
    }
    out
}

/// Renders rows with a trailing LF per row.
pub fn write_rows(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&write_row(row));
        out.push('\n');
    }
    out
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", write_row(&self.header))?;
        for row in &self.rows {
            writeln!(f, "{}", write_row(row))?;
        }
        Ok(())
    }
}
