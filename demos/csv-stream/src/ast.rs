//! Header-aware views over parsed rows.

use crate::CsvError;

/// A parsed CSV document with its header row split off.
///
/// Construction validates that every data row has the header's width, so a
/// `Table` is rectangular by invariant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table from raw rows, taking the first as the header.
    ///
    /// Row numbers in errors count the header as row 1.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Result<Self, CsvError> {
        if rows.is_empty() {
            return Err(CsvError::MissingHeader);
        }
        let header = rows.remove(0);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(CsvError::Ragged {
                    row: index + 2,
                    expected: header.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { header, rows })
    }

    /// The index of a named column, if the header has it.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|col| col == name)
    }

    /// One cell, addressed by data row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        self.rows.get(row).map(|fields| fields[col].as_str())
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the data rows as header-aware records.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|fields| Record {
            header: &self.header,
            fields,
        })
    }
}

/// One data row viewed through the table's header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    header: &'a [String],
    fields: &'a [String],
}

impl<'a> Record<'a> {
    /// The field under a named column.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        let col = self.header.iter().position(|col| col == name)?;
        self.fields.get(col).map(String::as_str)
    }

    pub fn fields(&self) -> &'a [String] {
        self.fields
    }
}
