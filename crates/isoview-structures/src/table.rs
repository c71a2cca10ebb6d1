//! Column-oriented numeric tables read from text.
//!
//! The format is a header line naming the columns followed by one line of
//! numbers per row:
//!
//! ```text
//!   x    y    z    r
//!  0.0  0.0  0.0  0.1
//!  1.0  0.0  0.0  0.1
//! ```
//!
//! Values may be separated by whitespace or commas. Blank lines and lines
//! whose first token is `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use isoview_core::error::{IsoviewError, Result};

/// A table of named numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    keys: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// Reads a table from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| data_source(&source, e.to_string()))?;
        Self::from_reader(BufReader::new(file), &source)
    }

    /// Reads a table from any buffered reader. `source` names the input in errors.
    pub fn from_reader(reader: impl BufRead, source: &str) -> Result<Self> {
        let mut table: Option<Self> = None;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| data_source(source, e.to_string()))?;
            let fields: Vec<&str> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .collect();
            if fields.is_empty() || fields[0] == "#" {
                continue;
            }

            if table.is_none() {
                table = Some(Self {
                    keys: fields.iter().map(|s| (*s).to_string()).collect(),
                    columns: vec![Vec::new(); fields.len()],
                });
                continue;
            }
            let Some(table) = table.as_mut() else {
                continue;
            };

            if fields.len() != table.keys.len() {
                return Err(data_source(
                    source,
                    format!(
                        "line {}: expected {} values, found {}",
                        lineno + 1,
                        table.keys.len(),
                        fields.len()
                    ),
                ));
            }
            for (column, field) in table.columns.iter_mut().zip(&fields) {
                let value = field.parse::<f64>().map_err(|_| {
                    data_source(source, format!("line {}: invalid number '{field}'", lineno + 1))
                })?;
                column.push(value);
            }
        }

        table.ok_or_else(|| data_source(source, "missing header line".to_string()))
    }

    /// Returns the column names in file order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the values of a column.
    pub fn column(&self, key: &str) -> Option<&[f64]> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.columns[i].as_slice())
    }

    /// Returns the number of data rows.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

pub(crate) fn data_source(path: &str, reason: String) -> IsoviewError {
    IsoviewError::DataSource {
        path: path.to_string(),
        reason,
    }
}
