//! Minimal comma-separated table reader.
//!
//! Quoting is not supported: a comma always separates fields.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n").expect("regex should compile"));

const BOM: char = '\u{feff}';

/// One data line keyed by header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    /// Cell text for `column`, or `None` when the row was too short.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Cell text for `column` when present and non-empty.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Parsed table: header list plus header-indexed rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Parses raw delimited text. Fewer than two lines yields an empty table.
pub fn parse(text: &str) -> Table {
    let text = text.trim_start_matches(BOM).trim();
    let lines: Vec<&str> = LINE_BREAK_RE.split(text).collect();
    if lines.len() < 2 {
        return Table::default();
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|header| header.trim().to_owned())
        .collect();

    let rows = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            headers
                .iter()
                .zip(line.split(',').map(str::trim))
                .map(|(header, cell)| (header.clone(), cell.to_owned()))
                .collect::<Row>()
        })
        .collect();

    Table { headers, rows }
}
