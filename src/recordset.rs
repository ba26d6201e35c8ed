//! In-memory tabular record sets.
//!
//! A [`RecordSet`] is an ordered list of named columns plus an ordered list of
//! string rows. Every pipeline stage consumes a set and returns a new one;
//! nothing mutates a set another stage still holds.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column names from `wanted` that are not present in this set.
    pub fn missing_columns(&self, wanted: &[String]) -> Vec<String> {
        wanted
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .cloned()
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A record set paired with the identity of the source it was read from.
///
/// The source id (typically a file stem) travels with the data so schema
/// failures and batch summaries can name the offending input.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub id: String,
    pub records: RecordSet,
}

impl SourceSet {
    pub fn new(id: impl Into<String>, records: RecordSet) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }
}
