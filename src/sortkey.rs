//! Structured sort keys parsed from `year/sequence` identifiers.
//!
//! An identifier such as `2023/45` splits on the first `/` into a year and a
//! sequence. The sequence keeps only its digits before parsing, so `45-1`
//! reads as `451`; callers downstream rely on that exact concatenation.
//! Unparseable components become nulls and nulls order after every real value.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use crate::{config::SortSpec, error::PipelineWarning, recordset::RecordSet};

static NON_DIGITS: OnceLock<Regex> = OnceLock::new();

fn non_digits() -> &'static Regex {
    NON_DIGITS.get_or_init(|| Regex::new("[^0-9]").expect("valid literal class"))
}

/// Splits `identifier` into `(year, sequence)`; either side is `None` when it
/// cannot be read as an integer.
pub fn parse_identifier(identifier: &str) -> (Option<i64>, Option<i64>) {
    let (year_part, seq_part) = match identifier.split_once('/') {
        Some((year, seq)) => (year, Some(seq)),
        None => (identifier, None),
    };
    let year = year_part.trim().parse::<i64>().ok();
    let sequence = seq_part.and_then(|part| {
        let digits = non_digits().replace_all(part, "");
        if digits.is_empty() {
            None
        } else {
            digits.parse::<i64>().ok()
        }
    });
    (year, sequence)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RowKey {
    group: Option<String>,
    year: Option<i64>,
    sequence: Option<i64>,
}

impl RowKey {
    fn compare(&self, other: &Self) -> Ordering {
        self.group
            .cmp(&other.group)
            .then(cmp_nulls_last(self.year, other.year))
            .then(cmp_nulls_last(self.sequence, other.sequence))
    }
}

/// Ascending order with `None` after every `Some`, matching the pipeline's
/// nulls-last contract (the inverse of `Option`'s derived ordering).
fn cmp_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders rows by `(group, year, sequence)` with the documented fallbacks:
/// group-only ordering when the identifier column is unusable, original order
/// when the group column is also unavailable. Ties keep their incoming order.
pub fn sort_rows(set: RecordSet, spec: &SortSpec) -> (RecordSet, Option<PipelineWarning>) {
    if set.rows.is_empty() {
        return (set, None);
    }

    let group_idx = spec
        .group_column
        .as_deref()
        .and_then(|name| set.column_index(name));
    let identifier_idx = spec
        .identifier_column
        .as_deref()
        .and_then(|name| set.column_index(name));

    let keys: Option<Vec<RowKey>> = identifier_idx.map(|idx| {
        set.rows
            .iter()
            .map(|row| {
                let (year, sequence) =
                    parse_identifier(row.get(idx).map(String::as_str).unwrap_or(""));
                RowKey {
                    group: group_idx.map(|g| row.get(g).cloned().unwrap_or_default()),
                    year,
                    sequence,
                }
            })
            .collect()
    });

    // The identifier column only counts when at least one row yields a year;
    // otherwise ordering falls back to the group column alone.
    let usable_keys = keys.filter(|keys| keys.iter().any(|k| k.year.is_some()));

    if let Some(keys) = usable_keys {
        let mut decorated: Vec<(RowKey, Vec<String>)> =
            keys.into_iter().zip(set.rows).collect();
        decorated.sort_by(|(a, _), (b, _)| a.compare(b));
        let rows = decorated.into_iter().map(|(_, row)| row).collect();
        return (
            RecordSet {
                columns: set.columns,
                rows,
            },
            None,
        );
    }

    if let Some(group_idx) = group_idx {
        let mut rows = set.rows;
        rows.sort_by(|a, b| {
            a.get(group_idx)
                .map(String::as_str)
                .unwrap_or("")
                .cmp(b.get(group_idx).map(String::as_str).unwrap_or(""))
        });
        let warning = PipelineWarning::SortFellBackToGroup {
            group_column: spec
                .group_column
                .clone()
                .unwrap_or_default(),
        };
        return (
            RecordSet {
                columns: set.columns,
                rows,
            },
            Some(warning),
        );
    }

    (set, Some(PipelineWarning::SortSkipped))
}
