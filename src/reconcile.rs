//! Composite-key reconciliation: inner join, first-wins dedup, and
//! allowed-category filtering.
//!
//! The join matches a left and a right row when every key column agrees
//! exactly. Output columns are the left columns in order followed by the right
//! side's non-key columns; same-named survivors are disambiguated by the
//! configured [`CollisionPolicy`] rather than overwritten.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{
    config::{CategoryFilter, CollisionMode, CollisionPolicy},
    error::{PipelineError, PipelineWarning, SourceMissing},
    recordset::RecordSet,
};

/// Joins composite key values into one hashable string. The unit separator
/// cannot appear in CSV text fields, so distinct tuples stay distinct.
const KEY_SEPARATOR: &str = "\u{1f}";

#[derive(Debug, Clone)]
pub struct JoinOptions {
    pub key_columns: Vec<String>,
    pub collision: CollisionPolicy,
    pub category: Option<CategoryFilter>,
}

/// Runs join, dedup, and category filter over two normalized sets.
///
/// Missing key columns are an error; everything downstream of the join
/// degrades to an explicitly empty (but well-formed) result instead.
pub fn reconcile(
    left: &RecordSet,
    right: &RecordSet,
    options: &JoinOptions,
) -> Result<(RecordSet, Option<PipelineWarning>), PipelineError> {
    let left_keys = key_indices(left, &options.key_columns, "left")?;
    let right_keys = key_indices(right, &options.key_columns, "right")?;

    let columns = output_columns(left, right, &left_keys, &right_keys, &options.collision);
    let joined = join(left, right, &left_keys, &right_keys);
    debug!("join produced {} candidate row(s)", joined.len());

    let deduped = dedup_first(joined);
    let (rows, warning) = filter_category(deduped, &columns, options.category.as_ref());

    Ok((RecordSet { columns, rows }, warning))
}

fn key_indices(
    set: &RecordSet,
    key_columns: &[String],
    side: &str,
) -> Result<Vec<usize>, PipelineError> {
    let missing = set.missing_columns(key_columns);
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns(vec![SourceMissing {
            source: side.to_string(),
            columns: missing,
        }]));
    }
    Ok(key_columns
        .iter()
        .filter_map(|name| set.column_index(name))
        .collect())
}

/// Inner join in left-row order; each emitted row carries its key tuple so the
/// dedup pass does not have to re-derive it.
fn join(
    left: &RecordSet,
    right: &RecordSet,
    left_keys: &[usize],
    right_keys: &[usize],
) -> Vec<(String, Vec<String>)> {
    let mut right_lookup: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in right.rows.iter().enumerate() {
        right_lookup
            .entry(build_key(row, right_keys))
            .or_default()
            .push(idx);
    }

    let right_columns = non_key_columns(right, right_keys);
    let mut emitted = Vec::new();
    for row in &left.rows {
        let key = build_key(row, left_keys);
        let Some(bucket) = right_lookup.get(&key) else {
            continue;
        };
        for &right_idx in bucket {
            let right_row = &right.rows[right_idx];
            let mut combined = row.clone();
            combined.extend(
                right_columns
                    .iter()
                    .map(|&idx| right_row.get(idx).cloned().unwrap_or_default()),
            );
            emitted.push((key.clone(), combined));
        }
    }
    emitted
}

fn build_key(row: &[String], key_indices: &[usize]) -> String {
    key_indices
        .iter()
        .map(|&idx| row.get(idx).map(String::as_str).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

fn non_key_columns(set: &RecordSet, key_indices: &[usize]) -> Vec<usize> {
    (0..set.columns.len())
        .filter(|idx| !key_indices.contains(idx))
        .collect()
}

/// First occurrence per key tuple wins, in emission order.
fn dedup_first(joined: Vec<(String, Vec<String>)>) -> Vec<Vec<String>> {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(joined.len());
    for (key, row) in joined {
        if seen.insert(key) {
            rows.push(row);
        }
    }
    rows
}

fn filter_category(
    rows: Vec<Vec<String>>,
    columns: &[String],
    category: Option<&CategoryFilter>,
) -> (Vec<Vec<String>>, Option<PipelineWarning>) {
    let Some(filter) = category else {
        return (rows, None);
    };
    let Some(idx) = columns.iter().position(|c| c == &filter.column) else {
        return (
            rows,
            Some(PipelineWarning::CategoryColumnMissing {
                column: filter.column.clone(),
            }),
        );
    };
    let allowed: HashSet<&str> = filter.allowed.iter().map(String::as_str).collect();
    let kept = rows
        .into_iter()
        .filter(|row| {
            row.get(idx)
                .is_some_and(|value| allowed.contains(value.as_str()))
        })
        .collect();
    (kept, None)
}

/// Output header layout: every left column in order, then the right side's
/// non-key columns, renamed as the collision policy dictates.
fn output_columns(
    left: &RecordSet,
    right: &RecordSet,
    left_keys: &[usize],
    right_keys: &[usize],
    policy: &CollisionPolicy,
) -> Vec<String> {
    let right_non_key: Vec<&String> = non_key_columns(right, right_keys)
        .into_iter()
        .map(|idx| &right.columns[idx])
        .collect();

    let mut columns: Vec<String> = Vec::with_capacity(left.columns.len() + right_non_key.len());
    for (idx, name) in left.columns.iter().enumerate() {
        // Key columns appear once under their own name; only non-key
        // collisions are eligible for tagging.
        let collides = !left_keys.contains(&idx) && right_non_key.iter().any(|r| *r == name);
        if matches!(policy.mode, CollisionMode::TagBoth) && collides {
            columns.push(format!("{name}_{}", policy.left_tag));
        } else {
            columns.push(name.clone());
        }
    }

    let mut seen: HashSet<String> = columns.iter().cloned().collect();
    for name in right_non_key {
        let mut candidate = if seen.contains(name) {
            format!("{name}_{}", policy.right_tag)
        } else {
            name.clone()
        };
        let mut counter = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{name}_{}_{counter}", policy.right_tag);
            counter += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}
