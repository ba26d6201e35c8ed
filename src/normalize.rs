//! Schema normalization: required-column validation, literal value
//! replacements, and whitespace trimming.
//!
//! Replacement rules substitute every case-insensitive occurrence of a literal
//! substring (never a pattern) inside the cells of one column. Matching folds
//! case per character, so values that only differ by letter case are rewritten
//! the same way.

use crate::{config::ReplacementRule, recordset::RecordSet};

/// Validates `required` against the set's columns and applies replacement
/// rules plus a full-width trim.
///
/// On failure the names of the missing columns are returned so the caller can
/// merge failures from several sources into one report.
pub fn normalize(
    set: &RecordSet,
    required: &[String],
    rules: &[ReplacementRule],
) -> Result<RecordSet, Vec<String>> {
    let missing = set.missing_columns(required);
    if !missing.is_empty() {
        return Err(missing);
    }

    let mut rows = Vec::with_capacity(set.rows.len());
    for row in &set.rows {
        // Short rows pad out to the column count so later stages can index
        // cells without bounds checks failing.
        let mut cells: Vec<String> = (0..set.columns.len())
            .map(|idx| row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default())
            .collect();
        for rule in rules {
            if let Some(idx) = set.columns.iter().position(|c| c == &rule.column) {
                let replaced = replace_ci(&cells[idx], &rule.from, &rule.to);
                cells[idx] = replaced;
            }
        }
        for cell in &mut cells {
            let trimmed = cell.trim();
            if trimmed.len() != cell.len() {
                *cell = trimmed.to_string();
            }
        }
        rows.push(cells);
    }

    Ok(RecordSet {
        columns: set.columns.clone(),
        rows,
    })
}

/// Replaces every case-insensitive occurrence of `needle` in `haystack` with
/// `replacement`. The needle is a literal substring.
pub fn replace_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    let mut out = String::with_capacity(haystack.len());
    let mut idx = 0;
    while idx < haystack.len() {
        if let Some(len) = ci_prefix_len(&haystack[idx..], needle) {
            out.push_str(replacement);
            idx += len;
        } else if let Some(ch) = haystack[idx..].chars().next() {
            out.push(ch);
            idx += ch.len_utf8();
        } else {
            break;
        }
    }
    out
}

/// Byte length of the prefix of `haystack` matching `needle` case-insensitively,
/// or `None` when it does not match.
fn ci_prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut len = 0;
    let mut hay = haystack.chars();
    for nc in needle.chars() {
        let hc = hay.next()?;
        if !chars_eq_ci(hc, nc) {
            return None;
        }
        len += hc.len_utf8();
    }
    Some(len)
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
