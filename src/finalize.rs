//! Final relabeling: column renames plus the leading ordinal column.

use crate::{config::RenameRule, recordset::RecordSet};

/// Applies the rename map and inserts a leading 1-based ordinal column.
///
/// Rename entries whose old name is absent are silently ignored. An existing
/// column carrying the ordinal name is dropped first so output tables can be
/// fed back through the pipeline without accumulating ordinal columns. The
/// ordinal goes in last of all transforms; it always reflects the order the
/// caller sees.
pub fn finalize(set: RecordSet, renames: &[RenameRule], ordinal_column: &str) -> RecordSet {
    let mut columns = set.columns;
    let mut rows = set.rows;

    for rule in renames {
        if let Some(idx) = columns.iter().position(|c| c == &rule.from) {
            columns[idx] = rule.to.clone();
        }
    }

    if let Some(stale) = columns.iter().position(|c| c == ordinal_column) {
        columns.remove(stale);
        for row in &mut rows {
            if stale < row.len() {
                row.remove(stale);
            }
        }
    }

    columns.insert(0, ordinal_column.to_string());
    for (idx, row) in rows.iter_mut().enumerate() {
        row.insert(0, (idx + 1).to_string());
    }

    RecordSet { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(from: &str, to: &str) -> RenameRule {
        RenameRule {
            from: from.into(),
            to: to.into(),
        }
    }

    fn set(columns: &[&str], rows: &[&[&str]]) -> RecordSet {
        RecordSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn renames_existing_columns_and_ignores_unknown_ones() {
        let input = set(&["status", "unit"], &[&["open", "A"]]);
        let out = finalize(input, &[rule("status", "state"), rule("ghost", "x")], "row");
        assert_eq!(out.columns, vec!["row", "state", "unit"]);
    }

    #[test]
    fn inserts_one_based_ordinals_in_final_order() {
        let input = set(&["v"], &[&["a"], &["b"], &["c"]]);
        let out = finalize(input, &[], "No");
        assert_eq!(out.rows[0], vec!["1", "a"]);
        assert_eq!(out.rows[2], vec!["3", "c"]);
    }

    #[test]
    fn replaces_a_stale_ordinal_column() {
        let input = set(&["No", "v"], &[&["9", "a"], &["4", "b"]]);
        let out = finalize(input, &[], "No");
        assert_eq!(out.columns, vec!["No", "v"]);
        assert_eq!(out.rows, vec![vec!["1", "a"], vec!["2", "b"]]);
    }

    #[test]
    fn empty_table_still_gains_the_ordinal_header() {
        let input = set(&["v"], &[]);
        let out = finalize(input, &[], "No");
        assert_eq!(out.columns, vec!["No", "v"]);
        assert!(out.is_empty());
    }
}
