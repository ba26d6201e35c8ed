//! The canonical per-pair pipeline: normalize both sources, reconcile, sort,
//! relabel, and lay the result out on the configured page.
//!
//! The pipeline is pure and re-entrant. It owns no state between runs and
//! performs no I/O; a driver hands it two in-memory record sets and receives a
//! per-pair result or error, never an aborted batch.

use log::{info, warn};

use crate::{
    config::RunConfig,
    error::{PipelineError, PipelineWarning, SourceMissing},
    finalize::finalize,
    layout::{self, PageGeometry},
    normalize::normalize,
    reconcile::{JoinOptions, reconcile},
    recordset::{RecordSet, SourceSet},
    sortkey::sort_rows,
};

/// Result of one dataset pair: the render-ready table, its width plan, the
/// page it was planned for, and every warning raised along the way.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub table: RecordSet,
    pub widths: Vec<f64>,
    pub geometry: PageGeometry,
    pub warnings: Vec<PipelineWarning>,
}

impl PairOutcome {
    /// True when no rows survived the join and filter. Still a valid result;
    /// the table keeps its full header row.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

pub fn run_pair(
    config: &RunConfig,
    left: &SourceSet,
    right: &SourceSet,
) -> Result<PairOutcome, PipelineError> {
    let geometry = config.page.geometry();
    geometry.validate()?;

    let left_normalized = normalize(&left.records, &config.key_columns, &config.replacements);
    let right_normalized = normalize(&right.records, &config.key_columns, &config.replacements);
    let (left_normalized, right_normalized) = match (left_normalized, right_normalized) {
        (Ok(left), Ok(right)) => (left, right),
        (left_result, right_result) => {
            let mut failures = Vec::new();
            if let Err(columns) = left_result {
                failures.push(SourceMissing {
                    source: left.id.clone(),
                    columns,
                });
            }
            if let Err(columns) = right_result {
                failures.push(SourceMissing {
                    source: right.id.clone(),
                    columns,
                });
            }
            return Err(PipelineError::MissingColumns(failures));
        }
    };

    let mut warnings = Vec::new();

    let options = JoinOptions {
        key_columns: config.key_columns.clone(),
        collision: config.collision.clone(),
        category: config.category.clone(),
    };
    let (merged, warning) = reconcile(&left_normalized, &right_normalized, &options)?;
    record(&mut warnings, warning);
    info!(
        "{} vs {}: {} common record(s) after join and filter",
        left.id,
        right.id,
        merged.len()
    );

    let (sorted, warning) = sort_rows(merged, &config.sort);
    record(&mut warnings, warning);

    let table = finalize(sorted, &config.renames, &config.ordinal_column);

    let (widths, warning) = layout::allocate(
        &table.columns,
        &table.rows,
        geometry.content_width(),
        &config.widths.constraints(),
    );
    record(&mut warnings, warning);

    Ok(PairOutcome {
        table,
        widths,
        geometry,
        warnings,
    })
}

fn record(warnings: &mut Vec<PipelineWarning>, warning: Option<PipelineWarning>) {
    if let Some(warning) = warning {
        warn!("{warning}");
        warnings.push(warning);
    }
}
