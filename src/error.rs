//! Error and warning taxonomy for the reconciliation pipeline.
//!
//! Errors are fatal for one dataset pair only; the batch driver keeps going.
//! Warnings describe recovered degradations and accumulate, append-only, in the
//! pair outcome alongside being logged.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required column(s): {}", format_missing(.0))]
    MissingColumns(Vec<SourceMissing>),
    #[error(
        "page margins do not fit the page: left+right {horizontal:.1}pt vs width {width:.1}pt, top+bottom {vertical:.1}pt vs height {height:.1}pt"
    )]
    InvalidGeometry {
        width: f64,
        height: f64,
        horizontal: f64,
        vertical: f64,
    },
}

/// Missing required columns for one input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMissing {
    pub source: String,
    pub columns: Vec<String>,
}

fn format_missing(failures: &[SourceMissing]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.source, f.columns.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// Category column absent from the joined schema; filtering was skipped.
    CategoryColumnMissing { column: String },
    /// Identifier column missing or no row produced a year; sorted by the
    /// group column instead.
    SortFellBackToGroup { group_column: String },
    /// Neither identifier nor group column usable; rows keep their join order.
    SortSkipped,
    /// The min/max bounds make the width target unreachable; widths were
    /// clamped after a single correction pass.
    LayoutInfeasible {
        target: f64,
        minimum_total: f64,
        maximum_total: f64,
    },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::CategoryColumnMissing { column } => {
                write!(f, "category column '{column}' not found, filtering skipped")
            }
            PipelineWarning::SortFellBackToGroup { group_column } => {
                write!(f, "identifier sort unavailable, sorted by '{group_column}' only")
            }
            PipelineWarning::SortSkipped => {
                write!(f, "no sortable column available, rows kept in join order")
            }
            PipelineWarning::LayoutInfeasible {
                target,
                minimum_total,
                maximum_total,
            } => write!(
                f,
                "width target {target:.1}pt outside feasible range [{minimum_total:.1}, {maximum_total:.1}]pt"
            ),
        }
    }
}
