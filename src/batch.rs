//! Command drivers around the pure pipeline: single-pair reconciliation, the
//! all-pairs batch run, and the width-plan preview.
//!
//! The batch driver owns the continue-on-failure policy: one pair's schema
//! error is logged and recorded, and every remaining pair still runs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use itertools::Itertools;
use log::{error, info, warn};
use serde::Serialize;

use crate::{
    cli::{BatchArgs, LayoutArgs, ReconcileArgs},
    config::{RunConfig, parse_rename_rules},
    error::PipelineWarning,
    io_utils, layout, pipeline,
    recordset::SourceSet,
    report::{RenderTarget, Report, TextRenderer},
    table,
};

pub fn execute_reconcile(args: &ReconcileArgs) -> Result<()> {
    let config = load_config(&args.config, args.rename.as_deref())?;
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;

    let left = load_source(&args.left, args.delimiter, input_encoding)?;
    let right = load_source(&args.right, args.delimiter, input_encoding)?;
    info!("Reconciling '{}' vs '{}'", left.id, right.id);

    let outcome = pipeline::run_pair(&config, &left, &right)
        .with_context(|| format!("Reconciling {} vs {}", left.id, right.id))?;
    if outcome.is_empty() {
        info!("No common records; emitting the empty table");
    }

    if args.table {
        let report = Report::for_pair(&left.id, &right.id, &outcome, &config.background);
        let stdout = std::io::stdout();
        TextRenderer::new(stdout.lock()).render(&report)?;
    } else {
        io_utils::write_record_set(
            args.output.as_deref(),
            &outcome.table,
            io_utils::DEFAULT_CSV_DELIMITER,
            output_encoding,
        )?;
    }
    info!(
        "Wrote {} row(s) across {} column(s)",
        outcome.table.len(),
        outcome.table.columns.len()
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub generated_at: String,
    pub written: usize,
    pub empty: usize,
    pub failed: usize,
    pub pairs: Vec<PairRecord>,
}

#[derive(Debug, Serialize)]
pub struct PairRecord {
    pub left: String,
    pub right: String,
    pub status: PairStatus,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PipelineWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    Written,
    Empty,
    Failed,
}

pub fn execute_batch(args: &BatchArgs) -> Result<()> {
    if args.inputs.len() < 2 {
        return Err(anyhow!("Batch requires at least two input files"));
    }
    let config = load_config(&args.config, args.rename.as_deref())?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Creating output directory {:?}", args.output_dir))?;

    let sources = args
        .inputs
        .iter()
        .map(|path| load_source(path, args.delimiter, encoding))
        .collect::<Result<Vec<_>>>()?;

    let mut summary = BatchSummary {
        generated_at: Local::now().to_rfc3339(),
        written: 0,
        empty: 0,
        failed: 0,
        pairs: Vec::new(),
    };

    let pair_count = sources.len() * (sources.len() - 1) / 2;
    info!("Comparing {} file pair(s)", pair_count);

    for (left, right) in sources.iter().tuple_combinations() {
        summary.pairs.push(run_one(&config, left, right, args));
    }
    summary.written = count(&summary.pairs, PairStatus::Written);
    summary.empty = count(&summary.pairs, PairStatus::Empty);
    summary.failed = count(&summary.pairs, PairStatus::Failed);

    info!(
        "Batch complete: {} written, {} empty, {} failed",
        summary.written, summary.empty, summary.failed
    );

    if let Some(path) = &args.summary {
        let file = fs::File::create(path)
            .with_context(|| format!("Creating summary file {path:?}"))?;
        serde_json::to_writer_pretty(file, &summary).context("Writing batch summary JSON")?;
        info!("Summary written to {:?}", path);
    }
    Ok(())
}

/// One pair, isolated: any failure becomes a record, never a batch abort.
fn run_one(
    config: &RunConfig,
    left: &SourceSet,
    right: &SourceSet,
    args: &BatchArgs,
) -> PairRecord {
    let mut record = PairRecord {
        left: left.id.clone(),
        right: right.id.clone(),
        status: PairStatus::Failed,
        rows: 0,
        output: None,
        error: None,
        warnings: Vec::new(),
    };

    let outcome = match pipeline::run_pair(config, left, right) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("{} vs {}: {err}", left.id, right.id);
            record.error = Some(err.to_string());
            return record;
        }
    };
    record.warnings = outcome.warnings.clone();
    record.rows = outcome.table.len();

    if outcome.is_empty() {
        info!("{} vs {}: no common records, skipped", left.id, right.id);
        record.status = PairStatus::Empty;
        return record;
    }

    let path = args
        .output_dir
        .join(format!("{}_vs_{}.csv", left.id, right.id));
    match io_utils::write_record_set(
        Some(&path),
        &outcome.table,
        io_utils::DEFAULT_CSV_DELIMITER,
        encoding_rs::UTF_8,
    ) {
        Ok(()) => {
            info!(
                "{} vs {}: {} row(s) -> {:?}",
                left.id,
                right.id,
                outcome.table.len(),
                path
            );
            record.status = PairStatus::Written;
            record.output = Some(path);
        }
        Err(err) => {
            error!("{} vs {}: {err:#}", left.id, right.id);
            record.error = Some(format!("{err:#}"));
        }
    }
    record
}

pub fn execute_layout(args: &LayoutArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let set = io_utils::read_record_set(&args.input, delimiter, encoding)?;

    let geometry = config.page.geometry();
    geometry.validate()?;
    let (widths, warning) = layout::allocate(
        &set.columns,
        &set.rows,
        geometry.content_width(),
        &config.widths.constraints(),
    );
    if let Some(warning) = warning {
        warn!("{warning}");
    }

    let headers = vec![
        "column".to_string(),
        "longest".to_string(),
        "width_pt".to_string(),
    ];
    let rows: Vec<Vec<String>> = set
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let longest = set
                .rows
                .iter()
                .map(|row| row.get(idx).map(|c| c.chars().count()).unwrap_or(0))
                .fold(name.chars().count(), usize::max);
            vec![
                name.clone(),
                longest.to_string(),
                format!("{:.1}", widths[idx]),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
    info!(
        "Planned {} column(s) into {:.1} pt of content width",
        set.columns.len(),
        geometry.content_width()
    );
    Ok(())
}

fn load_config(path: &Path, rename: Option<&str>) -> Result<RunConfig> {
    let mut config = RunConfig::load(path)?;
    if let Some(text) = rename {
        config.renames.extend(parse_rename_rules(text));
    }
    Ok(config)
}

fn load_source(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static encoding_rs::Encoding,
) -> Result<SourceSet> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let records = io_utils::read_record_set(path, delimiter, encoding)?;
    Ok(SourceSet::new(io_utils::source_id(path), records))
}

fn count(pairs: &[PairRecord], status: PairStatus) -> usize {
    pairs.iter().filter(|p| p.status == status).count()
}
