use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version, about = "Reconcile paired CSV record sets into print-ready tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile two CSV files into one merged, sorted, relabeled table
    Reconcile(ReconcileArgs),
    /// Reconcile every pairwise combination of the given CSV files
    Batch(BatchArgs),
    /// Show the column width plan a CSV file would get on the configured page
    Layout(LayoutArgs),
    /// Write a commented starter configuration file
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Left input CSV file ('-' for stdin)
    #[arg(short = 'l', long = "left")]
    pub left: PathBuf,
    /// Right input CSV file
    #[arg(short = 'r', long = "right")]
    pub right: PathBuf,
    /// Run configuration YAML file
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Output CSV path ('-' or omitted for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Render an aligned text report instead of CSV output
    #[arg(long)]
    pub table: bool,
    /// Extra column renames in 'Old->New; Old2->New2' form
    #[arg(long)]
    pub rename: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the output (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Input CSV files; every pairwise combination is reconciled
    #[arg(short = 'i', long = "inputs", num_args = 2.., required = true)]
    pub inputs: Vec<PathBuf>,
    /// Run configuration YAML file
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Directory receiving one output CSV per non-empty pair
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: PathBuf,
    /// Write a machine-readable JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Extra column renames in 'Old->New; Old2->New2' form
    #[arg(long)]
    pub rename: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Input CSV file to plan widths for
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Optional run configuration; only page and width settings are read
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination path for the template ('-' for stdout)
    #[arg(short = 'o', long = "output", default_value = "reconcile.yaml")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_chars() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("pipe").unwrap(), b'|');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
