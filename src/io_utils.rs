//! CSV I/O shell around the pure pipeline: delimiter and encoding resolution,
//! whole-set reads and writes, stdin/stdout via the `-` path convention.
//!
//! Output always quotes every field so round-tripping a result back through
//! the tool cannot change it.

use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::recordset::RecordSet;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Identity a source carries into error messages and output file names.
pub fn source_id(path: &Path) -> String {
    if is_dash(path) {
        return "stdin".to_string();
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Reads a whole CSV file (or stdin) into a [`RecordSet`].
pub fn read_record_set(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RecordSet> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let columns = decode_record(reader.byte_headers()?, encoding)
        .with_context(|| format!("Decoding headers of {path:?}"))?;

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", idx + 2))?;
        rows.push(
            decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {} of {path:?}", idx + 2))?,
        );
    }

    Ok(RecordSet { columns, rows })
}

/// Writes a [`RecordSet`] as CSV to a file, or to stdout for `None`/`-`.
pub fn write_record_set(
    path: Option<&Path>,
    set: &RecordSet,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer
        .write_record(&set.columns)
        .context("Writing output headers")?;
    for row in &set.rows {
        writer.write_record(row).context("Writing output row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV output buffer: {err}"))?;
    let text = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;

    let (encoded, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(anyhow!(
            "Failed to encode output using {}",
            encoding.name()
        ));
    }

    match path {
        Some(p) if !is_dash(p) => {
            let mut file =
                File::create(p).with_context(|| format!("Creating output file {p:?}"))?;
            file.write_all(encoded.as_ref())
                .with_context(|| format!("Writing output file {p:?}"))?;
        }
        _ => {
            std::io::stdout()
                .write_all(encoded.as_ref())
                .context("Writing output to stdout")?;
        }
    }
    Ok(())
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(anyhow!(
                    "Failed to decode text with encoding {}",
                    encoding.name()
                ))
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}
