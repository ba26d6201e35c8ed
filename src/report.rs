//! The rendering collaborator boundary.
//!
//! The pipeline's output contract is a [`Report`]: the final table with all
//! cells stringified, the per-column width plan, the page geometry, and an
//! optional background directive. Rendering backends implement
//! [`RenderTarget`]; the built-in [`TextRenderer`] writes an aligned text
//! version for consoles and files.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Local;

use crate::{
    config::Background, layout::PageGeometry, pipeline::PairOutcome, recordset::RecordSet, table,
};

#[derive(Debug)]
pub struct Report<'a> {
    pub title: String,
    pub note: String,
    pub table: &'a RecordSet,
    pub widths: &'a [f64],
    pub geometry: &'a PageGeometry,
    pub background: &'a Background,
}

impl<'a> Report<'a> {
    /// Builds the date-stamped report for one reconciled pair.
    pub fn for_pair(
        left_id: &str,
        right_id: &str,
        outcome: &'a PairOutcome,
        background: &'a Background,
    ) -> Self {
        let date = Local::now().format("%d/%m/%Y");
        Self {
            title: format!("Common records of {left_id} and {right_id} as of {date}"),
            note: format!(
                "Note: rows listed here appear in both {left_id} and {right_id}, compared on the configured key columns."
            ),
            table: &outcome.table,
            widths: &outcome.widths,
            geometry: &outcome.geometry,
            background,
        }
    }
}

pub trait RenderTarget {
    fn render(&mut self, report: &Report<'_>) -> Result<()>;
}

pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderTarget for TextRenderer<W> {
    fn render(&mut self, report: &Report<'_>) -> Result<()> {
        writeln!(self.out, "{}", report.title).context("Writing report title")?;
        match report.background {
            Background::None => {}
            Background::Watermark { text } => {
                writeln!(self.out, "[watermark: {text}]").context("Writing watermark note")?;
            }
            Background::Image { path } => {
                writeln!(self.out, "[background image: {}]", path.display())
                    .context("Writing background note")?;
            }
        }
        writeln!(self.out).context("Writing report")?;
        write!(
            self.out,
            "{}",
            table::render_table(&report.table.columns, &report.table.rows)
        )
        .context("Writing report table")?;
        writeln!(self.out).context("Writing report")?;
        writeln!(self.out, "{}", report.note).context("Writing report note")?;

        let widths = report
            .widths
            .iter()
            .map(|w| format!("{w:.1}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.out, "column widths (pt): {widths}").context("Writing width plan")?;
        writeln!(
            self.out,
            "page: {:.1} x {:.1} pt, content width {:.1} pt",
            report.geometry.width,
            report.geometry.height,
            report.geometry.content_width()
        )
        .context("Writing page line")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Margins, PageGeometry};

    fn geometry() -> PageGeometry {
        PageGeometry {
            width: 800.0,
            height: 600.0,
            margins: Margins {
                left: 50.0,
                right: 50.0,
                top: 50.0,
                bottom: 50.0,
            },
        }
    }

    fn rendered(background: &Background) -> String {
        let table = RecordSet {
            columns: vec!["Row No".into(), "unit".into()],
            rows: vec![vec!["1".into(), "Central".into()]],
        };
        let geometry = geometry();
        let report = Report {
            title: "Common records".into(),
            note: "Note: test.".into(),
            table: &table,
            widths: &[100.0, 200.0],
            geometry: &geometry,
            background,
        };
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&report).expect("render succeeds");
        String::from_utf8(renderer.into_inner()).expect("utf-8 output")
    }

    #[test]
    fn text_renderer_includes_table_note_and_width_plan() {
        let output = rendered(&Background::None);
        assert!(output.contains("Common records"));
        assert!(output.contains("Row No  unit"));
        assert!(output.contains("column widths (pt): 100.0  200.0"));
        assert!(output.contains("content width 700.0 pt"));
        assert!(!output.contains("watermark"));
    }

    #[test]
    fn watermark_directive_is_surfaced() {
        let output = rendered(&Background::Watermark {
            text: "DRAFT".into(),
        });
        assert!(output.contains("[watermark: DRAFT]"));
    }
}
