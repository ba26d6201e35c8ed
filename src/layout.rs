//! Page geometry and proportional column width allocation.
//!
//! Widths are computed from content-length statistics: each column weighs in
//! at its longest cell (header included) plus padding, weights scale to the
//! target width, and the results clamp into `[min, max]`. One corrective
//! rescale narrows rounding and clamping drift; whatever drift clamping still
//! forces after that pass is accepted and reported as a warning when the
//! target is outside the feasible range entirely.

use crate::error::{PipelineError, PipelineWarning};

/// One centimeter in points, the unit the rendering backend consumes.
pub const CM: f64 = 72.0 / 2.54;

/// ISO A4 in points, portrait.
pub const A4: (f64, f64) = (21.0 * CM, 29.7 * CM);
/// US Letter in points, portrait.
pub const LETTER: (f64, f64) = (612.0, 792.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let horizontal = self.margins.left + self.margins.right;
        let vertical = self.margins.top + self.margins.bottom;
        if horizontal >= self.width || vertical >= self.height {
            return Err(PipelineError::InvalidGeometry {
                width: self.width,
                height: self.height,
                horizontal,
                vertical,
            });
        }
        Ok(())
    }

    /// Width left for the table once margins are taken out.
    pub fn content_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthConstraints {
    pub min: f64,
    pub max: f64,
    /// Estimated width of one character in points.
    pub char_unit: f64,
    /// Characters of breathing room added to every column's longest content.
    pub padding: usize,
    /// Acceptable distance between the width sum and the target.
    pub tolerance: f64,
}

impl Default for WidthConstraints {
    fn default() -> Self {
        Self {
            min: CM,
            max: 8.0 * CM,
            char_unit: 2.5,
            padding: 2,
            tolerance: 1.0,
        }
    }
}

impl WidthConstraints {
    fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Computes one width per column for a `target`-wide content area.
///
/// Every returned width lies in `[min, max]`. The sum lands within tolerance
/// of the target whenever `n*min <= target <= n*max`; outside that range the
/// per-column bound wins and a [`PipelineWarning::LayoutInfeasible`] reports
/// the degradation.
pub fn allocate(
    columns: &[String],
    rows: &[Vec<String>],
    target: f64,
    constraints: &WidthConstraints,
) -> (Vec<f64>, Option<PipelineWarning>) {
    if columns.is_empty() {
        return (Vec::new(), None);
    }

    let raw: Vec<f64> = columns
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let longest = rows
                .iter()
                .map(|row| row.get(idx).map(|c| c.chars().count()).unwrap_or(0))
                .fold(header.chars().count(), usize::max);
            (longest + constraints.padding) as f64 * constraints.char_unit
        })
        .collect();

    let raw_total: f64 = raw.iter().sum();
    let scale = if raw_total > 0.0 { target / raw_total } else { 1.0 };
    let mut widths: Vec<f64> = raw
        .iter()
        .map(|value| constraints.clamp(value * scale))
        .collect();

    // Single correction pass; residual drift after re-clamping is accepted.
    let total: f64 = widths.iter().sum();
    if total > 0.0 && (total - target).abs() > constraints.tolerance {
        let factor = target / total;
        for width in &mut widths {
            *width = constraints.clamp(*width * factor);
        }
    }

    let minimum_total = columns.len() as f64 * constraints.min;
    let maximum_total = columns.len() as f64 * constraints.max;
    let warning = (target < minimum_total || target > maximum_total).then(|| {
        PipelineWarning::LayoutInfeasible {
            target,
            minimum_total,
            maximum_total,
        }
    });

    (widths, warning)
}
