use csv_reconcile::layout::{WidthConstraints, allocate};
use proptest::prelude::*;

fn table_of_lengths(lengths: &[usize]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns: Vec<String> = (0..lengths.len()).map(|i| format!("col{i}")).collect();
    let row: Vec<String> = lengths.iter().map(|len| "x".repeat(*len)).collect();
    (columns, vec![row])
}

fn constraints(min: f64, max: f64) -> WidthConstraints {
    WidthConstraints {
        min,
        max,
        ..WidthConstraints::default()
    }
}

#[test]
fn scenario_c_six_uneven_columns_fill_the_target() {
    // Content lengths spread more than 5x apart.
    let (columns, rows) = table_of_lengths(&[18, 28, 38, 58, 78, 98]);
    let (widths, warning) = allocate(&columns, &rows, 1000.0, &constraints(50.0, 400.0));

    assert!(warning.is_none());
    assert_eq!(widths.len(), 6);
    for width in &widths {
        assert!((50.0..=400.0).contains(width), "width {width} out of bounds");
    }
    let total: f64 = widths.iter().sum();
    assert!(
        (total - 1000.0).abs() <= 1.0,
        "sum {total} drifted from the 1000pt target"
    );
}

#[test]
fn extreme_spread_still_respects_bounds() {
    let (columns, rows) = table_of_lengths(&[1, 2, 3, 40, 80, 200]);
    let (widths, _) = allocate(&columns, &rows, 1000.0, &constraints(50.0, 400.0));
    for width in &widths {
        assert!((50.0..=400.0).contains(width));
    }
}

proptest! {
    #[test]
    fn widths_always_stay_within_bounds(
        lengths in prop::collection::vec(0usize..120, 1..12),
        min in 5.0f64..80.0,
        span in 1.0f64..300.0,
        target in 50.0f64..2000.0,
    ) {
        let max = min + span;
        let (columns, rows) = table_of_lengths(&lengths);
        let (widths, _) = allocate(&columns, &rows, target, &constraints(min, max));
        prop_assert_eq!(widths.len(), lengths.len());
        for width in widths {
            prop_assert!(width >= min - 1e-9 && width <= max + 1e-9);
        }
    }

    #[test]
    fn feasible_targets_are_met_within_tolerance_or_clamped(
        lengths in prop::collection::vec(1usize..60, 2..8),
    ) {
        let n = lengths.len() as f64;
        let min = 20.0;
        let max = 300.0;
        // A target comfortably inside [n*min, n*max].
        let target = (n * min + n * max) / 2.0;
        let (columns, rows) = table_of_lengths(&lengths);
        let (widths, warning) = allocate(&columns, &rows, target, &constraints(min, max));
        prop_assert!(warning.is_none());
        let total: f64 = widths.iter().sum();
        // One correction pass; drift beyond tolerance only when clamps bind.
        let clamped = widths
            .iter()
            .any(|w| (*w - min).abs() < 1e-9 || (*w - max).abs() < 1e-9);
        prop_assert!(clamped || (total - target).abs() <= 1.0);
    }
}
