mod common;

use common::TestWorkspace;
use csv_reconcile::config::{Background, CollisionMode, Orientation, RunConfig};

#[test]
fn loads_a_full_config_file() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "run.yaml",
        r#"key_columns: [Unit, Case No]
replace:
  - column: Unit
    from: Prosecution Office
    to: PO
category:
  column: Type
  allowed: [Investigation]
sort:
  group_column: Unit
  identifier_column: Case No
rename:
  - from: Status
    to: Pending
collision:
  mode: tag-both
  left_tag: a
  right_tag: b
page:
  size: letter
  orientation: portrait
  margins_cm: {left: 2.0, right: 2.0, top: 1.0, bottom: 1.0}
widths:
  min_cm: 0.5
  max_cm: 6.0
background:
  kind: image
  path: seal.png
"#,
    );

    let config = RunConfig::load(&path).expect("config loads");
    assert_eq!(config.key_columns, vec!["Unit", "Case No"]);
    assert_eq!(config.collision.mode, CollisionMode::TagBoth);
    assert_eq!(config.page.orientation, Orientation::Portrait);
    assert_eq!(config.renames[0].to, "Pending");
    assert!(matches!(config.background, Background::Image { .. }));

    let geometry = config.page.geometry();
    // Letter portrait: 612pt wide minus 2cm margins either side.
    assert!(geometry.width < geometry.height);
    assert!((geometry.content_width() - (612.0 - 4.0 * 72.0 / 2.54)).abs() < 1e-6);
}

#[test]
fn load_rejects_a_config_without_key_columns() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("run.yaml", "rename: []\n");
    let err = RunConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("key column"));
}

#[test]
fn template_is_a_valid_starting_point() {
    let config = RunConfig::from_yaml(RunConfig::template()).expect("template parses");
    assert!(!config.key_columns.is_empty());
    assert!(config.category.is_some());
}
