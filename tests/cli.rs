mod common;

use std::fs;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::str::contains;

fn cli() -> Command {
    Command::cargo_bin("csv-reconcile").expect("binary exists")
}

fn write_case_files(workspace: &TestWorkspace) -> (std::path::PathBuf, std::path::PathBuf) {
    let left = workspace.write(
        "ledger_a.csv",
        "Unit,Case No,Status,Type\n\
         X Attorney Office,2023/45,Open,Investigation\n\
         X Attorney Office,2022/9,Open,Notice File\n",
    );
    let right = workspace.write(
        "ledger_b.csv",
        "Unit,Case No,Status,Type\n\
         X ABC,2023/45,Open,Investigation\n",
    );
    (left, right)
}

#[test]
fn init_config_writes_a_parseable_template() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("starter.yaml");
    cli()
        .args(["init-config", "-o", path.to_str().unwrap()])
        .assert()
        .success();

    let text = fs::read_to_string(&path).expect("template written");
    csv_reconcile::config::RunConfig::from_yaml(&text).expect("template parses");
}

#[test]
fn reconcile_writes_the_merged_sorted_csv() {
    let workspace = TestWorkspace::new();
    let (left, right) = write_case_files(&workspace);
    let config = workspace.write("run.yaml", common::config_yaml());
    let output = workspace.path().join("out.csv");

    cli()
        .args([
            "reconcile",
            "-l",
            left.to_str().unwrap(),
            "-r",
            right.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written = fs::read_to_string(&output).expect("output written");
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some(r#""Row No","Unit","Case No","Status","Type""#)
    );
    assert_eq!(
        lines.next(),
        Some(r#""1","X ABC","2023/45","Open","Investigation""#)
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn reconcile_applies_command_line_renames() {
    let workspace = TestWorkspace::new();
    let (left, right) = write_case_files(&workspace);
    let config = workspace.write("run.yaml", common::config_yaml());

    cli()
        .args([
            "reconcile",
            "-l",
            left.to_str().unwrap(),
            "-r",
            right.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
            "--rename",
            "Status->Pending",
        ])
        .assert()
        .success()
        .stdout(contains(r#""Pending""#));
}

#[test]
fn reconcile_fails_when_a_key_column_is_missing() {
    let workspace = TestWorkspace::new();
    let left = workspace.write("ledger_a.csv", "Unit,Case No\nA,2023/1\n");
    let right = workspace.write("ledger_b.csv", "Unit,Case No\nA,2023/1\n");
    let config = workspace.write("run.yaml", common::config_yaml());

    cli()
        .args([
            "reconcile",
            "-l",
            left.to_str().unwrap(),
            "-r",
            right.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("missing required column"))
        .stderr(contains("ledger_a"))
        .stderr(contains("ledger_b"));
}

#[test]
fn reconcile_table_renders_a_text_report() {
    let workspace = TestWorkspace::new();
    let (left, right) = write_case_files(&workspace);
    let config = workspace.write("run.yaml", common::config_yaml());

    cli()
        .args([
            "reconcile",
            "-l",
            left.to_str().unwrap(),
            "-r",
            right.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
            "--table",
        ])
        .assert()
        .success()
        .stdout(contains("Common records of ledger_a and ledger_b"))
        .stdout(contains("Row No"))
        .stdout(contains("column widths (pt):"));
}

#[test]
fn batch_continues_past_failing_pairs_and_summarizes() {
    let workspace = TestWorkspace::new();
    let (left, right) = write_case_files(&workspace);
    // Third file is missing two key columns, so both of its pairs fail.
    let broken = workspace.write("ledger_c.csv", "Unit,Case No\nA,2023/1\n");
    let config = workspace.write("run.yaml", common::config_yaml());
    let out_dir = workspace.path().join("out");
    let summary = workspace.path().join("summary.json");

    cli()
        .args([
            "batch",
            "-i",
            left.to_str().unwrap(),
            right.to_str().unwrap(),
            broken.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
            "--summary",
            summary.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(out_dir.join("ledger_a_vs_ledger_b.csv").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).expect("summary written"))
            .expect("summary parses");
    assert_eq!(summary["written"], 1);
    assert_eq!(summary["failed"], 2);
    assert_eq!(summary["pairs"].as_array().map(Vec::len), Some(3));
}

#[test]
fn layout_prints_the_width_plan() {
    let workspace = TestWorkspace::new();
    let (left, _) = write_case_files(&workspace);

    cli()
        .args(["layout", "-i", left.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("column"))
        .stdout(contains("width_pt"))
        .stdout(contains("Case No"));
}
