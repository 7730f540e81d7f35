mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use predicates::str::contains;
use serde_json::Value;

fn fixture(name: &str) -> String {
    fixture_path(name).to_str().expect("utf-8 path").to_string()
}

#[test]
fn top_prints_ranked_table() {
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args(["top", "-i", fixture("Raw_File.csv").as_str(), "-g", "subject"])
        .assert()
        .success()
        .stdout(contains("rank  subject"))
        .stdout(contains("1     Public Works Department"))
        .stdout(contains("5     Boston Water & Sewer Commission    1"));
}

#[test]
fn top_emits_json_with_filter_and_value_field() {
    let output = Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args([
            "top",
            "-i",
            fixture("311_boston_data.csv").as_str(),
            "-g",
            "reason",
            "--value-field",
            "Count",
            "--top",
            "3",
            "--json",
        ])
        .output()
        .expect("run top");
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json");
    let entries = parsed.as_array().expect("array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["label"], "Street Cleaning");
    assert_eq!(entries[0]["value"], 2864.0);
    assert_eq!(entries[2]["label"], "Code Enforcement");
}

#[test]
fn categories_lists_sorted_neighborhoods() {
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args(["categories", "-i", fixture("Raw_File.csv").as_str(), "-f", "neighborhood"])
        .assert()
        .success()
        .stdout("Allston / Brighton\nDorchester\nJamaica Plain\nRoxbury\nSouth End\n");
}

#[test]
fn chart_writes_filtered_svg() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("dorchester.svg");
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args([
            "chart",
            "-i",
            fixture("Raw_File.csv").as_str(),
            "-g",
            "subject",
            "--filter",
            "neighborhood=Dorchester",
            "--y-title",
            "Number of 311 Calls",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&output).expect("read svg");
    assert_eq!(svg.matches(r#"<rect class="bar""#).count(), 3);
    assert!(svg.contains(r#"data-target="dorchester""#));
    assert!(svg.contains(">subject</text>"));
    assert!(svg.contains("Number of 311 Calls"));
}

#[test]
fn chart_reads_stdin_and_writes_stdout() {
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args(["chart", "-i", "-", "-g", "reason"])
        .write_stdin("reason\nA\nA\nB\n")
        .assert()
        .success()
        .stdout(contains("<svg"))
        .stdout(contains("<title>A: 2</title>"))
        .stdout(contains("<title>B: 1</title>"));
}

#[test]
fn chart_rejects_malformed_filter() {
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args([
            "chart",
            "-i",
            fixture("Raw_File.csv").as_str(),
            "-g",
            "subject",
            "--filter",
            "neighborhood",
        ])
        .assert()
        .failure()
        .stderr(contains("expected field=value"));
}

#[test]
fn missing_input_fails_with_context() {
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args(["top", "-i", "does-not-exist.csv", "-g", "reason"])
        .assert()
        .failure()
        .stderr(contains("Loading dataset from 'does-not-exist.csv'"));
}

#[test]
fn dashboard_writes_both_charts() {
    let workspace = TestWorkspace::new();
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args([
            "dashboard",
            "--reasons-source",
            fixture("311_boston_data.csv").as_str(),
            "--subjects-source",
            fixture("Raw_File.csv").as_str(),
            "--neighborhood",
            "South End",
            "-o",
            workspace.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let reasons = fs::read_to_string(workspace.path().join("chart.svg")).expect("reasons svg");
    assert_eq!(reasons.matches(r#"<rect class="bar""#).count(), 10);
    let subjects = fs::read_to_string(workspace.path().join("neighborhood-chart-container.svg"))
        .expect("subjects svg");
    assert_eq!(subjects.matches(r#"<rect class="bar""#).count(), 2);
}

#[test]
fn dashboard_survives_a_failed_load() {
    let workspace = TestWorkspace::new();
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .env("RUST_LOG", "csv_charts=error")
        .args([
            "dashboard",
            "--reasons-source",
            workspace.path().join("absent.csv").to_str().unwrap(),
            "--subjects-source",
            fixture("Raw_File.csv").as_str(),
            "-o",
            workspace.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(contains("Error fetching the data for 'chart'"));

    assert!(!workspace.path().join("chart.svg").exists());
    assert!(workspace.path().join("neighborhood-chart-container.svg").exists());
}

#[test]
fn explore_rewrites_chart_per_selection() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("explore.svg");
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args([
            "explore",
            "-i",
            fixture("Raw_File.csv").as_str(),
            "-g",
            "subject",
            "-f",
            "neighborhood",
            "-o",
            output.to_str().unwrap(),
        ])
        .write_stdin("Jamaica Plain\n")
        .assert()
        .success()
        .stdout(contains("[neighborhood = Jamaica Plain]"));

    let svg = fs::read_to_string(&output).expect("read svg");
    assert_eq!(svg.matches(r#"<rect class="bar""#).count(), 1);
}

#[test]
fn explore_honours_shared_input_options() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "calls.txt",
        "neighborhood;subject\nRoxbury;Parks\nRoxbury;Parks\nSouth End;Noise\n",
    );
    let output = workspace.path().join("explore.svg");
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args([
            "explore",
            "-i",
            input.to_str().unwrap(),
            "--delimiter",
            ";",
            "-g",
            "subject",
            "--value-field",
            "missing",
            "-f",
            "neighborhood",
            "-o",
            output.to_str().unwrap(),
        ])
        .write_stdin("Roxbury\n")
        .assert()
        .success()
        .stdout(contains("categories: Roxbury, South End"))
        .stdout(contains("[neighborhood = Roxbury]"));

    let svg = fs::read_to_string(&output).expect("read svg");
    assert_eq!(svg.matches(r#"<rect class="bar""#).count(), 1);
    assert!(svg.contains("<title>Parks: NaN</title>"));
}

#[test]
fn explore_refuses_stdin_input() {
    Command::cargo_bin("csv-charts")
        .expect("binary exists")
        .args(["explore", "-i", "-", "-g", "subject", "-f", "neighborhood", "-o", "x.svg"])
        .assert()
        .failure()
        .stderr(contains("reads selections from stdin"));
}
