mod common;

use std::io::Cursor;

use common::{TestWorkspace, fixture_path};
use csv_charts::aggregate::ValueMode;
use csv_charts::explore::run_session;
use csv_charts::filter::{FilterController, FilterState};
use csv_charts::loader::{CsvLoader, Loader};
use csv_charts::pipeline::ChartDefinition;
use csv_charts::render::SvgRenderer;
use csv_charts::source::Source;

fn controller() -> FilterController {
    let dataset = CsvLoader::default()
        .load(&Source::Path(fixture_path("Raw_File.csv")))
        .expect("fixture");
    let chart = ChartDefinition::new("explore", "subject", ValueMode::Count)
        .with_filter_field("neighborhood");
    FilterController::new(dataset, chart)
}

#[test]
fn session_applies_each_line_as_a_selection() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("explore.svg");
    let mut controller = controller();
    let mut renderer = SvgRenderer::new();
    let mut out = Vec::new();

    let handled = run_session(
        &mut controller,
        &mut renderer,
        Cursor::new("South End\n*\nRoxbury\n"),
        &mut out,
        &output,
    )
    .expect("session");

    assert_eq!(handled, 3);
    let printed = String::from_utf8(out).expect("utf-8");
    assert!(printed.starts_with(
        "categories: Allston / Brighton, Dorchester, Jamaica Plain, Roxbury, South End\n"
    ));
    assert_eq!(printed.matches("[all rows]").count(), 2);
    assert!(printed.contains("[neighborhood = South End]"));
    assert!(printed.contains("[neighborhood = Roxbury]"));

    let svg = std::fs::read_to_string(&output).expect("svg written");
    assert_eq!(svg.matches(r#"<rect class="bar""#).count(), 2);
    assert!(svg.contains("Inspectional Services"));
    assert!(!svg.contains("Parks &amp; Recreation Department"));
}

#[test]
fn blank_line_resets_to_all_rows() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("explore.svg");
    let mut controller = controller();
    let mut renderer = SvgRenderer::new();
    let mut out = Vec::new();

    run_session(
        &mut controller,
        &mut renderer,
        Cursor::new("Dorchester\n\n"),
        &mut out,
        &output,
    )
    .expect("session");

    assert_eq!(controller.state(), &FilterState::Unfiltered);
    let svg = std::fs::read_to_string(&output).expect("svg written");
    assert_eq!(svg.matches(r#"<rect class="bar""#).count(), 5);
}

#[test]
fn unknown_category_writes_an_empty_chart() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("explore.svg");
    let mut controller = controller();
    let mut renderer = SvgRenderer::new();
    let mut out = Vec::new();

    run_session(
        &mut controller,
        &mut renderer,
        Cursor::new("Back Bay\n"),
        &mut out,
        &output,
    )
    .expect("session");

    let svg = std::fs::read_to_string(&output).expect("svg written");
    assert!(!svg.contains(r#"class="bar""#));
    assert!(String::from_utf8(out).expect("utf-8").ends_with("(no rows)\n"));
}
