//! Interactive category selection over one chart.
//!
//! Each input line is a selection event: a category value filters the chart,
//! a blank line or `*` goes back to the unfiltered view. After every event the
//! SVG file is rewritten and the ranking is printed.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::{
    cli::ExploreArgs,
    filter::{FilterController, FilterState},
    load_dataset,
    pipeline::ChartDefinition,
    render::{ChartStyle, SvgRenderer},
    source::Source,
    table, value_mode, warn_unknown_field,
};

pub const RESET_TOKEN: &str = "*";

pub fn execute(args: &ExploreArgs) -> Result<()> {
    if Source::parse(&args.input.input) == Source::Stdin {
        bail!("explore reads selections from stdin; supply a file or URL with --input");
    }
    let dataset = load_dataset(&args.input)?;
    warn_unknown_field(&dataset, &args.group_by);
    warn_unknown_field(&dataset, &args.filter_field);

    let target = args
        .output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("chart")
        .to_string();
    let chart = ChartDefinition::new(
        target,
        args.group_by.clone(),
        value_mode(args.value_field.as_deref()),
    )
    .with_filter_field(args.filter_field.clone())
    .with_style(ChartStyle::new(args.group_by.clone(), "Count"));

    let mut controller = FilterController::new(dataset, chart);
    let mut renderer = SvgRenderer::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let events = run_session(
        &mut controller,
        &mut renderer,
        stdin.lock(),
        &mut stdout.lock(),
        &args.output,
    )?;
    info!("Handled {events} selection(s)");
    Ok(())
}

/// Drives `controller` from line-based selection events. Returns the number of events handled.
pub fn run_session<I, W>(
    controller: &mut FilterController,
    renderer: &mut SvgRenderer,
    events: I,
    out: &mut W,
    output: &Path,
) -> Result<usize>
where
    I: BufRead,
    W: Write,
{
    writeln!(out, "categories: {}", controller.categories().join(", "))?;
    let ranked = controller.show(renderer);
    publish(controller, renderer, &ranked, out, output)?;

    let mut handled = 0usize;
    for line in events.lines() {
        let line = line.context("Reading selection")?;
        let selection = line.trim();
        let ranked = if selection.is_empty() || selection == RESET_TOKEN {
            controller.reset(renderer)
        } else {
            if !controller.categories().iter().any(|c| c == selection) {
                debug!("'{selection}' is not a known category");
            }
            controller.select(selection, renderer)
        };
        handled += 1;
        publish(controller, renderer, &ranked, out, output)?;
    }
    Ok(handled)
}

fn publish<W: Write>(
    controller: &FilterController,
    renderer: &SvgRenderer,
    ranked: &crate::aggregate::RankedList,
    out: &mut W,
    output: &Path,
) -> Result<()> {
    let chart = controller.chart();
    let svg = renderer.document(&chart.target).unwrap_or_default();
    fs::write(output, svg).with_context(|| format!("Writing chart to {output:?}"))?;
    match controller.state() {
        FilterState::Unfiltered => writeln!(out, "[all rows]")?,
        FilterState::Filtered(selection) => writeln!(out, "[{selection}]")?,
    }
    write!(out, "{}", table::render_ranking(&chart.group_field, ranked))?;
    out.flush()?;
    Ok(())
}
