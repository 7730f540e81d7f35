pub mod aggregate;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod explore;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod scale;
pub mod source;
pub mod table;

use std::{
    env,
    io::{self, Write},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use crate::{
    aggregate::{RankedList, ValueMode, aggregate_top},
    cli::{Cli, Commands, RankArgs},
    dataset::Dataset,
    filter::{FilterController, FilterState, Selection},
    loader::{CsvLoader, Loader, resolve_encoding},
    pipeline::{ChartDefinition, Pipeline, run_dashboard},
    render::{ChartStyle, SvgRenderer},
    source::Source,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_charts", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Dashboard(args) => handle_dashboard(&args),
        Commands::Chart(args) => handle_chart(&args),
        Commands::Top(args) => handle_top(&args),
        Commands::Categories(args) => handle_categories(&args),
        Commands::Explore(args) => explore::execute(&args),
    }
}

fn handle_dashboard(args: &cli::DashboardArgs) -> Result<()> {
    let encoding = resolve_encoding(args.input_encoding.as_deref())?;
    let loader = CsvLoader::new(args.delimiter, encoding);
    let pipelines = vec![
        Pipeline::reasons(Source::parse(&args.reasons_source)),
        Pipeline::subjects(Source::parse(&args.subjects_source)),
    ];
    let mut renderer = SvgRenderer::new();
    let report = run_dashboard(
        pipelines,
        &loader,
        &mut renderer,
        args.neighborhood.as_deref(),
    );
    for controller in &report.controllers {
        if !controller.categories().is_empty() {
            debug!(
                "Categories for '{}': {:?}",
                controller.chart().target,
                controller.categories()
            );
        }
    }
    let written = renderer
        .write_all(&args.output_dir)
        .with_context(|| format!("Writing charts to {:?}", args.output_dir))?;
    for path in &written {
        info!("Chart written to {path:?}");
    }
    info!(
        "{} chart(s) rendered, {} failed to load",
        written.len(),
        report.failures.len()
    );
    Ok(())
}

fn handle_chart(args: &cli::ChartArgs) -> Result<()> {
    let dataset = load_dataset(&args.input)?;
    let target = args
        .output
        .as_deref()
        .and_then(|path| path.file_stem())
        .and_then(|stem| stem.to_str())
        .unwrap_or("chart")
        .to_string();
    let mut style = ChartStyle::new(
        args.x_title.clone().unwrap_or_else(|| args.rank.group_by.clone()),
        args.y_title.clone(),
    );
    if let Some(credit) = &args.credit {
        style = style.with_credit(credit.clone());
    }
    let chart = ChartDefinition::new(
        target.clone(),
        args.rank.group_by.clone(),
        value_mode(args.rank.value_field.as_deref()),
    )
    .with_top(args.rank.top)
    .with_style(style);

    let state = match &args.rank.filter {
        Some(expression) => {
            let selection = Selection::parse(expression)?;
            warn_unknown_field(&dataset, &selection.field);
            FilterState::Filtered(selection)
        }
        None => FilterState::Unfiltered,
    };
    warn_unknown_field(&dataset, &args.rank.group_by);

    let mut controller = FilterController::new(dataset, chart);
    let mut renderer = SvgRenderer::new();
    let ranked = controller.apply(state, &mut renderer);
    let svg = renderer.document(&target).unwrap_or_default();
    match &args.output {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("Writing chart to {path:?}"))?;
            info!("Chart with {} bar(s) written to {path:?}", ranked.len());
        }
        None => {
            io::stdout()
                .write_all(svg.as_bytes())
                .context("Writing chart to stdout")?;
        }
    }
    Ok(())
}

fn handle_top(args: &cli::TopArgs) -> Result<()> {
    let dataset = load_dataset(&args.input)?;
    warn_unknown_field(&dataset, &args.rank.group_by);
    let ranked = rank(&dataset, &args.rank)?;
    if args.json {
        let json = serde_json::to_string_pretty(&ranked).context("Serializing ranking")?;
        println!("{json}");
    } else {
        table::print_ranking(&args.rank.group_by, &ranked);
    }
    Ok(())
}

fn handle_categories(args: &cli::CategoriesArgs) -> Result<()> {
    let dataset = load_dataset(&args.input)?;
    warn_unknown_field(&dataset, &args.field);
    let categories = dataset.distinct_values(&args.field);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for category in &categories {
        writeln!(out, "{category}").context("Writing categories to stdout")?;
    }
    info!(
        "{} distinct value(s) in column '{}'",
        categories.len(),
        args.field
    );
    Ok(())
}

fn rank(dataset: &Dataset, args: &RankArgs) -> Result<RankedList> {
    let mode = value_mode(args.value_field.as_deref());
    let ranked = match &args.filter {
        Some(expression) => {
            let selection = Selection::parse(expression)?;
            warn_unknown_field(dataset, &selection.field);
            aggregate_top(
                dataset.matching(&selection.field, &selection.value),
                &args.group_by,
                &mode,
                args.top,
            )
        }
        None => aggregate_top(dataset.rows(), &args.group_by, &mode, args.top),
    };
    Ok(ranked)
}

/// Counts rows unless a numeric value column was named.
pub(crate) fn value_mode(value_field: Option<&str>) -> ValueMode {
    match value_field {
        Some(field) => ValueMode::field(field),
        None => ValueMode::Count,
    }
}

pub(crate) fn load_dataset(args: &cli::InputArgs) -> Result<Dataset> {
    let encoding = resolve_encoding(args.input_encoding.as_deref())?;
    let source = Source::parse(&args.input);
    CsvLoader::new(args.delimiter, encoding)
        .load(&source)
        .map_err(|err| {
            error!("Error fetching the data: {err}");
            err
        })
        .with_context(|| format!("Loading dataset from '{source}'"))
}

pub(crate) fn warn_unknown_field(dataset: &Dataset, field: &str) {
    if !dataset.headers().is_empty() && !dataset.has_field(field) {
        warn!("Column '{field}' not found; available columns: {:?}", dataset.headers());
    }
}
