//! Chart pipelines: load → aggregate → render, one per target.
//!
//! [`run_dashboard`] loads every pipeline's source concurrently, then builds
//! a [`FilterController`] per successful load and renders it. A failed load
//! is logged once and skips its pipeline; the other pipelines still render.

use std::thread;

use log::{error, info};

use crate::{
    aggregate::{TOP_N, ValueMode},
    dataset::Dataset,
    error::LoadError,
    filter::FilterController,
    loader::Loader,
    render::{ChartStyle, Renderer},
    source::Source,
};

pub const REASONS_SOURCE: &str = "http://localhost:8000/311-basic/311_boston_data.csv";
pub const SUBJECTS_SOURCE: &str = "http://localhost:8000/Raw_File.csv";
pub const REASONS_TARGET: &str = "chart";
pub const SUBJECTS_TARGET: &str = "neighborhood-chart-container";

/// What a chart shows and where it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDefinition {
    pub target: String,
    pub group_field: String,
    pub mode: ValueMode,
    /// Field whose distinct values populate the category selector.
    pub filter_field: Option<String>,
    pub top: usize,
    pub style: ChartStyle,
}

impl ChartDefinition {
    pub fn new(target: impl Into<String>, group_field: impl Into<String>, mode: ValueMode) -> Self {
        Self {
            target: target.into(),
            group_field: group_field.into(),
            mode,
            filter_field: None,
            top: TOP_N,
            style: ChartStyle::default(),
        }
    }

    pub fn with_filter_field(mut self, field: impl Into<String>) -> Self {
        self.filter_field = Some(field.into());
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub source: Source,
    pub chart: ChartDefinition,
}

impl Pipeline {
    pub fn new(source: Source, chart: ChartDefinition) -> Self {
        Self { source, chart }
    }

    /// Call reasons ranked by their precomputed `Count`.
    pub fn reasons(source: Source) -> Self {
        let style = ChartStyle::new("Reason", "Count")
            .with_credit("Graph by: Masato and Ayush")
            .with_x_title_offset(80.0);
        Self::new(
            source,
            ChartDefinition::new(REASONS_TARGET, "reason", ValueMode::field("Count"))
                .with_style(style),
        )
    }

    /// Call subjects ranked by number of calls, filterable by neighborhood.
    pub fn subjects(source: Source) -> Self {
        let style = ChartStyle::new("Subject", "Number of 311 Calls").with_x_title_offset(150.0);
        Self::new(
            source,
            ChartDefinition::new(SUBJECTS_TARGET, "subject", ValueMode::Count)
                .with_filter_field("neighborhood")
                .with_style(style),
        )
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::reasons(Source::parse(REASONS_SOURCE)),
            Self::subjects(Source::parse(SUBJECTS_SOURCE)),
        ]
    }
}

#[derive(Debug, Default)]
pub struct DashboardReport {
    pub controllers: Vec<FilterController>,
    pub failures: Vec<(String, LoadError)>,
}

impl DashboardReport {
    pub fn rendered_targets(&self) -> impl Iterator<Item = &str> {
        self.controllers.iter().map(|c| c.chart().target.as_str())
    }

    pub fn controller(&self, target: &str) -> Option<&FilterController> {
        self.controllers.iter().find(|c| c.chart().target == target)
    }

    pub fn controller_mut(&mut self, target: &str) -> Option<&mut FilterController> {
        self.controllers.iter_mut().find(|c| c.chart().target == target)
    }
}

/// Loads every pipeline, then renders each loaded one in declaration order.
///
/// `initial_category` is applied to pipelines that declare a filter field.
pub fn run_dashboard<L, R>(
    pipelines: Vec<Pipeline>,
    loader: &L,
    renderer: &mut R,
    initial_category: Option<&str>,
) -> DashboardReport
where
    L: Loader + Sync + ?Sized,
    R: Renderer + ?Sized,
{
    let loaded: Vec<(Pipeline, Result<Dataset, LoadError>)> = thread::scope(|scope| {
        let handles = pipelines
            .into_iter()
            .map(|pipeline| {
                let source = pipeline.source.clone();
                let handle = scope.spawn(move || loader.load(&source));
                (pipeline, handle)
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|(pipeline, handle)| {
                let result = handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                (pipeline, result)
            })
            .collect()
    });

    let mut report = DashboardReport::default();
    for (pipeline, result) in loaded {
        let target = pipeline.chart.target.clone();
        match result {
            Ok(dataset) => {
                let mut controller = FilterController::new(dataset, pipeline.chart);
                let ranked = match initial_category {
                    Some(category) if controller.chart().filter_field.is_some() => {
                        controller.select(category, renderer)
                    }
                    _ => controller.show(renderer),
                };
                info!("Rendered {} bar(s) into '{target}'", ranked.len());
                report.controllers.push(controller);
            }
            Err(err) => {
                error!("Error fetching the data for '{target}': {err}");
                report.failures.push((target, err));
            }
        }
    }
    report
}
