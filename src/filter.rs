//! Category filtering for a chart.
//!
//! [`FilterController`] owns everything a filterable chart needs between
//! events: the loaded dataset, the chart definition, the dropdown categories
//! (computed once, sorted ascending) and the current [`FilterState`]. Each
//! transition re-aggregates the matching rows and redraws the target by
//! clearing it and rendering afresh.

use std::fmt;

use anyhow::{Result, anyhow};
use log::{debug, warn};

use crate::{
    aggregate::{RankedList, aggregate_top},
    dataset::Dataset,
    pipeline::ChartDefinition,
    render::Renderer,
};

/// Equality predicate `field = value` on a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub field: String,
    pub value: String,
}

impl Selection {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parses `field=value`; either side may be quoted.
    pub fn parse(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty filter expression"));
        }
        let Some((left, right)) = trimmed.split_once('=') else {
            return Err(anyhow!(
                "Failed to parse filter expression '{trimmed}' (expected field=value)"
            ));
        };
        let field = unquote(left.trim());
        if field.is_empty() {
            return Err(anyhow!("Filter expression '{trimmed}' names no field"));
        }
        Ok(Self::new(field, unquote(right.trim())))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Unfiltered,
    Filtered(Selection),
}

#[derive(Debug)]
pub struct FilterController {
    dataset: Dataset,
    chart: ChartDefinition,
    categories: Vec<String>,
    state: FilterState,
}

impl FilterController {
    pub fn new(dataset: Dataset, chart: ChartDefinition) -> Self {
        let categories = chart
            .filter_field
            .as_deref()
            .map(|field| dataset.distinct_values(field))
            .unwrap_or_default();
        debug!(
            "Chart '{}' holds {} row(s) and {} categor(ies)",
            chart.target,
            dataset.len(),
            categories.len()
        );
        Self {
            dataset,
            chart,
            categories,
            state: FilterState::Unfiltered,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn chart(&self) -> &ChartDefinition {
        &self.chart
    }

    /// Distinct values of the chart's filter field, sorted ascending.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Ranked list for the current state.
    pub fn ranking(&self) -> RankedList {
        let chart = &self.chart;
        match &self.state {
            FilterState::Unfiltered => {
                aggregate_top(self.dataset.rows(), &chart.group_field, &chart.mode, chart.top)
            }
            FilterState::Filtered(selection) => aggregate_top(
                self.dataset.matching(&selection.field, &selection.value),
                &chart.group_field,
                &chart.mode,
                chart.top,
            ),
        }
    }

    /// Redraws the target for the current state.
    pub fn show<R: Renderer + ?Sized>(&self, renderer: &mut R) -> RankedList {
        let ranked = self.ranking();
        renderer.clear(&self.chart.target);
        renderer.render(&self.chart.target, &ranked, &self.chart.style);
        ranked
    }

    /// Handles a dropdown selection on the chart's filter field.
    ///
    /// A chart without a filter field ignores the event and keeps its state.
    pub fn select<R: Renderer + ?Sized>(&mut self, category: &str, renderer: &mut R) -> RankedList {
        let Some(field) = self.chart.filter_field.clone() else {
            warn!(
                "Chart '{}' has no filter field; ignoring selection '{category}'",
                self.chart.target
            );
            return self.ranking();
        };
        self.apply(FilterState::Filtered(Selection::new(field, category)), renderer)
    }

    pub fn reset<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> RankedList {
        self.apply(FilterState::Unfiltered, renderer)
    }

    /// Moves to `state` and redraws.
    pub fn apply<R: Renderer + ?Sized>(&mut self, state: FilterState, renderer: &mut R) -> RankedList {
        match &state {
            FilterState::Unfiltered => debug!("Chart '{}' -> unfiltered", self.chart.target),
            FilterState::Filtered(selection) => {
                debug!("Chart '{}' -> filtered by {selection}", self.chart.target)
            }
        }
        self.state = state;
        self.show(renderer)
    }
}
