//! Rendering boundary and the SVG bar chart implementation.
//!
//! A [`Renderer`] receives finished [`RankedList`]s. Drawing into a target
//! replaces whatever was there; clearing is a separate call so callers can
//! redraw as "clear, then render".
//!
//! [`SvgRenderer`] keeps one standalone SVG document per target: one bar per
//! entry in ranked order, a bottom category axis with labels rotated −60°, a
//! left value axis with nice ticks, axis titles and an optional credit line.

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;

use crate::{
    aggregate::RankedList,
    scale::{BandScale, LinearScale, format_tick},
};

/// Sink for ranked lists, addressed by target name.
pub trait Renderer {
    /// Removes everything drawn for `target`.
    fn clear(&mut self, target: &str);
    /// Draws `ranked` into `target`, replacing any previous drawing.
    fn render(&mut self, target: &str, ranked: &RankedList, style: &ChartStyle);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            margin: Margin {
                top: 40.0,
                right: 20.0,
                bottom: 180.0,
                left: 100.0,
            },
        }
    }
}

impl ChartDimensions {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub x_title: String,
    pub y_title: String,
    pub credit: Option<String>,
    /// Distance of the x-axis title below the plot area's top edge, past the plot height.
    pub x_title_offset: f64,
    pub dimensions: ChartDimensions,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            x_title: String::new(),
            y_title: "Count".to_string(),
            credit: None,
            x_title_offset: 80.0,
            dimensions: ChartDimensions::default(),
        }
    }
}

impl ChartStyle {
    pub fn new(x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        Self {
            x_title: x_title.into(),
            y_title: y_title.into(),
            ..Self::default()
        }
    }

    pub fn with_credit(mut self, credit: impl Into<String>) -> Self {
        self.credit = Some(credit.into());
        self
    }

    pub fn with_x_title_offset(mut self, offset: f64) -> Self {
        self.x_title_offset = offset;
        self
    }
}

const BAND_PADDING: f64 = 0.1;
const TICK_COUNT: usize = 10;

/// Geometry of one bar, in plot-area coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bar geometry for `ranked`. Height is proportional to value on `[0, max]`;
/// NaN, negative and degenerate-domain values get zero height.
pub fn layout(ranked: &RankedList, dimensions: &ChartDimensions) -> Vec<Bar> {
    let inner_height = dimensions.inner_height();
    let x = BandScale::new(ranked.labels(), (0.0, dimensions.inner_width()), BAND_PADDING);
    let y = LinearScale::new(ranked.max_value().unwrap_or(0.0), (inner_height, 0.0));
    ranked
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let top = y.map(entry.value).clamp(0.0, inner_height);
            Bar {
                label: entry.label.clone(),
                value: entry.value,
                x: x.position(idx),
                y: top,
                width: x.bandwidth(),
                height: inner_height - top,
            }
        })
        .collect()
}

pub fn render_svg(target: &str, ranked: &RankedList, style: &ChartStyle) -> String {
    let dims = &style.dimensions;
    let inner_width = dims.inner_width();
    let inner_height = dims.inner_height();
    let x = BandScale::new(ranked.labels(), (0.0, inner_width), BAND_PADDING);
    let y = LinearScale::new(ranked.max_value().unwrap_or(0.0), (inner_height, 0.0));

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" data-target="{}">"#,
        px(dims.width),
        px(dims.height),
        escape(target)
    );
    let _ = writeln!(
        out,
        r#"  <g transform="translate({},{})">"#,
        px(dims.margin.left),
        px(dims.margin.top)
    );

    for bar in layout(ranked, dims) {
        let _ = writeln!(
            out,
            r#"    <rect class="bar" x="{}" y="{}" width="{}" height="{}"><title>{}: {}</title></rect>"#,
            px(bar.x),
            px(bar.y),
            px(bar.width),
            px(bar.height),
            escape(&bar.label),
            value_label(bar.value)
        );
    }

    // Category axis
    let _ = writeln!(
        out,
        r#"    <g class="axis x-axis" transform="translate(0,{})" fill="none" font-size="10" text-anchor="middle">"#,
        px(inner_height)
    );
    let _ = writeln!(
        out,
        r#"      <path class="domain" stroke="currentColor" d="M0.5,6V0.5H{}V6"/>"#,
        px(inner_width + 0.5)
    );
    for (idx, label) in x.labels().iter().enumerate() {
        let centre = x.position(idx) + x.bandwidth() / 2.0;
        let _ = writeln!(
            out,
            r#"      <g class="tick" transform="translate({},0)"><line stroke="currentColor" y2="6"/><text fill="currentColor" y="9" dy="0.71em" transform="rotate(-60)" text-anchor="end" style="font-size: 12px">{}</text></g>"#,
            px(centre),
            escape(label)
        );
    }
    out.push_str("    </g>\n");

    // Value axis
    let step = y.tick_step(TICK_COUNT);
    let _ = writeln!(
        out,
        r#"    <g class="axis y-axis" fill="none" font-size="10" text-anchor="end">"#
    );
    let _ = writeln!(
        out,
        r#"      <path class="domain" stroke="currentColor" d="M-6,{}H0.5V0.5H-6"/>"#,
        px(inner_height + 0.5)
    );
    for tick in y.ticks(TICK_COUNT) {
        let _ = writeln!(
            out,
            r#"      <g class="tick" transform="translate(0,{})"><line stroke="currentColor" x2="-6"/><text fill="currentColor" x="-9" dy="0.32em">{}</text></g>"#,
            px(y.map(tick)),
            format_tick(tick, step)
        );
    }
    out.push_str("    </g>\n");

    let _ = writeln!(
        out,
        r#"    <text class="y-title" transform="rotate(-90)" y="{}" x="{}" dy="1em" style="text-anchor: middle">{}</text>"#,
        px(-dims.margin.left),
        px(-inner_height / 2.0),
        escape(&style.y_title)
    );
    if let Some(credit) = &style.credit {
        let _ = writeln!(
            out,
            r#"    <text class="graph-credit" x="{}" y="{}" style="text-anchor: middle">{}</text>"#,
            px(inner_width / 2.0),
            px(inner_height + dims.margin.bottom - 10.0),
            escape(credit)
        );
    }
    let _ = writeln!(
        out,
        r#"    <text class="x-title" transform="translate({},{})" style="text-anchor: middle">{}</text>"#,
        px(inner_width / 2.0),
        px(inner_height + dims.margin.top + style.x_title_offset),
        escape(&style.x_title)
    );

    out.push_str("  </g>\n</svg>\n");
    out
}

/// Keeps the latest SVG document for each target in memory.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    documents: BTreeMap<String, String>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self, target: &str) -> Option<&str> {
        self.documents.get(target).map(String::as_str)
    }

    /// Writes every document to `<dir>/<target>.svg`.
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))?;
        let mut written = Vec::with_capacity(self.documents.len());
        for (target, svg) in &self.documents {
            let path = dir.join(format!("{target}.svg"));
            fs::write(&path, svg).with_context(|| format!("Writing chart to {path:?}"))?;
            written.push(path);
        }
        Ok(written)
    }
}

impl Renderer for SvgRenderer {
    fn clear(&mut self, target: &str) {
        if self.documents.remove(target).is_some() {
            debug!("Cleared target '{target}'");
        }
    }

    fn render(&mut self, target: &str, ranked: &RankedList, style: &ChartStyle) {
        debug!("Rendering {} bar(s) into '{target}'", ranked.len());
        self.documents
            .insert(target.to_string(), render_svg(target, ranked, style));
    }
}

fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn value_label(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::{ValueMode, aggregate},
        dataset::Row,
    };

    fn ranked(pairs: &[(&str, &str)]) -> RankedList {
        let rows: Vec<Row> = pairs
            .iter()
            .map(|(label, value)| [("label", *label), ("value", *value)].into_iter().collect())
            .collect();
        aggregate(&rows, "label", &ValueMode::field("value"))
    }

    #[test]
    fn tallest_bar_fills_plot_height() {
        let dims = ChartDimensions::default();
        let bars = layout(&ranked(&[("A", "40"), ("B", "10")]), &dims);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].y, 0.0);
        assert_eq!(bars[0].height, 280.0);
        assert_eq!(bars[1].height, 70.0);
        assert!(bars[0].x < bars[1].x);
        assert_eq!(bars[0].width, bars[1].width);
    }

    #[test]
    fn nan_and_negative_values_draw_flat_bars() {
        let bars = layout(
            &ranked(&[("A", "5"), ("B", "-3"), ("C", "oops")]),
            &ChartDimensions::default(),
        );
        assert_eq!(bars[1].height, 0.0);
        assert_eq!(bars[2].height, 0.0);
        assert_eq!(bars[2].y, 280.0);
    }

    #[test]
    fn svg_contains_bars_titles_and_escaped_labels() {
        let style = ChartStyle::new("Reason", "Count").with_credit("Graph by: Masato and Ayush");
        let svg = render_svg("chart", &ranked(&[("Rats & Mice", "3"), ("<Noise>", "2")]), &style);
        assert_eq!(svg.matches(r#"<rect class="bar""#).count(), 2);
        assert!(svg.contains("Rats &amp; Mice"));
        assert!(svg.contains("&lt;Noise&gt;"));
        assert!(svg.contains(r#"transform="rotate(-60)""#));
        assert!(svg.contains(">Reason</text>"));
        assert!(svg.contains("Graph by: Masato and Ayush"));
        assert!(svg.contains(r#"data-target="chart""#));
    }

    #[test]
    fn empty_ranking_draws_axes_without_bars() {
        let svg = render_svg("empty", &RankedList::default(), &ChartStyle::default());
        assert!(!svg.contains(r#"class="bar""#));
        assert!(svg.contains("x-axis"));
        assert!(svg.contains("y-axis"));
    }

    #[test]
    fn clear_removes_document() {
        let mut renderer = SvgRenderer::new();
        renderer.render("chart", &ranked(&[("A", "1")]), &ChartStyle::default());
        assert!(renderer.document("chart").is_some());
        renderer.clear("chart");
        assert!(renderer.document("chart").is_none());
    }

    #[test]
    fn px_trims_trailing_zeros() {
        assert_eq!(px(280.0), "280");
        assert_eq!(px(19.7419354), "19.74");
        assert_eq!(px(-0.001), "0");
        assert_eq!(px(0.5), "0.5");
    }
}
