use std::borrow::Cow;
use std::fmt::Write as _;

use crate::aggregate::RankedList;

/// Renders a ranked list as an aligned `rank  label  value` table.
pub fn render_ranking(group_field: &str, ranked: &RankedList) -> String {
    let headers = [
        "rank".to_string(),
        group_field.to_string(),
        "value".to_string(),
    ];
    let rows = ranked
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            [
                (idx + 1).to_string(),
                entry.label.clone(),
                format_value(entry.value),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    if rows.is_empty() {
        output.push_str("(no rows)\n");
    }
    output
}

pub fn print_ranking(group_field: &str, ranked: &RankedList) {
    print!("{}", render_ranking(group_field, ranked));
}

/// Whole numbers print without decimals; NaN prints as `NaN`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
