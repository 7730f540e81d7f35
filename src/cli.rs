use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pipeline::{REASONS_SOURCE, SUBJECTS_SOURCE};

#[derive(Debug, Parser)]
#[command(author, version, about = "Top-10 bar charts from CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the call-reason and call-subject charts as SVG files
    Dashboard(DashboardArgs),
    /// Render a single top-N bar chart as SVG
    Chart(ChartArgs),
    /// Print the top-N ranking of a column as a table or JSON
    Top(TopArgs),
    /// List the distinct values of a column, sorted ascending
    Categories(CategoriesArgs),
    /// Re-render a chart for each category read from stdin
    Explore(ExploreArgs),
}

/// Options shared by every command that reads a dataset.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// CSV source: file path, `-` for stdin, or an http(s) URL
    #[arg(short = 'i', long = "input")]
    pub input: String,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

/// What to rank and how.
#[derive(Debug, Args)]
pub struct RankArgs {
    /// Column whose distinct values become bars
    #[arg(short = 'g', long = "group-by")]
    pub group_by: String,
    /// Numeric column to use as the bar value (counts rows when omitted)
    #[arg(long = "value-field")]
    pub value_field: Option<String>,
    /// Keep only rows matching `field=value`
    #[arg(long = "filter")]
    pub filter: Option<String>,
    /// Number of bars to keep (0 = all)
    #[arg(long, default_value_t = crate::aggregate::TOP_N)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Source of the reason/Count dataset
    #[arg(long = "reasons-source", default_value = REASONS_SOURCE)]
    pub reasons_source: String,
    /// Source of the neighborhood/subject dataset
    #[arg(long = "subjects-source", default_value = SUBJECTS_SOURCE)]
    pub subjects_source: String,
    /// Neighborhood to filter the subject chart by
    #[arg(long)]
    pub neighborhood: Option<String>,
    /// Directory receiving one `<target>.svg` per chart
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,
    /// CSV delimiter character for both sources
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of both sources (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub rank: RankArgs,
    /// Output SVG file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Title under the category axis (defaults to the group-by column)
    #[arg(long = "x-title")]
    pub x_title: Option<String>,
    /// Title beside the value axis
    #[arg(long = "y-title", default_value = "Count")]
    pub y_title: String,
    /// Credit line printed below the chart
    #[arg(long)]
    pub credit: Option<String>,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub rank: RankArgs,
    /// Emit the ranking as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Column to list
    #[arg(short = 'f', long = "field")]
    pub field: String,
}

#[derive(Debug, Args)]
pub struct ExploreArgs {
    // Selections come from stdin, so `--input -` is rejected at runtime.
    #[command(flatten)]
    pub input: InputArgs,
    /// Column whose distinct values become bars
    #[arg(short = 'g', long = "group-by")]
    pub group_by: String,
    /// Numeric column to use as the bar value (counts rows when omitted)
    #[arg(long = "value-field")]
    pub value_field: Option<String>,
    /// Column whose values are offered as categories
    #[arg(short = 'f', long = "filter-field")]
    pub filter_field: String,
    /// SVG file rewritten after every selection
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
