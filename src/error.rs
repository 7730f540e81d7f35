//! The single failure kind of a chart pipeline.
//!
//! Everything after a successful load (aggregation, filtering, rendering) is
//! total, so [`LoadError`] is the only error a pipeline can surface. It is
//! caught once at the pipeline boundary and logged; see
//! [`crate::pipeline::run_dashboard`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Fetching {locator}: {source}")]
    Fetch {
        locator: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Fetching {locator}: server responded with {status}")]
    Status {
        locator: String,
        status: reqwest::StatusCode,
    },
    #[error("Reading {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {locator} as {encoding}")]
    Decode {
        locator: String,
        encoding: &'static str,
    },
    /// Surfaced by the CSV reader itself. Records are parsed leniently from
    /// already-decoded text, so malformed quoting and ragged rows load
    /// without error and bad bytes are reported as [`LoadError::Decode`].
    #[error("Parsing CSV from {locator}: {source}")]
    Csv {
        locator: String,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    /// Locator of the source that failed to load.
    pub fn locator(&self) -> &str {
        match self {
            LoadError::Fetch { locator, .. }
            | LoadError::Status { locator, .. }
            | LoadError::Io { locator, .. }
            | LoadError::Decode { locator, .. }
            | LoadError::Csv { locator, .. } => locator,
        }
    }
}
