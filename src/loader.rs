//! Dataset loading: fetch bytes, decode text, parse CSV.
//!
//! Every load is a single attempt that yields either the complete
//! [`Dataset`] or a [`LoadError`]. There is no retry, no timeout and no
//! partial result.
//!
//! - **Sources**: HTTP(S) URLs are fetched with a blocking GET, local paths
//!   are read from disk and `-` reads stdin.
//! - **Encoding**: input bytes are decoded via `encoding_rs`, defaulting to UTF-8.
//! - **Delimiter**: resolved from the locator's extension (`.tsv` → tab) unless
//!   overridden.
//! - **Header**: the first record names the fields; short records are accepted.

use std::{
    fs,
    io::{self, Read},
};

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    dataset::{Dataset, Row},
    error::LoadError,
    source::{Source, printable_delimiter},
};

/// Produces a dataset for a source locator.
pub trait Loader {
    fn load(&self, source: &Source) -> Result<Dataset, LoadError>;
}

#[derive(Debug, Clone, Copy)]
pub struct CsvLoader {
    delimiter: Option<u8>,
    encoding: &'static Encoding,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
        }
    }
}

impl CsvLoader {
    pub fn new(delimiter: Option<u8>, encoding: &'static Encoding) -> Self {
        Self {
            delimiter,
            encoding,
        }
    }

    fn fetch(&self, source: &Source) -> Result<Vec<u8>, LoadError> {
        let locator = source.to_string();
        match source {
            Source::Url(url) => {
                debug!("GET {url}");
                let response = reqwest::blocking::get(url.as_str()).map_err(|err| {
                    LoadError::Fetch {
                        locator: locator.clone(),
                        source: err,
                    }
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status { locator, status });
                }
                let body = response
                    .bytes()
                    .map_err(|err| LoadError::Fetch { locator, source: err })?;
                Ok(body.to_vec())
            }
            Source::Path(path) => {
                fs::read(path).map_err(|err| LoadError::Io { locator, source: err })
            }
            Source::Stdin => {
                let mut buffer = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buffer)
                    .map_err(|err| LoadError::Io { locator, source: err })?;
                Ok(buffer)
            }
        }
    }
}

impl Loader for CsvLoader {
    fn load(&self, source: &Source) -> Result<Dataset, LoadError> {
        let delimiter = source.resolve_delimiter(self.delimiter);
        info!(
            "Loading '{source}' with delimiter '{}'",
            printable_delimiter(delimiter)
        );
        let bytes = self.fetch(source)?;
        let locator = source.to_string();
        let text = decode_bytes(&bytes, self.encoding).ok_or_else(|| LoadError::Decode {
            locator: locator.clone(),
            encoding: self.encoding.name(),
        })?;
        let dataset = parse_csv(&text, delimiter, &locator)?;
        info!(
            "Loaded {} row(s) across {} field(s) from '{source}'",
            dataset.len(),
            dataset.headers().len()
        );
        Ok(dataset)
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Decodes `bytes`, stripping a leading BOM. Returns `None` on malformed input.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Parses CSV text whose first record is the header row.
pub fn parse_csv(text: &str, delimiter: u8, locator: &str) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let csv_error = |err: csv::Error| LoadError::Csv {
        locator: locator.to_string(),
        source: err,
    };
    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(Row::from_record(&headers, record.iter()));
    }
    debug!("Parsed {} record(s) from '{locator}'", rows.len());
    Ok(Dataset::new(headers, rows))
}
