use std::{
    convert::Infallible,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Where a dataset comes from: a remote URL, a local file, or stdin (`-`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
    Stdin,
}

impl Source {
    pub fn parse(locator: &str) -> Self {
        let trimmed = locator.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else if trimmed == "-" {
            Source::Stdin
        } else {
            Source::Path(PathBuf::from(trimmed))
        }
    }

    /// Picks the delimiter from the locator's extension unless one was provided.
    pub fn resolve_delimiter(&self, provided: Option<u8>) -> u8 {
        if let Some(delimiter) = provided {
            return delimiter;
        }
        let extension = match self {
            Source::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url.as_str());
                Path::new(path)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_string)
            }
            Source::Path(path) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_string),
            Source::Stdin => None,
        };
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
            _ => DEFAULT_CSV_DELIMITER,
        }
    }
}

impl FromStr for Source {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Source::parse(value))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Stdin => f.write_str("-"),
        }
    }
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
