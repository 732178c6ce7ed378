use ::scraper::error::SelectorErrorKind;
use std::path::PathBuf;

/// All errors that can occur while scraping, reading or writing tables.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed from the settings.
    #[error("failed to build http client: {0}")]
    ClientBuild(reqwest::Error),

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// An expected HTML element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },

    /// The season table no longer matches the layout the extractor knows.
    #[error("season table schema v{version} mismatch: {detail}")]
    SchemaMismatch { version: u32, detail: String },

    /// A table is missing a column the operation depends on.
    #[error("missing column {0:?}")]
    MissingColumn(String),

    /// Reading or writing a CSV table failed.
    #[error("csv error on {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    /// Filesystem error outside of CSV encoding.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file could not be parsed.
    #[error("invalid settings file {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A setting holds a value the loop cannot run with.
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: &'static str,
    },
}

impl<'a> From<SelectorErrorKind<'a>> for ScrapeError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        ScrapeError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
