//! Single-shot spreadsheet download.
//!
//! One GET (or one local file read) per run. There is no retry: every failure is
//! surfaced as its own `FetchError` variant and ends the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::Source;

/// ECDC documents folder that hosted the daily spreadsheets.
pub const DEFAULT_BASE_URL: &str = "https://www.ecdc.europa.eu/sites/default/files/documents";

/// Environment variable overriding `DEFAULT_BASE_URL`.
pub const BASE_URL_ENV: &str = "ECDC_BASE_URL";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("Network error while fetching {url}: {message}")]
    Network { url: String, message: String },
    #[error("Transfer from {url} was aborted: {message}")]
    Aborted { url: String, message: String },
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Base URL for dated downloads: `ECDC_BASE_URL` (also read from `.env`) or the
/// ECDC default.
pub fn base_url_from_env() -> String {
    dotenvy::dotenv().ok();
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher. With `timeout = None` requests wait indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch the raw spreadsheet bytes.
    pub fn fetch(&self, source: &Source) -> Result<Vec<u8>, FetchError> {
        info!("Fetching {source}");
        let bytes = match source {
            Source::Url(url) => self.fetch_url(url)?,
            Source::File(path) => read_file(path)?,
        };
        debug!("Fetched {} bytes", bytes.len());
        Ok(bytes)
    }

    fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| classify(url, &e, false))?;

        check_status(url, resp.status())?;

        let body = resp.bytes().map_err(|e| classify(url, &e, true))?;
        Ok(body.to_vec())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, FetchError> {
    std::fs::read(path).map_err(|source| FetchError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn check_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Map a transport error. Errors raised while reading the body mean the
/// transfer started and was cut off.
fn classify(url: &str, err: &reqwest::Error, reading_body: bool) -> FetchError {
    let url = url.to_string();
    if err.is_timeout() {
        FetchError::Timeout { url }
    } else if reading_body {
        FetchError::Aborted {
            url,
            message: err.to_string(),
        }
    } else {
        FetchError::Network {
            url,
            message: err.to_string(),
        }
    }
}
