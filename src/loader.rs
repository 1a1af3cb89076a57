use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::{debug, info, instrument};

use crate::domain::RVError;
use crate::record::Person;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const ROWS_ENDPOINT: &str = "/api/datasubrows";
pub const DEFAULT_TAKE: usize = 10;
pub const DEFAULT_PAGE_INDEX: usize = 2;

/// One page of rows on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub base_url: String,
    pub take: usize,
    pub page_index: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            take: DEFAULT_TAKE,
            page_index: DEFAULT_PAGE_INDEX,
        }
    }
}

impl PageRequest {
    pub fn url(&self) -> String {
        format!(
            "{}{}?take={}&pageIndex={}",
            self.base_url.trim_end_matches('/'),
            ROWS_ENDPOINT,
            self.take,
            self.page_index
        )
    }
}

#[derive(Debug, Clone)]
pub enum DataSource {
    Http(PageRequest),
    File(String),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Http(request) => request.url(),
            DataSource::File(path) => path.clone(),
        }
    }

    pub fn load(&self) -> Result<Vec<Person>, RVError> {
        let start_time = Instant::now();
        let rows = match self {
            DataSource::Http(request) => fetch_rows(request)?,
            DataSource::File(path) => read_rows(path)?,
        };
        info!(
            "Loaded {} rows from {} in {}ms",
            rows.len(),
            self.describe(),
            start_time.elapsed().as_millis()
        );
        Ok(rows)
    }
}

/// Single GET without caching and without retries. Errors go straight to the caller.
#[instrument(skip_all, fields(url = %request.url()))]
pub fn fetch_rows(request: &PageRequest) -> Result<Vec<Person>, RVError> {
    let url = request.url();
    // The endpoint is local, system proxy settings do not apply
    let client = Client::builder().no_proxy().build()?;
    let response = client
        .get(&url)
        .header(CACHE_CONTROL, "no-store")
        .header(PRAGMA, "no-cache")
        .send()?;

    let status = response.status();
    debug!("Response status {status}");
    let body = response.text()?;

    parse_rows(&body).map_err(|e| {
        if status.is_success() {
            e
        } else {
            RVError::Http {
                status: status.as_u16(),
                url,
            }
        }
    })
}

#[instrument]
pub fn read_rows(path: &str) -> Result<Vec<Person>, RVError> {
    let expanded = shellexpand::full(path).map_err(|e| RVError::LoadingFailed(e.to_string()))?;
    let path = PathBuf::from(expanded.as_ref());
    let body = fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RVError::FileNotFound,
        ErrorKind::PermissionDenied => RVError::PermissionDenied,
        _ => RVError::IoError(e),
    })?;
    parse_rows(&body)
}

pub fn parse_rows(body: &str) -> Result<Vec<Person>, RVError> {
    Ok(serde_json::from_str(body)?)
}
