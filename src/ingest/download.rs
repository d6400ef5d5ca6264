/// Sequential download of request-file entries from the NWIS web services.
///
/// Transport sits behind the `Fetch` trait so the batch logic can be tested
/// with canned responses. `HttpFetcher` is the real implementation, a thin
/// wrapper over a blocking `reqwest` client.
///
/// Downloads run one at a time with no retry. A failed request is logged and
/// recorded in the `DownloadReport`; the batch moves on to the next one.

use chrono::{Local, NaiveDateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::helpers::{self, timestamp_tag_at};
use crate::ingest::{query, requests};
use crate::logging::{self, Component};
use crate::model::{NwisError, RequestDescriptor};

/// Name of the JSON report written next to the downloaded files.
pub const REPORT_FILE_NAME: &str = "download_report.json";

// ============================================================================
// Transport
// ============================================================================

/// Fetches the body at a URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, NwisError>;
}

/// Blocking HTTP transport.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, NwisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NwisError::RequestFailed(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, NwisError> {
        Self::new(Duration::from_secs(config.webservice.timeout_secs))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, NwisError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| NwisError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NwisError::HttpError(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|e| NwisError::RequestFailed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub timestamp: String,
    pub request_file: Option<String>,
    pub destination: String,
    pub results: Vec<DownloadResult>,
    pub summary: DownloadSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub request: RequestDescriptor,
    pub url: Option<String>,
    pub file: Option<String>,
    pub bytes: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl DownloadReport {
    /// Paths of the files that downloaded successfully, in request order.
    pub fn downloaded_files(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.file.as_ref().map(PathBuf::from))
            .collect()
    }

    /// Writes the report as pretty JSON into `directory`.
    pub fn write_json(&self, directory: &Path) -> Result<PathBuf, NwisError> {
        let path = directory.join(REPORT_FILE_NAME);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| NwisError::Encode(e.to_string()))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

// ============================================================================
// Downloads
// ============================================================================

/// File name for a downloaded request: `{site_id}_{data_kind}_{timestamp_tag}.txt`.
pub fn download_file_name(request: &RequestDescriptor, now: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.txt",
        request.site_id,
        request.data_kind.token(),
        timestamp_tag_at(now)
    )
}

/// Downloads one request into `destination` and returns the written path.
pub fn download_request<F: Fetch>(
    fetcher: &F,
    config: &Config,
    request: &RequestDescriptor,
    destination: &Path,
) -> Result<PathBuf, NwisError> {
    let url = query::request_url(&config.webservice.base_url, request, &config.webservice.format)?;
    logging::debug(Component::WebService, Some(&request.site_id), &format!("GET {}", url));

    let body = fetcher.fetch(&url)?;

    let path = destination.join(download_file_name(request, Local::now().naive_local()));
    fs::write(&path, &body)
        .map_err(|e| NwisError::Io(format!("cannot write {}: {}", path.display(), e)))?;

    logging::info(
        Component::WebService,
        Some(&request.site_id),
        &format!("saved {} bytes to {}", body.len(), path.display()),
    );
    Ok(path)
}

/// Downloads every request in order. Individual failures do not stop the batch.
pub fn download_requests<F: Fetch>(
    fetcher: &F,
    config: &Config,
    requests: &[RequestDescriptor],
    destination: &Path,
) -> DownloadReport {
    let mut report = DownloadReport {
        timestamp: Utc::now().to_rfc3339(),
        request_file: None,
        destination: destination.display().to_string(),
        results: Vec::with_capacity(requests.len()),
        summary: DownloadSummary {
            total: requests.len(),
            ..DownloadSummary::default()
        },
    };

    for request in requests {
        let url =
            query::request_url(&config.webservice.base_url, request, &config.webservice.format)
                .ok();
        let mut result = DownloadResult {
            request: request.clone(),
            url,
            file: None,
            bytes: 0,
            error_message: None,
        };

        match download_request(fetcher, config, request, destination) {
            Ok(path) => {
                result.bytes = fs::metadata(&path).map(|m| m.len() as usize).unwrap_or(0);
                result.file = Some(path.display().to_string());
                report.summary.successful += 1;
            }
            Err(e) => {
                logging::log_fetch_failure(&request.site_id, "download", &e);
                result.error_message = Some(e.to_string());
                report.summary.failed += 1;
            }
        }

        report.results.push(result);
    }

    logging::log_download_summary(
        report.summary.total,
        report.summary.successful,
        report.summary.failed,
    );
    report
}

/// Runs a whole request file: reads it, creates the sibling
/// `{name}-datafiles` directory, downloads each request there and writes the
/// JSON report alongside the data.
pub fn run_request_file<F: Fetch>(
    fetcher: &F,
    config: &Config,
    request_path: &Path,
) -> Result<DownloadReport, NwisError> {
    let location = helpers::split_path(request_path)?;
    let parsed = requests::read_request_file(&location.path())?;

    let datafiles =
        helpers::ensure_directory(&location.directory, &location.sibling_name("datafiles"))?;

    let mut report = download_requests(fetcher, config, &parsed.requests, &datafiles);
    report.request_file = Some(location.path().display().to_string());

    let report_path = report.write_json(&datafiles)?;
    logging::debug(
        Component::WebService,
        None,
        &format!("report written to {}", report_path.display()),
    );
    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================
