/// RequestDescriptor, RequestFile, TimeSeries, DateWindow, NwisError
/// core data structures and error handling
///
/// Core data types for the NWIS ingest tooling.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O, only types and the constructors that keep their
/// invariants.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_STAGE: &str = "00065";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Kind of data a request targets. Each kind maps to its own NWIS endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataKind {
    /// Daily values (`dv` service).
    Daily,
    /// Instantaneous values (`iv` service).
    Instantaneous,
    /// Site metadata only (`site` service). Carries no dates or parameters.
    SiteOnly,
}

impl DataKind {
    /// Token used in request files and in downloaded file names.
    pub fn token(&self) -> &'static str {
        match self {
            DataKind::Daily => "dv",
            DataKind::Instantaneous => "iv",
            DataKind::SiteOnly => "site",
        }
    }

    /// Path segment appended to the service host.
    pub fn service_path(&self) -> &'static str {
        self.token()
    }

    /// Parses a request-file kind token. The empty token is not handled here;
    /// see `ingest::requests` for how a blank kind column is treated.
    pub fn from_token(token: &str) -> Option<DataKind> {
        match token {
            "dv" => Some(DataKind::Daily),
            "iv" => Some(DataKind::Instantaneous),
            "site" => Some(DataKind::SiteOnly),
            _ => None,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One download request, built from one line of a request file.
///
/// Daily and instantaneous requests always carry both dates and at least one
/// parameter code; site-only requests carry neither. Use the constructors;
/// they are the only place that invariant is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    pub data_kind: DataKind,
    pub site_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub parameter_codes: Vec<String>,
}

impl RequestDescriptor {
    /// Builds a daily or instantaneous request.
    ///
    /// Returns `None` for `DataKind::SiteOnly` or an empty parameter list.
    pub fn series(
        data_kind: DataKind,
        site_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        parameter_codes: Vec<String>,
    ) -> Option<Self> {
        if data_kind == DataKind::SiteOnly || parameter_codes.is_empty() {
            return None;
        }
        Some(Self {
            data_kind,
            site_id: site_id.to_string(),
            start_date: Some(start_date),
            end_date: Some(end_date),
            parameter_codes,
        })
    }

    /// Builds a site-only request.
    pub fn site_only(site_id: &str) -> Self {
        Self {
            data_kind: DataKind::SiteOnly,
            site_id: site_id.to_string(),
            start_date: None,
            end_date: None,
            parameter_codes: Vec::new(),
        }
    }
}

/// Everything recovered from a request file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFile {
    /// Column names from the most recent `#` header line; empty if none.
    pub column_names: Vec<String>,
    /// Requests in file order.
    pub requests: Vec<RequestDescriptor>,
}

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// A date-stamped numeric series. `None` marks a missing value.
///
/// Dates are expected in ascending order and `dates.len() == values.len()`.
/// The fields are public so readers can fill them directly; alignment
/// functions re-check the length invariant before trusting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub dates: Vec<NaiveDateTime>,
    pub values: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Builds a series, rejecting mismatched lengths.
    pub fn new(dates: Vec<NaiveDateTime>, values: Vec<Option<f64>>) -> Result<Self, NwisError> {
        if dates.len() != values.len() {
            return Err(NwisError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        Ok(Self { dates, values })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDateTime> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDateTime> {
        self.dates.last().copied()
    }
}

/// Inclusive date range shared by two or more series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when reading, encoding, fetching or aligning NWIS data.
///
/// Malformed request-file lines are deliberately absent: they are skipped,
/// never surfaced.
#[derive(Debug, PartialEq)]
pub enum NwisError {
    /// A file or stream could not be read, or a directory could not be created.
    Io(String),
    /// A series has a different number of dates and values.
    LengthMismatch { dates: usize, values: usize },
    /// Alignment was requested on a series with no entries.
    EmptySeries,
    /// Two series do not share any part of their date ranges.
    NoOverlap {
        first_end: NaiveDateTime,
        second_start: NaiveDateTime,
    },
    /// A window boundary is not an entry of the series being subset.
    DateNotInSeries(NaiveDateTime),
    /// Non-2xx HTTP response from the USGS API.
    HttpError(u16),
    /// The request never produced a response (connection, timeout, TLS).
    RequestFailed(String),
    /// A request descriptor could not be serialized into a query string.
    Encode(String),
    /// The configuration file is unreadable or invalid.
    Config(String),
    /// A downloaded data file has no usable structure.
    Parse(String),
}

impl fmt::Display for NwisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NwisError::Io(msg) => write!(f, "IO error: {}", msg),
            NwisError::LengthMismatch { dates, values } => write!(
                f,
                "Length mismatch: {} dates but {} values",
                dates, values
            ),
            NwisError::EmptySeries => write!(f, "Empty series: alignment needs at least one date"),
            NwisError::NoOverlap { first_end, second_start } => write!(
                f,
                "No overlapping dates: one series ends {} before the other starts {}",
                first_end, second_start
            ),
            NwisError::DateNotInSeries(date) => write!(f, "Date {} not found in series", date),
            NwisError::HttpError(code) => write!(f, "HTTP error: {}", code),
            NwisError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            NwisError::Encode(msg) => write!(f, "Encode error: {}", msg),
            NwisError::Config(msg) => write!(f, "Config error: {}", msg),
            NwisError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for NwisError {}

impl From<std::io::Error> for NwisError {
    fn from(err: std::io::Error) -> Self {
        NwisError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 1, d).unwrap()
    }

    #[test]
    fn test_series_descriptor_rejects_site_only_kind() {
        let built = RequestDescriptor::series(
            DataKind::SiteOnly,
            "03284000",
            day(1),
            day(2),
            vec![PARAM_DISCHARGE.to_string()],
        );
        assert!(built.is_none());
    }

    #[test]
    fn test_series_descriptor_requires_a_parameter() {
        let built = RequestDescriptor::series(DataKind::Daily, "03284000", day(1), day(2), vec![]);
        assert!(built.is_none(), "daily request without parameter codes must not build");
    }

    #[test]
    fn test_site_only_descriptor_has_no_dates_or_codes() {
        let site = RequestDescriptor::site_only("03284000");
        assert_eq!(site.data_kind, DataKind::SiteOnly);
        assert!(site.start_date.is_none());
        assert!(site.end_date.is_none());
        assert!(site.parameter_codes.is_empty());
    }

    #[test]
    fn test_data_kind_tokens_round_trip() {
        for kind in [DataKind::Daily, DataKind::Instantaneous, DataKind::SiteOnly] {
            assert_eq!(DataKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(DataKind::from_token(""), None);
        assert_eq!(DataKind::Daily.to_string(), "dv");
    }

    #[test]
    fn test_time_series_new_rejects_length_mismatch() {
        let dates = vec![day(1).and_hms_opt(0, 0, 0).unwrap()];
        let err = TimeSeries::new(dates, vec![]).unwrap_err();
        assert_eq!(err, NwisError::LengthMismatch { dates: 1, values: 0 });
    }

    #[test]
    fn test_error_messages_name_the_failure() {
        assert_eq!(NwisError::HttpError(503).to_string(), "HTTP error: 503");
        assert!(NwisError::EmptySeries.to_string().starts_with("Empty series"));
    }
}
