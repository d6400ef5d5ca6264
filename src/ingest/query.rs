/// NWIS web service query encoding.
///
/// Serializes a `RequestDescriptor` into the five-key query string the USGS
/// water services accept:
///
/// ```text
/// format=rdb&site=03284000&startDt=2014-01-01&endDt=2014-01-15&parameterCD=00060%2C00065
/// ```
///
/// Keys are always emitted in that order. The service itself is order
/// insensitive; the fixed order keeps URLs reproducible across runs.

use serde::Serialize;

use crate::config::DEFAULT_FORMAT;
use crate::model::{NwisError, RequestDescriptor};

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire form of one request. Field order is serialization order.
#[derive(Debug, Serialize)]
struct NwisQuery<'a> {
    format: &'a str,
    site: &'a str,
    #[serde(rename = "startDt")]
    start_dt: String,
    #[serde(rename = "endDt")]
    end_dt: String,
    #[serde(rename = "parameterCD")]
    parameter_cd: String,
}

/// Encodes `request` with the default `rdb` output format.
pub fn encode_query(request: &RequestDescriptor) -> Result<String, NwisError> {
    encode_query_with_format(request, DEFAULT_FORMAT)
}

/// Encodes `request` with an explicit output format.
///
/// Site-only requests encode with empty `startDt`, `endDt` and `parameterCD`;
/// they go to the `site` endpoint, which ignores those keys.
pub fn encode_query_with_format(
    request: &RequestDescriptor,
    format: &str,
) -> Result<String, NwisError> {
    let query = NwisQuery {
        format,
        site: &request.site_id,
        start_dt: request
            .start_date
            .map(|d| d.format(QUERY_DATE_FORMAT).to_string())
            .unwrap_or_default(),
        end_dt: request
            .end_date
            .map(|d| d.format(QUERY_DATE_FORMAT).to_string())
            .unwrap_or_default(),
        parameter_cd: request.parameter_codes.join(","),
    };

    serde_urlencoded::to_string(&query).map_err(|e| NwisError::Encode(e.to_string()))
}

/// Full request URL: `{base_url}/{service_path}/?{query}`.
///
/// The service path comes from the request's data kind (`dv`, `iv`, `site`).
pub fn request_url(
    base_url: &str,
    request: &RequestDescriptor,
    format: &str,
) -> Result<String, NwisError> {
    let query = encode_query_with_format(request, format)?;
    Ok(format!(
        "{}/{}/?{}",
        base_url.trim_end_matches('/'),
        request.data_kind.service_path(),
        query
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
