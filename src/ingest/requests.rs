/// Web request file parser.
///
/// A request file lists one download per line, tab separated:
///
/// ```text
/// # data_type	site_num	start_date	end_date	parameters
/// dv	03284000	2014-01-01	2014-03-10	00060	00065
/// iv	03375000	2014-02-12	2014-02-19	00010	00045	00060
/// site	03284000
/// ```
///
/// Every line is classified on its own into a `RequestLine`; the file is then
/// a fold over the classified lines. Lines that match no shape are skipped:
/// request files are hand edited and blank or stray lines are normal.

use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::helpers;
use crate::logging::{self, Component};
use crate::model::{DataKind, NwisError, RequestDescriptor, RequestFile};

/// Request file dates are `YYYY-M-D`; month and day may be one or two digits.
const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// What a single request-file line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestLine {
    /// `#` comment line; its tab-separated remainder names the columns.
    Header(Vec<String>),
    /// Daily or instantaneous data request.
    DataRequest(RequestDescriptor),
    /// `site` line requesting site metadata only.
    SiteOnly(RequestDescriptor),
    Unrecognized,
}

/// Classifies one line. Matchers run in order: header, data request, site.
///
/// Leading space indentation is ignored. Tabs are significant, since a data
/// request may start with an empty kind column.
pub fn classify_line(line: &str) -> RequestLine {
    let line = line.trim_start_matches(' ').trim_end_matches(['\r', '\n']);

    match_header(line)
        .or_else(|| match_data_request(line))
        .or_else(|| match_site_only(line))
        .unwrap_or(RequestLine::Unrecognized)
}

fn match_header(line: &str) -> Option<RequestLine> {
    let rest = line.strip_prefix('#')?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some(RequestLine::Header(
        rest.split('\t').map(|name| name.trim().to_string()).collect(),
    ))
}

fn match_data_request(line: &str) -> Option<RequestLine> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 5 {
        return None;
    }

    // A blank kind column falls back to daily values.
    let data_kind = match fields[0].trim() {
        "" => DataKind::Daily,
        token => match DataKind::from_token(token)? {
            DataKind::SiteOnly => return None,
            kind => kind,
        },
    };

    let site_id = fields[1].trim();
    if !is_site_id(site_id) {
        return None;
    }

    let start_date = parse_request_date(fields[2])?;
    let end_date = parse_request_date(fields[3])?;

    let parameter_codes: Vec<String> = fields[4..]
        .join("\t")
        .trim()
        .split('\t')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(String::from)
        .collect();

    RequestDescriptor::series(data_kind, site_id, start_date, end_date, parameter_codes)
        .map(RequestLine::DataRequest)
}

fn match_site_only(line: &str) -> Option<RequestLine> {
    let mut fields = line.split('\t');
    if fields.next()?.trim() != "site" {
        return None;
    }
    let site_id = fields.next()?.trim();
    if !is_site_id(site_id) {
        return None;
    }
    Some(RequestLine::SiteOnly(RequestDescriptor::site_only(site_id)))
}

fn is_site_id(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Parses a `YYYY-M-D` date field. Requires a four digit year and one or two
/// digit month and day; anything else is not a request date.
fn parse_request_date(field: &str) -> Option<NaiveDate> {
    let field = field.trim();
    let parts: Vec<&str> = field.split('-').collect();
    let shape_ok = parts.len() == 3
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()))
        && parts[0].len() == 4
        && (1..=2).contains(&parts[1].len())
        && (1..=2).contains(&parts[2].len());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(field, REQUEST_DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Folding
// ---------------------------------------------------------------------------

/// Accumulates classified lines into a `RequestFile`.
///
/// Header lines replace the column names rather than appending to them: the
/// most recent header is the one that describes the rows below it.
fn accumulate(mut acc: RequestFile, line: RequestLine) -> RequestFile {
    match line {
        RequestLine::Header(names) => acc.column_names = names,
        RequestLine::DataRequest(request) | RequestLine::SiteOnly(request) => {
            acc.requests.push(request)
        }
        RequestLine::Unrecognized => {}
    }
    acc
}

/// Parses request-file text. Never fails: unmatched lines are skipped.
pub fn parse_requests(text: &str) -> RequestFile {
    text.lines()
        .enumerate()
        .map(|(number, line)| classify_logged(number, line))
        .fold(RequestFile::default(), accumulate)
}

/// Parses a request file from any buffered reader.
///
/// Only read failures are errors. Undecodable bytes never fail the read;
/// they can only make their own line unrecognized.
pub fn read_requests<R: BufRead>(reader: R) -> Result<RequestFile, NwisError> {
    let mut acc = RequestFile::default();
    helpers::for_each_line(reader, |number, line| {
        acc = accumulate(std::mem::take(&mut acc), classify_logged(number, line));
    })?;
    Ok(acc)
}

/// Opens and parses a request file.
pub fn read_request_file(path: &Path) -> Result<RequestFile, NwisError> {
    let file = File::open(path)
        .map_err(|e| NwisError::Io(format!("cannot open {}: {}", path.display(), e)))?;
    let parsed = read_requests(BufReader::new(file))?;

    logging::info(
        Component::RequestFile,
        None,
        &format!("{}: {} request(s)", path.display(), parsed.requests.len()),
    );
    Ok(parsed)
}

fn classify_logged(number: usize, line: &str) -> RequestLine {
    let classified = classify_line(line);
    if classified == RequestLine::Unrecognized && !line.trim().is_empty() {
        logging::debug(
            Component::RequestFile,
            None,
            &format!("line {} skipped: no request shape matched", number + 1),
        );
    }
    classified
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
