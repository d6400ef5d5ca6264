/// NWIS RDB (tab-delimited) data file reader.
///
/// RDB files are what the `dv` and `iv` services return with `format=rdb`.
/// The parts this reader uses:
///
/// ```text
/// # retrieved: 2014-03-11 08:40:40 EDT       (nadww01)
/// #    USGS 03290500 KENTUCKY RIVER AT LOCK 2 AT LOCKPORT, KY
/// #    DD parameter statistic   Description
/// #    06   00060     00003     Discharge, cubic feet per second (Mean)
/// agency_cd	site_no	datetime	06_00060_00003	06_00060_00003_cd
/// 5s	15s	20d	14n	10s
/// USGS	03290500	2014-01-01	1450	A
/// ```
///
/// Instantaneous files carry a time and a time zone column:
/// `USGS	03290500	2014-03-12 01:15	EDT	12.5	P`.
///
/// Values that are blank or not numeric become missing (`None`). Values with
/// a qualifier glued on by underscore (`1450_Eqp`) keep the numeric part.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::helpers::{self, is_numeric};
use crate::logging::{self, Component};
use crate::model::{DataKind, NwisError, TimeSeries};

// ============================================================================
// File Structures
// ============================================================================

/// Summary statistics over the non-missing values of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// One measured parameter found in an RDB file.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Column code, e.g. `06_00060_00003` (DD, parameter, statistic).
    pub code: String,
    pub description: String,
    /// Index of the parameter's column in data rows, once the column header
    /// has been seen.
    pub column: Option<usize>,
    pub values: Vec<Option<f64>>,
    pub stats: Option<ParameterStats>,
}

impl Parameter {
    /// The five digit USGS parameter code, e.g. `00060`.
    pub fn parameter_code(&self) -> Option<&str> {
        self.code.split('_').nth(1)
    }
}

/// Contents of an RDB file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NwisFile {
    pub retrieved: Option<NaiveDate>,
    pub gage_name: Option<String>,
    pub column_names: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub dates: Vec<NaiveDateTime>,
    /// `Daily` if rows carry only dates, `Instantaneous` if they carry times.
    pub timestep: Option<DataKind>,
}

impl NwisFile {
    /// Finds a parameter by full column code (`06_00060_00003`) or by USGS
    /// parameter code (`00060`). The first match wins.
    pub fn parameter(&self, code: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.code == code || p.parameter_code() == Some(code))
    }

    /// Dates and values of one parameter as a `TimeSeries`.
    pub fn series(&self, code: &str) -> Option<TimeSeries> {
        let parameter = self.parameter(code)?;
        TimeSeries::new(self.dates.clone(), parameter.values.clone()).ok()
    }
}

// ============================================================================
// Line Matchers
// ============================================================================

/// `#  06  00060  00003  Discharge, ...` → (`06_00060_00003`, description).
///
/// The leading series identifier is the two digit DD number in older files
/// and a longer TS_ID (`166755`) in current ones; either forms the column
/// code prefix.
fn match_parameter(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('#')?;
    let mut tokens = rest.split_whitespace().peekable();

    let dd = tokens
        .next()
        .filter(|t| t.len() >= 2 && t.chars().all(|c| c.is_ascii_digit()))?;
    let param = tokens.next().filter(|t| is_digits(t, 5))?;

    let mut code = format!("{}_{}", dd, param);
    if let Some(statistic) = tokens.peek().copied().filter(|t| is_digits(t, 5)) {
        code = format!("{}_{}", code, statistic);
        tokens.next();
    }

    let description = tokens.collect::<Vec<_>>().join(" ");
    if description.is_empty() {
        return None;
    }
    Some((code, description))
}

/// `# retrieved: 2014-03-11 08:40:40 EDT` → 2014-03-11.
fn match_retrieved(line: &str) -> Option<NaiveDate> {
    let rest = line.strip_prefix('#')?;
    let (_, after) = rest.split_once("retrieved:")?;
    let date = after.split_whitespace().next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// `#    USGS 03290500 KENTUCKY RIVER ...` → `USGS 03290500 KENTUCKY RIVER ...`.
fn match_gage_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix('#')?;
    let start = rest.find("USGS ")?;
    let gage = rest[start..].trim_end();
    let mut words = gage.split_whitespace().skip(1);
    let site = words.next()?;
    if !site.chars().all(|c| c.is_ascii_digit()) || words.next().is_none() {
        return None;
    }
    Some(gage.to_string())
}

fn match_column_names(line: &str) -> Option<Vec<String>> {
    if !line.starts_with("agency_cd\tsite_no\tdatetime") {
        return None;
    }
    Some(line.trim_end().split('\t').map(String::from).collect())
}

/// Returns the row timestamp and whether it carried a time of day.
fn match_data_row(fields: &[&str]) -> Option<(NaiveDateTime, bool)> {
    let site_ok = !fields.get(1)?.is_empty() && fields[1].chars().all(|c| c.is_ascii_digit());
    if fields.len() < 3 || fields[0] != "USGS" || !site_ok {
        return None;
    }
    parse_row_datetime(fields[2])
}

fn parse_row_datetime(field: &str) -> Option<(NaiveDateTime, bool)> {
    let field = field.trim();
    match field.split_once(' ') {
        Some((date, time)) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let time = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
            Some((date.and_time(time), true))
        }
        None => {
            let date = NaiveDate::parse_from_str(field, "%Y-%m-%d").ok()?;
            Some((date.and_hms_opt(0, 0, 0)?, false))
        }
    }
}

fn is_digits(token: &str, len: usize) -> bool {
    !token.is_empty() && token.len() == len && token.chars().all(|c| c.is_ascii_digit())
}

/// Parses a data cell. Blank and non-numeric cells are missing.
fn parse_value(raw: &str, when: NaiveDateTime) -> Option<f64> {
    let raw = raw.trim();
    if is_numeric(raw) {
        return raw.parse().ok();
    }

    if raw.is_empty() {
        logging::debug(
            Component::Reader,
            None,
            &format!("missing value on {}, recorded as missing", when),
        );
        return None;
    }

    if let Some((number, qualifier)) = raw.split_once('_') {
        if is_numeric(number) {
            logging::debug(
                Component::Reader,
                None,
                &format!("value '{}' on {} split on '_' (qualifier {})", raw, when, qualifier),
            );
            return number.trim().parse().ok();
        }
    }

    logging::warn(
        Component::Reader,
        None,
        &format!("value '{}' on {} is not a number, recorded as missing", raw, when),
    );
    None
}

fn compute_stats(values: &[Option<f64>]) -> Option<ParameterStats> {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return None;
    }
    let sum: f64 = present.iter().sum();
    Some(ParameterStats {
        mean: sum / present.len() as f64,
        max: present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: present.iter().copied().fold(f64::INFINITY, f64::min),
    })
}

// ============================================================================
// Reader
// ============================================================================

#[derive(Default)]
struct RdbAccumulator {
    file: NwisFile,
    saw_time_of_day: bool,
}

impl RdbAccumulator {
    fn consume(&mut self, line: &str) {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.starts_with('#') {
            if let Some(date) = match_retrieved(line) {
                self.file.retrieved = Some(date);
            }
            if let Some(gage) = match_gage_name(line) {
                self.file.gage_name = Some(gage);
            }
            if let Some((code, description)) = match_parameter(line) {
                self.file.parameters.push(Parameter {
                    code,
                    description,
                    column: None,
                    values: Vec::new(),
                    stats: None,
                });
            }
            return;
        }

        if let Some(columns) = match_column_names(line) {
            for parameter in &mut self.file.parameters {
                parameter.column = columns.iter().position(|c| *c == parameter.code);
                if parameter.column.is_none() {
                    logging::warn(
                        Component::Reader,
                        None,
                        &format!("parameter {} has no column in the header", parameter.code),
                    );
                }
            }
            self.file.column_names = columns;
            return;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if let Some((when, has_time)) = match_data_row(&fields) {
            self.saw_time_of_day |= has_time;
            self.file.dates.push(when);
            for parameter in &mut self.file.parameters {
                let value = parameter
                    .column
                    .and_then(|index| fields.get(index))
                    .and_then(|raw| parse_value(raw, when));
                parameter.values.push(value);
            }
        }
    }

    fn finish(mut self) -> Result<NwisFile, NwisError> {
        if self.file.dates.is_empty() {
            return Err(NwisError::Parse("no data rows found".to_string()));
        }

        self.file.timestep = Some(if self.saw_time_of_day {
            DataKind::Instantaneous
        } else {
            DataKind::Daily
        });

        for parameter in &mut self.file.parameters {
            parameter.stats = compute_stats(&parameter.values);
        }
        Ok(self.file)
    }
}

/// Parses RDB text.
pub fn parse_rdb(text: &str) -> Result<NwisFile, NwisError> {
    let mut acc = RdbAccumulator::default();
    for line in text.lines() {
        acc.consume(line);
    }
    acc.finish()
}

/// Parses RDB data from any buffered reader.
pub fn read_rdb<R: BufRead>(reader: R) -> Result<NwisFile, NwisError> {
    let mut acc = RdbAccumulator::default();
    helpers::for_each_line(reader, |_, line| acc.consume(line))?;
    acc.finish()
}

/// Opens and parses an RDB file.
pub fn read_rdb_file(path: &Path) -> Result<NwisFile, NwisError> {
    let file = File::open(path)
        .map_err(|e| NwisError::Io(format!("cannot open {}: {}", path.display(), e)))?;
    read_rdb(BufReader::new(file)).map_err(|e| match e {
        NwisError::Parse(msg) => NwisError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

// ============================================================================
// Tests
// ============================================================================
