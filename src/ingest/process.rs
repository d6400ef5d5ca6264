/// Processing of NWIS data files that are already on disk.
///
/// Every data file `name` gets a sibling `{name}-output` directory. The reader's
/// findings go there as `summary.json`; the binary also points its log file at
/// it, so warnings about a file sit next to that file's results.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::helpers;
use crate::ingest::rdb::{self, NwisFile, Parameter};
use crate::logging::{self, Component};
use crate::model::{DataKind, NwisError};

/// Suffix of the per-file output directory.
pub const OUTPUT_SUFFIX: &str = "output";

/// Name of the JSON summary written into the output directory.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub code: String,
    pub description: String,
    /// Rows with a usable value.
    pub count: usize,
    /// Rows where the value was blank or not a number.
    pub missing: usize,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl ParameterSummary {
    fn from_parameter(parameter: &Parameter) -> Self {
        let count = parameter.values.iter().filter(|v| v.is_some()).count();
        Self {
            code: parameter.code.clone(),
            description: parameter.description.clone(),
            count,
            missing: parameter.values.len() - count,
            mean: parameter.stats.map(|s| s.mean),
            max: parameter.stats.map(|s| s.max),
            min: parameter.stats.map(|s| s.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub source: String,
    pub gage_name: Option<String>,
    pub retrieved: Option<NaiveDate>,
    pub timestep: Option<DataKind>,
    pub rows: usize,
    pub first_date: Option<NaiveDateTime>,
    pub last_date: Option<NaiveDateTime>,
    pub parameters: Vec<ParameterSummary>,
}

impl FileSummary {
    pub fn from_file(source: &Path, file: &NwisFile) -> Self {
        Self {
            source: source.display().to_string(),
            gage_name: file.gage_name.clone(),
            retrieved: file.retrieved,
            timestep: file.timestep,
            rows: file.dates.len(),
            first_date: file.dates.first().copied(),
            last_date: file.dates.last().copied(),
            parameters: file.parameters.iter().map(ParameterSummary::from_parameter).collect(),
        }
    }
}

/// A data file that was read and summarized.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub file: NwisFile,
    pub summary: FileSummary,
    pub summary_path: PathBuf,
}

// ============================================================================
// Processing
// ============================================================================

/// Creates (if needed) and returns the `{name}-output` directory next to
/// `path`.
pub fn output_directory(path: &Path) -> Result<PathBuf, NwisError> {
    let location = helpers::split_path(path)?;
    helpers::ensure_directory(&location.directory, &location.sibling_name(OUTPUT_SUFFIX))
}

/// Reads the RDB file at `path` and writes its summary into `output`.
pub fn process_file(path: &Path, output: &Path) -> Result<ProcessedFile, NwisError> {
    let file = rdb::read_rdb_file(path)?;
    let summary = FileSummary::from_file(path, &file);

    let summary_path = output.join(SUMMARY_FILE_NAME);
    let json =
        serde_json::to_string_pretty(&summary).map_err(|e| NwisError::Encode(e.to_string()))?;
    fs::write(&summary_path, json)
        .map_err(|e| NwisError::Io(format!("cannot write {}: {}", summary_path.display(), e)))?;

    logging::info(
        Component::Reader,
        None,
        &format!(
            "{}: {} rows, {} parameter(s), summary in {}",
            path.display(),
            summary.rows,
            summary.parameters.len(),
            output.display()
        ),
    );

    Ok(ProcessedFile {
        file,
        summary,
        summary_path,
    })
}

// ============================================================================
// Tests
// ============================================================================
