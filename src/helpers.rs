/// Numeric, timestamp and filesystem helpers shared by every other module.
///
/// # Clock injection
/// `timestamp_tag_at` takes the clock reading as an argument; the
/// `current_timestamp_tag` wrapper reads the local clock. Tests use the
/// former to stay deterministic.

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::model::NwisError;

/// Format of download timestamp tags: sortable and safe in file names.
const TIMESTAMP_TAG_FORMAT: &str = "%Y-%m-%d_%H.%M.%S.%6f";

// ---------------------------------------------------------------------------
// Numbers and timestamps
// ---------------------------------------------------------------------------

/// Returns `true` if `token` parses as a floating-point number.
///
/// Accepts decimal and scientific notation; surrounding whitespace is ignored.
pub fn is_numeric(token: &str) -> bool {
    let trimmed = token.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}

/// Formats a clock reading as `YYYY-MM-DD_HH.MM.SS.ffffff`.
pub fn timestamp_tag_at(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_TAG_FORMAT).to_string()
}

/// Timestamp tag for the current local time.
pub fn current_timestamp_tag() -> String {
    timestamp_tag_at(Local::now().naive_local())
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// A file path split into its containing directory and base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    /// Containing directory. Never empty: a bare file name resolves to the
    /// current working directory.
    pub directory: PathBuf,
    /// Base name of the file.
    pub name: String,
}

impl FileLocation {
    /// Full path of the file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }

    /// Name of a companion directory for this file: `{name}-{suffix}`,
    /// e.g. `requests.txt-datafiles`. Pair with `ensure_directory` on
    /// `self.directory` to create it next to the file.
    pub fn sibling_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.name, suffix)
    }
}

/// Splits `path` into directory and file name.
pub fn split_path(path: &Path) -> Result<FileLocation, NwisError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    Ok(FileLocation { directory, name })
}

/// Creates `parent/name` (and any missing ancestors) if absent and returns it.
/// Calling it again with the same arguments is a no-op.
pub fn ensure_directory(parent: &Path, name: &str) -> Result<PathBuf, NwisError> {
    let directory = parent.join(name);
    fs::create_dir_all(&directory).map_err(|e| {
        NwisError::Io(format!("cannot create directory {}: {}", directory.display(), e))
    })?;
    Ok(directory)
}

// ---------------------------------------------------------------------------
// Line reading
// ---------------------------------------------------------------------------

/// Feeds every line of `reader` to `consume` with its zero-based number.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD instead of failing
/// the read, so one stray Latin-1 byte costs at most the line it sits on.
/// Line terminators (`\n` or `\r\n`) are stripped. Only read failures are errors.
pub fn for_each_line<R, F>(mut reader: R, mut consume: F) -> Result<(), NwisError>
where
    R: BufRead,
    F: FnMut(usize, &str),
{
    let mut buf = Vec::new();
    let mut number = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        consume(number, line.trim_end_matches(['\r', '\n']));
        number += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
