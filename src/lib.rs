/// NWIS ingest tooling.
///
/// Reads USGS NWIS web request files, turns each request into a web service
/// query, downloads the resulting RDB files, and aligns the series they
/// contain by date range for side-by-side comparison.
///
/// Modules:
/// - `model` - shared data types and the error enum.
/// - `helpers` - numeric checks, timestamp tags, path handling.
/// - `config` - TOML / environment configuration.
/// - `logging` - structured console and file logging.
/// - `ingest` - request files, query encoding, downloads, RDB reading, file summaries.
/// - `analysis` - series alignment and subsetting.

pub mod analysis;
pub mod config;
pub mod helpers;
pub mod ingest;
pub mod logging;
pub mod model;
