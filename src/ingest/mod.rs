/// Data ingestion from the USGS NWIS web services.
///
/// Submodules:
/// - `requests` - parses web request files into request descriptors.
/// - `query` - encodes a request descriptor as a web service query.
/// - `download` - fetches requests one at a time and saves the responses.
/// - `rdb` - reads downloaded tab-delimited (RDB) data files.
/// - `process` - summarizes data files into per-file output directories.

pub mod download;
pub mod process;
pub mod query;
pub mod rdb;
pub mod requests;
