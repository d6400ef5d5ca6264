/// Downloads NWIS data described by a web request file, or reads data files
/// already on disk, and summarizes each file.
///
/// Usage:
///   nwis_ingest <request-file>
///   nwis_ingest -f <data-file>...
///
/// Downloaded files land in `<request-file>-datafiles/` next to the request
/// file, together with `download_report.json`. Every data file that is read
/// gets a `<data-file>-output/` directory holding `summary.json` and the log.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nwis_ingest::config::Config;
use nwis_ingest::ingest::download::{self, HttpFetcher};
use nwis_ingest::ingest::process::{self, FileSummary};
use nwis_ingest::logging::{self, Component};

const USAGE: &str = "usage: nwis_ingest <request-file>\n       nwis_ingest -f <data-file>...";

enum Mode {
    Download(PathBuf),
    Files(Vec<PathBuf>),
}

fn parse_args(args: &[String]) -> Option<Mode> {
    match args {
        [flag, files @ ..] if flag == "-f" || flag == "--files" => {
            if files.is_empty() {
                None
            } else {
                Some(Mode::Files(files.iter().map(PathBuf::from).collect()))
            }
        }
        [request_file] => Some(Mode::Download(PathBuf::from(request_file))),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(mode) = parse_args(&args) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    config.init_logging();

    let files = match mode {
        Mode::Files(files) => files,
        Mode::Download(request_file) => match download_all(&config, &request_file) {
            Some(files) => files,
            None => return ExitCode::FAILURE,
        },
    };

    let processed = process_files(&config, &files);
    if !files.is_empty() && processed == 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Runs the request file and returns the downloaded files, or `None` if the
/// batch could not run at all.
fn download_all(config: &Config, request_file: &Path) -> Option<Vec<PathBuf>> {
    let fetcher = match HttpFetcher::from_config(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            logging::error(Component::System, None, &e.to_string());
            return None;
        }
    };

    match download::run_request_file(&fetcher, config, request_file) {
        Ok(report) if report.summary.total > 0 && report.summary.successful == 0 => None,
        Ok(report) => Some(report.downloaded_files()),
        Err(e) => {
            logging::error(Component::System, None, &e.to_string());
            None
        }
    }
}

/// Reads and summarizes each file into its own output directory. Returns how
/// many files were processed.
fn process_files(config: &Config, files: &[PathBuf]) -> usize {
    let mut processed = 0;
    for path in files {
        let output = match process::output_directory(path) {
            Ok(output) => output,
            Err(e) => {
                logging::error(Component::System, None, &e.to_string());
                continue;
            }
        };
        config.init_logging_in(&output);

        match process::process_file(path, &output) {
            Ok(result) => {
                print_summary(&result.summary);
                processed += 1;
            }
            // Site-only downloads are not series data
            Err(e) => logging::warn(Component::Reader, None, &e.to_string()),
        }
    }
    processed
}

fn print_summary(summary: &FileSummary) {
    println!("\n{}", summary.source);
    if let Some(gage) = &summary.gage_name {
        println!("  {}", gage);
    }
    println!("  {} rows", summary.rows);
    for parameter in &summary.parameters {
        match (parameter.mean, parameter.min, parameter.max) {
            (Some(mean), Some(min), Some(max)) => println!(
                "  {} {}: mean {:.2}, min {:.2}, max {:.2} ({} missing)",
                parameter.code, parameter.description, mean, min, max, parameter.missing
            ),
            _ => println!("  {} {}: no values", parameter.code, parameter.description),
        }
    }
}
