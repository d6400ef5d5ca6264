/// Runtime configuration: web service endpoint and logging.
///
/// Loaded from a TOML file (default `nwis.toml`) with every field optional.
/// `Config::from_env` also reads a `.env` file so a deployment can point at a
/// different config file (`NWIS_CONFIG`) or service host (`NWIS_BASE_URL`)
/// without editing it.
///
/// ```toml
/// [webservice]
/// base_url = "https://waterservices.usgs.gov/nwis"
/// format = "rdb"
/// timeout_secs = 30
///
/// [logging]
/// level = "info"
/// file = "nwis_ingest.log"
/// timestamps = true
/// ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{self, LogLevel};
use crate::model::NwisError;

/// Fixed USGS NWIS web service host; the data kind is appended as a path.
pub const DEFAULT_BASE_URL: &str = "https://waterservices.usgs.gov/nwis";

/// Output format requested from the service. RDB is the tab-delimited format
/// `ingest::rdb` reads.
pub const DEFAULT_FORMAT: &str = "rdb";

const DEFAULT_CONFIG_PATH: &str = "nwis.toml";

/// Log file name used inside an output directory when none is configured.
const DEFAULT_LOG_FILE_NAME: &str = "nwis_ingest.log";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub webservice: WebServiceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebServiceConfig {
    pub base_url: String,
    pub format: String,
    pub timeout_secs: u64,
}

impl Default for WebServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl Config {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, NwisError> {
        toml::from_str(text).map_err(|e| NwisError::Config(e.to_string()))
    }

    /// Reads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, NwisError> {
        let text = fs::read_to_string(path)
            .map_err(|e| NwisError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Loads `.env`, then the file named by `NWIS_CONFIG` (or `nwis.toml` if
    /// it exists), then applies the `NWIS_BASE_URL` override.
    ///
    /// A missing default config file is not an error; a missing file that
    /// `NWIS_CONFIG` names explicitly is.
    pub fn from_env() -> Result<Self, NwisError> {
        dotenv::dotenv().ok();

        let mut config = match env::var("NWIS_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(base_url) = env::var("NWIS_BASE_URL") {
            config.webservice.base_url = base_url;
        }

        Ok(config)
    }

    /// Configured log level, falling back to `Info` for unknown names.
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_name(&self.logging.level).unwrap_or(LogLevel::Info)
    }

    /// Initializes the global logger from the `[logging]` section.
    pub fn init_logging(&self) {
        logging::init_logger(
            self.log_level(),
            self.logging.file.as_deref(),
            self.logging.timestamps,
        );
    }

    /// Log file for a per-file output directory: the configured file's name
    /// (its directory is dropped) or `nwis_ingest.log`.
    pub fn log_file_in(&self, directory: &Path) -> PathBuf {
        match self.logging.file.as_deref().and_then(|f| Path::new(f).file_name()) {
            Some(name) => directory.join(name),
            None => directory.join(DEFAULT_LOG_FILE_NAME),
        }
    }

    /// Re-initializes the global logger to write into `directory`.
    pub fn init_logging_in(&self, directory: &Path) {
        let path = self.log_file_in(directory);
        logging::init_logger(
            self.log_level(),
            Some(&path.to_string_lossy()),
            self.logging.timestamps,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.webservice.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.webservice.format, "rdb");
        assert_eq!(config.log_level(), LogLevel::Info);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [webservice]
            timeout_secs = 5

            [logging]
            level = "debug"
            file = "nwis.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.webservice.timeout_secs, 5);
        assert_eq!(config.webservice.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("nwis.log"));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = Config::from_toml_str("[webservice\nbase_url = ").unwrap_err();
        assert!(matches!(err, NwisError::Config(_)));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = Config::from_toml_str("[logging]\nlevel = \"chatty\"").unwrap();
        assert_eq!(config.log_level(), LogLevel::Info);
    }

    #[test]
    fn test_log_file_in_output_directory() {
        let output = Path::new("/data/site.txt-output");
        assert_eq!(
            Config::default().log_file_in(output),
            output.join("nwis_ingest.log")
        );

        let config = Config::from_toml_str("[logging]\nfile = \"logs/warnings.log\"").unwrap();
        assert_eq!(config.log_file_in(output), output.join("warnings.log"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load(Path::new("/definitely/not/here/nwis.toml")).unwrap_err();
        assert!(matches!(err, NwisError::Config(_)));
    }
}
