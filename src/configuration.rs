use crate::{
    format::{CsvRecordProducer, Formattable, FormattingError, OutputFormat},
    http_utils::DEFAULT_WAPI_VERSION,
    retry::RetryConfig,
    fileop::transfer::DEFAULT_CHUNK_SIZE,
};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_APPLICATION_ID: &str = "wapictl";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV: &str = "WAPICTL_CONFIG_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data to file, because of: {cause}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("missing value for property {name:?}")]
    MissingRequiredPropertyValue { name: String },
    #[error("{cause}")]
    FormattingError {
        #[from]
        cause: FormattingError,
    },
}

/// Persistent defaults for talking to a grid manager.
///
/// The password is deliberately absent: it comes from the command line or
/// the `WAPICTL_PASSWORD` environment variable on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_mgr: Option<String>,
    pub wapi_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub ssl_verify: bool,
    /// Seconds; absent means no request timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    pub chunk_size: usize,
    pub retry: RetryConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            grid_mgr: None,
            wapi_version: DEFAULT_WAPI_VERSION.to_string(),
            username: None,
            ssl_verify: true,
            timeout: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryConfig::default(),
        }
    }
}

impl Configuration {
    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(configuration_directory) => {
                let mut default_config_file_path = configuration_directory;
                default_config_file_path.push(DEFAULT_APPLICATION_ID);
                default_config_file_path.push(DEFAULT_CONFIGURATION_FILE_NAME);

                Ok(default_config_file_path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", default_file_path.display());
        Configuration::load_from_file(&default_file_path)
    }

    /// Load the default configuration file, falling back to built-in defaults
    /// when it does not exist yet. Nothing is written on the fallback path.
    pub fn load_or_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        if !default_file_path.exists() {
            debug!(
                "No configuration at {}, using defaults",
                default_file_path.display()
            );
            return Ok(Configuration::default());
        }
        Configuration::load_from_file(&default_file_path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        let configuration = fs::read_to_string(path)
            .map_err(|cause| ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            })?;
        serde_yaml::from_str(&configuration).map_err(|cause| ConfigurationError::FailedToLoadData {
            cause: Box::new(cause),
        })
    }

    pub fn write(&self, writer: Box<dyn Write>) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        // this operation only executes if the directory does not exist
        match path.parent() {
            Some(directory) => fs::create_dir_all(directory)
                .map_err(|_| ConfigurationError::FailedToFindConfigurationDirectory)?,
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(Box::new(file))
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }

    pub fn require_grid_mgr(&self) -> Result<&str, ConfigurationError> {
        self.grid_mgr
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingRequiredPropertyValue {
                name: "grid_mgr".to_string(),
            })
    }

    /// Property names accepted by `config get`.
    pub fn property_names() -> Vec<&'static str> {
        vec![
            "grid_mgr",
            "wapi_version",
            "username",
            "ssl_verify",
            "timeout",
            "chunk_size",
            "retry.max_attempts",
            "retry.backoff_seconds",
            "retry.multiplier",
        ]
    }

    pub fn property(&self, name: &str) -> Option<String> {
        match name {
            "grid_mgr" => self.grid_mgr.clone(),
            "wapi_version" => Some(self.wapi_version.clone()),
            "username" => self.username.clone(),
            "ssl_verify" => Some(self.ssl_verify.to_string()),
            "timeout" => self.timeout.map(|t| t.to_string()),
            "chunk_size" => Some(self.chunk_size.to_string()),
            "retry.max_attempts" => Some(self.retry.max_attempts.to_string()),
            "retry.backoff_seconds" => Some(self.retry.backoff_seconds.to_string()),
            "retry.multiplier" => Some(self.retry.multiplier.to_string()),
            _ => None,
        }
    }
}

impl CsvRecordProducer for Configuration {
    fn csv_header() -> Vec<String> {
        vec!["PROPERTY".to_string(), "VALUE".to_string()]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        Self::property_names()
            .into_iter()
            .map(|name| {
                vec![
                    name.to_string(),
                    self.property(name).unwrap_or_default(),
                ]
            })
            .collect()
    }
}

impl Formattable for Configuration {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => {
                if options.pretty {
                    Ok(serde_json::to_string_pretty(self)?)
                } else {
                    Ok(serde_json::to_string(self)?)
                }
            }
            OutputFormat::Csv(options) => self.to_csv(options.with_headers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormatOptions;

    #[test]
    fn test_defaults() {
        let configuration = Configuration::default();
        assert_eq!(configuration.wapi_version, "2.12");
        assert!(configuration.ssl_verify);
        assert_eq!(configuration.chunk_size, 1024);
        assert_eq!(configuration.retry.max_attempts, 3);
        assert!(configuration.require_grid_mgr().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIGURATION_FILE_NAME);

        let configuration = Configuration {
            grid_mgr: Some("gm.example.com".to_string()),
            username: Some("admin".to_string()),
            ssl_verify: false,
            timeout: Some(60),
            ..Default::default()
        };
        configuration.save(&path).unwrap();

        let loaded = Configuration::load_from_file(&path).unwrap();
        assert_eq!(loaded, configuration);
        assert_eq!(loaded.require_grid_mgr().unwrap(), "gm.example.com");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIGURATION_FILE_NAME);
        fs::write(&path, "grid_mgr: 10.0.0.1\nretry:\n  max_attempts: 5\n").unwrap();

        let loaded = Configuration::load_from_file(&path).unwrap();
        assert_eq!(loaded.grid_mgr.as_deref(), Some("10.0.0.1"));
        assert_eq!(loaded.retry.max_attempts, 5);
        assert_eq!(loaded.retry.multiplier, 2.0);
        assert_eq!(loaded.wapi_version, DEFAULT_WAPI_VERSION);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Configuration::load_from_file(&dir.path().join("absent.yml"));
        assert!(matches!(
            result,
            Err(ConfigurationError::FailedToLoadData { .. })
        ));
    }

    #[test]
    fn test_csv_format() {
        let configuration = Configuration {
            grid_mgr: Some("gm".to_string()),
            ..Default::default()
        };
        let output = configuration
            .format(&OutputFormat::Csv(OutputFormatOptions {
                with_headers: true,
                pretty: false,
            }))
            .unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("PROPERTY,VALUE"));
        assert_eq!(lines.next(), Some("grid_mgr,gm"));
    }
}
