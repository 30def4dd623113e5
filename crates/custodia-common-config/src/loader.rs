//! Configuration file loading and parsing.

use crate::types::{BackendKind, CustodiaConfig};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding project configuration, relative to the project root.
pub const CONFIG_DIR: &str = ".custodia";
/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the configuration file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from `.custodia/config.yaml`, or defaults if absent.
    pub fn load(&self) -> Result<CustodiaConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(CustodiaConfig::default());
        }

        self.load_file(&config_path)
    }

    /// Load an explicit file; a missing file is an error here.
    pub fn load_file(&self, path: &Path) -> Result<CustodiaConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let config: CustodiaConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
            ConfigError::ParseError {
                line: None,
                message: e.to_string(),
            }
        })?;

        let mut result = String::with_capacity(content.len());
        let mut last = 0;

        for cap in re.captures_iter(content) {
            let Some(full_match) = cap.get(0) else {
                continue;
            };
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result.push_str(&content[last..full_match.start()]);
            result.push_str(&value);
            last = full_match.end();
        }

        result.push_str(&content[last..]);
        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &CustodiaConfig) -> Result<(), ConfigError> {
        let invalid = |message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::ValidationError {
                message: message.to_string(),
            })
        };

        if config.backend.kind == BackendKind::Sqlite
            && config.backend.sqlite_path.as_os_str().is_empty()
        {
            return invalid("backend.sqlite_path must be set for the sqlite backend");
        }

        if config.audit.buffer_size == 0 {
            return invalid("audit.buffer_size must be greater than 0");
        }

        if config.audit.batch_size == 0 || config.audit.batch_size > config.audit.buffer_size {
            return invalid("audit.batch_size must be between 1 and audit.buffer_size");
        }

        if config.review.interval_days == 0 {
            return invalid("review.interval_days must be greater than 0");
        }

        if config.export.date_format.trim().is_empty() {
            return invalid("export.date_format must not be empty");
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &CustodiaConfig) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
