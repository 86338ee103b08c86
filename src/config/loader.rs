//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use super::schema::HarnessConfig;
use super::validation::{validate_config, ValidationError};

/// Environment variable that overrides `endpoint.url`.
pub const ENDPOINT_ENV: &str = "KINESIS_PROBE_ENDPOINT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid TOML for [`HarnessConfig`].
    Parse(toml::de::Error),
    /// The values parsed but do not make sense together.
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load configuration from a TOML file, or defaults when `path` is `None`,
/// then apply environment overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<HarnessConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => HarnessConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        endpoint = %config.endpoint.url,
        shard_count = config.stream.shard_count,
        "configuration loaded"
    );
    Ok(config)
}

/// Apply overrides looked up through `lookup`.
///
/// Takes the lookup as a function so tests need not touch the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut HarnessConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENDPOINT_ENV).filter(|url| !url.is_empty()) {
        config.endpoint.url = url;
    }
}
