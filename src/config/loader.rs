//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::validate_config;
use crate::error::BoxError;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "LIFELINE_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for environment variable {key}")]
    Env { key: String, value: String },
    #[error("invalid configuration")]
    Validation(#[source] BoxError),
}

/// Load configuration from `files` (later files win), apply environment
/// overrides from `env`, then validate.
///
/// `env` is usually `std::env::vars()`; only `LIFELINE_*` keys are read.
pub fn read_config<P, I>(files: &[P], env: I) -> Result<ServerConfig, ConfigError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (String, String)>,
{
    let mut merged = toml::Table::new();
    for path in files {
        let path = path.as_ref();
        let table = load_table(path)?;
        tracing::debug!(path = ?path, "Config file loaded");
        merge_tables(&mut merged, table);
    }

    let mut config: ServerConfig = toml::Value::Table(merged)
        .try_into()
        .map_err(|source| ConfigError::Parse {
            path: files
                .last()
                .map(|p| p.as_ref().to_path_buf())
                .unwrap_or_default(),
            source,
        })?;

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively merge `overlay` into `base`. Nested tables merge key by key;
/// any other value replaces what was there.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let toml::Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };

        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, toml::Value::Table(incoming));
    }
}

fn apply_env_overrides<I>(config: &mut ServerConfig, env: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in env {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match name {
            "BIND_HOST" => config.bind_host = value,
            "BIND_PORT" => config.bind_port = parse_env(&key, value)?,
            "BASE_URL" => config.base_url = value,
            "TLS_CERT" => config.tls.cert = value,
            "TLS_KEY" => config.tls.key = value,
            "LOG_LEVEL" => config.log.level = value,
            "LOG_TOPICS" => {
                config.log.topics = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            "SHUTDOWN_GRACE_SECS" => config.shutdown_grace_secs = parse_env(&key, value)?,
            _ => continue,
        }
        tracing::debug!(key = %key, "Config override from environment");
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key: key.to_string(),
        value,
    })
}
