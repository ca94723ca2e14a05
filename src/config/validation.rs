//! Configuration validation.
//!
//! Every check runs; failures are collected in an [`ErrorAggregator`] so a
//! single pass reports everything wrong with a config.

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::error::{BoxError, ErrorAggregator};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in a config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bind_host must not be empty")]
    EmptyBindHost,
    #[error("base_url {0:?} must be empty or start with '/' and not end with '/'")]
    BaseUrl(String),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("log topic {0:?} is empty")]
    LogTopic(String),
    #[error("request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate `config`, returning every failure at once.
///
/// With one failure the returned error is that [`ValidationError`]; with
/// several it is a [`crate::error::MultiError`].
pub fn validate_config(config: &ServerConfig) -> Result<(), BoxError> {
    let mut errors = ErrorAggregator::new();

    if config.bind_host.trim().is_empty() {
        errors.add(Some(ValidationError::EmptyBindHost));
    }

    let base_url = &config.base_url;
    if !base_url.is_empty() && (!base_url.starts_with('/') || base_url.ends_with('/')) {
        errors.add(Some(ValidationError::BaseUrl(base_url.clone())));
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.add(Some(ValidationError::LogLevel(config.log.level.clone())));
    }

    for topic in &config.log.topics {
        let name = topic.strip_prefix('-').unwrap_or(topic);
        if name.trim().is_empty() {
            errors.add(Some(ValidationError::LogTopic(topic.clone())));
        }
    }

    if config.request_timeout_secs == 0 {
        errors.add(Some(ValidationError::ZeroRequestTimeout));
    }

    if config.tls.is_partial() {
        tracing::warn!(
            cert = %config.tls.cert,
            key = %config.tls.key,
            "TLS needs both cert and key; serving plain HTTP"
        );
    }

    match errors.resolve() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
