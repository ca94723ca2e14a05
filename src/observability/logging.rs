//! Structured logging.
//!
//! # Responsibilities
//! - Translate configured log topics into a `tracing` filter
//! - Install the global subscriber once per process
//!
//! # Design Decisions
//! - Topics are plain configuration, not process-wide mutable state
//! - `LIFELINE_LOG` replaces the computed filter wholesale
//! - A subscriber that is already installed is left in place

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "LIFELINE_LOG";

/// Build `EnvFilter` directives from the configured level and topics.
///
/// `*` enables all targets at the base level, `name` enables one target at
/// the base level and `-name` turns a target off.
pub fn filter_directives(config: &LogConfig) -> String {
    let level = config.level.to_ascii_lowercase();
    let mut base = "off".to_string();
    let mut directives = Vec::new();

    for topic in &config.topics {
        let topic = topic.trim();
        if topic == "*" {
            base = level.clone();
        } else if let Some(name) = topic.strip_prefix('-') {
            directives.push(format!("{name}=off"));
        } else if !topic.is_empty() {
            directives.push(format!("{topic}={level}"));
        }
    }

    std::iter::once(base)
        .chain(directives)
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the filter, preferring `LIFELINE_LOG` when set.
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(filter_directives(config)),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, which is the
/// normal case in tests that start several servers in one process.
pub fn try_init(config: &LogConfig) -> Result<bool, tracing_subscriber::filter::ParseError> {
    let filter = build_filter(config)?;
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();
    Ok(installed)
}
