//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the server process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind the listener to.
    pub bind_host: String,

    /// Port to bind the listener to. `0` picks an ephemeral port.
    pub bind_port: u16,

    /// Path prefix the application is mounted under (e.g. "/calls").
    pub base_url: String,

    /// TLS certificate and key. TLS is used only when both are set.
    pub tls: TlsConfig,

    /// Logging level and topic filters.
    pub log: LogConfig,

    /// How long in-flight connections may take to drain on stop.
    pub shutdown_grace_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
            base_url: String::new(),
            tls: TlsConfig::default(),
            log: LogConfig::default(),
            shutdown_grace_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        if self.bind_host.contains(':') {
            // IPv6 literal
            format!("[{}]:{}", self.bind_host, self.bind_port)
        } else {
            format!("{}:{}", self.bind_host, self.bind_port)
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// TLS certificate and key paths (PEM). Empty means unset.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate chain file.
    pub cert: String,

    /// Path to private key file.
    pub key: String,
}

impl TlsConfig {
    /// Exactly one of cert/key configured.
    pub fn is_partial(&self) -> bool {
        self.cert.is_empty() != self.key.is_empty()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Base level (trace, debug, info, warn, error, off).
    pub level: String,

    /// Topic filters. `*` enables everything at the base level, `name`
    /// enables a target, `-name` silences it.
    pub topics: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            topics: vec!["-hyper".to_string(), "-rustls".to_string(), "*".to_string()],
        }
    }
}
