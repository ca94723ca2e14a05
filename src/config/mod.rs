//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config files (TOML, in order)
//!     → loader.rs (parse, deep-merge, deserialize)
//!     → LIFELINE_* environment overrides
//!     → validation.rs (semantic checks, all failures aggregated)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty or missing config is valid
//! - Later files override earlier ones key by key
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, ConfigError, ENV_PREFIX};
pub use schema::{LogConfig, ServerConfig, TlsConfig};
