//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (topic filter, fmt output to stderr)
//! ```
//!
//! # Design Decisions
//! - Structured fields (address, mode, error) over formatted strings
//! - Filter derived from config, overridable from the environment

pub mod logging;
