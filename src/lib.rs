//! Server lifecycle control.
//!
//! Starts an HTTP server on a pre-bound listener in the background, stops it
//! gracefully on request and reports one terminal outcome.
//!
//! # Architecture Overview
//!
//! ```text
//!   args ──▶ cli ──▶ config ──▶ observability ──▶ http router ──▶ net listener
//!                                                                     │
//!                                                                     ▼
//!                                                      ┌──────────────────────────┐
//!    Stopper::stop ◀── signals                         │   LifecycleController    │
//!         │                                            │  plain │ TLS (rustls)    │
//!         └──────────────── graceful shutdown ───────▶ │  spawned accept loop     │
//!                                                      └────────────┬─────────────┘
//!                                                                   │ Closed | Failed
//!                                                                   ▼
//!                                                              Completion ──▶ exit code
//! ```
//!
//! [`error::ErrorAggregator`] is an independent utility for collapsing several
//! failures into one report.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use error::{ErrorAggregator, MultiError, Stage, StageError};
pub use lifecycle::{Completion, LifecycleController, ServerParams, Stopper};
