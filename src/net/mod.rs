//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! host:port from config
//!     → listener.rs (bind, report local address)
//!     → LifecycleController::start
//!     → tls.rs (optional certificate loading, TLS mode only)
//!     → axum-server accept loop
//! ```
//!
//! # Design Decisions
//! - Binding happens before serving so bind failures are setup errors
//! - TLS is optional and chosen once per run

pub mod listener;
pub mod tls;
