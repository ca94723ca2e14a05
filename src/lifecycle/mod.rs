//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse flags → Read config → Init logging → Build router → Listen
//!     → LifecycleController::start → Running
//!
//! Serving (controller.rs):
//!     spawned task: accept loop (plain or TLS)
//!     → ServeOutcome { Closed | Failed }
//!     → Completion (completion.rs), resolved exactly once
//!
//! Shutdown (shutdown.rs):
//!     Stopper::stop → Running → ShuttingDown → graceful drain → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Stopper::stop
//! ```
//!
//! # Design Decisions
//! - Start and stop never block; only the completion is awaited
//! - An intentional stop is a distinct outcome, not a filtered error
//! - Stop is guarded so only the first effective call acts
//! - No forced termination: a drain that never ends keeps the wait pending

pub mod completion;
pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use completion::Completion;
pub use controller::{
    LifecycleController, LifecycleError, ServeError, ServeMode, ServeOutcome, ServerParams,
};
pub use shutdown::{LifecycleState, Stopper};
