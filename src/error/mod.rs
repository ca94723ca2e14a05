//! Error handling subsystem.
//!
//! # Data Flow
//! ```text
//! Setup (synchronous):
//!     parse flags / read config / init logging / listen
//!     → StageError { stage, source }
//!     → wrapped under `configure` by startup
//!
//! Serving (asynchronous):
//!     ServeError → StageError { stage: StartServer, .. }
//!     → Completion
//!
//! Fan-out:
//!     several independent failures → ErrorAggregator → MultiError
//! ```
//!
//! # Design Decisions
//! - The stage label names the phase that failed; no backtraces needed
//! - Intentional shutdown is never an error value
//! - Aggregation passes a lone error through untouched

pub mod aggregate;

use std::error::Error as StdError;
use std::fmt::{self, Write as _};

pub use aggregate::{ErrorAggregator, MultiError};

/// Boxed, thread-safe error used wherever heterogeneous failures meet.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Phase of process setup or serving an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ParseFlags,
    ReadConfig,
    InitLogging,
    Listen,
    Configure,
    StartServer,
}

impl Stage {
    /// Human-readable label used as the error prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ParseFlags => "parse flags",
            Stage::ReadConfig => "read config",
            Stage::InitLogging => "init logging",
            Stage::Listen => "listen",
            Stage::Configure => "configure",
            Stage::StartServer => "start server",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error annotated with the stage it occurred in.
///
/// Displays as `<stage>: <wrapped message>`. The wrapped message is already
/// on that line, so `source()` yields the wrapped error's cause.
#[derive(Debug)]
pub struct StageError {
    stage: Stage,
    source: BoxError,
}

impl StageError {
    pub fn new(stage: Stage, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// The stage this error was annotated with.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The innermost stage in a chain of nested stage annotations.
    ///
    /// `configure: read config: ...` reports [`Stage::ReadConfig`].
    pub fn root_stage(&self) -> Stage {
        match self.source.downcast_ref::<StageError>() {
            Some(inner) => inner.root_stage(),
            None => self.stage,
        }
    }

    /// Consume the annotation, returning the wrapped error.
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.source)
    }
}

impl StdError for StageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.source()
    }
}

/// Render an error with its full cause chain.
///
/// The first line is the error's own message; every `source()` below it
/// follows on its own `caused by:` line.
pub fn report(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        // Writing into a String cannot fail.
        let _ = write!(out, "\ncaused by: {cause}");
        source = cause.source();
    }
    out
}
