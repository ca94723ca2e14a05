//! HTTP application served by the controller.
//!
//! # Data Flow
//! ```text
//! accepted connection (plain or TLS)
//!     → TraceLayer
//!     → request.rs (X-Request-ID set + propagated)
//!     → TimeoutLayer
//!     → router.rs handlers, mounted under base_url
//! ```

pub mod request;
pub mod router;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use router::build_router;
