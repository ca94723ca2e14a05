//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve and bind the configured `host:port`
//! - Report the actual bound address (ephemeral ports included)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    /// Bound, but the OS would not report the local address.
    #[error("failed to read local address")]
    LocalAddr(#[source] std::io::Error),
}

/// Bind a TCP listener to `address` (`host:port`, hostnames allowed).
pub async fn bind(address: &str) -> Result<(TcpListener, SocketAddr), ListenerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.to_string(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(ListenerError::LocalAddr)?;

    tracing::info!(address = %local_addr, "Listener bound");

    Ok((listener, local_addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let (_listener, addr) = bind("127.0.0.1:0").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn occupied_port_is_a_bind_error() {
        let (_held, addr) = bind("127.0.0.1:0").await.unwrap();
        let err = bind(&addr.to_string()).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
        assert!(err.to_string().starts_with(&format!("failed to bind {addr}")));
    }
}
