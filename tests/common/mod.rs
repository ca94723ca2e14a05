//! Shared utilities for integration tests.

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

/// Upper bound for a stopped server to report completion.
#[allow(dead_code)]
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind a listener on an ephemeral loopback port.
#[allow(dead_code)]
pub async fn bind_ephemeral() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// HTTP client without connection pooling, so no idle keep-alive connection
/// holds a graceful shutdown open.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Write a TOML config to a temp file that lives as long as the handle.
#[allow(dead_code)]
pub fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Write a self-signed `localhost` certificate and its key to PEM temp files.
#[allow(dead_code)]
pub fn self_signed_pair() -> (tempfile::NamedTempFile, tempfile::NamedTempFile) {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    (write_pem(&cert.pem()), write_pem(&key_pair.serialize_pem()))
}

fn write_pem(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".pem").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Unpooled HTTPS client that accepts the self-signed test certificate.
#[allow(dead_code)]
pub fn https_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
