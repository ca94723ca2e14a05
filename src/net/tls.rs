//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

/// Errors loading a certificate/key pair.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no certificates found in {0:?}")]
    NoCertificates(PathBuf),
    #[error("no private key found in {0:?}")]
    NoPrivateKey(PathBuf),
    #[error("rejected certificate/key pair")]
    Config(#[source] std::io::Error),
}

/// Load TLS configuration from PEM certificate and key files.
///
/// The files are checked up front so a wrong path or an empty PEM names the
/// offending file instead of surfacing as a bare rustls error.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    let certs = read_certificates(cert_path)?;
    tracing::debug!(path = ?cert_path, count = certs, "Certificate chain read");
    check_private_key(key_path)?;

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(TlsError::Config)
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn read_certificates(path: &Path) -> Result<usize, TlsError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs.len())
}

fn check_private_key(path: &Path) -> Result<(), TlsError> {
    let mut reader = open(path)?;
    match rustls_pemfile::private_key(&mut reader) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(TlsError::NoPrivateKey(path.to_path_buf())),
        Err(source) => Err(TlsError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pem_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn missing_certificate_names_the_file() {
        let key = pem_file("");
        let err = load_tls_config(Path::new("/no/such/cert.pem"), key.path())
            .await
            .unwrap_err();
        match err {
            TlsError::Read { path, .. } => assert_eq!(path, PathBuf::from("/no/such/cert.pem")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn file_without_pem_blocks_has_no_certificates() {
        let cert = pem_file("this is not a certificate\n");
        let key = pem_file("");
        let err = load_tls_config(cert.path(), key.path()).await.unwrap_err();
        assert!(matches!(err, TlsError::NoCertificates(_)));
    }

    #[test]
    fn key_file_without_key_is_rejected() {
        let key = pem_file("nothing here\n");
        let err = check_private_key(key.path()).unwrap_err();
        assert!(matches!(err, TlsError::NoPrivateKey(_)));
    }
}
