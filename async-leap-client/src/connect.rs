// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Connection establishment.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

use leap_types::{Error, Result};

/// The port a bridge serves LEAP on.
pub const LEAP_PORT: u16 = 8081;

/// A byte stream suitable for a LEAP session.
pub trait LeapStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> LeapStream for T {}

/// Produces authenticated byte streams to a bridge, one per session.
///
/// The session supervisor calls [`Connector::connect`] on every connect
/// and reconnect attempt. Implementations other than [`TlsConnector`]
/// exist mainly for tests, which hand out in-memory streams.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a fresh stream to the bridge.
    async fn connect(&self) -> Result<Box<dyn LeapStream>>;
}

/// The production connector: TCP plus mutually-authenticated TLS using
/// the certificates provisioned during pairing.
pub struct TlsConnector {
    host: String,
    port: u16,
    server_name: ServerName<'static>,
    config: Arc<ClientConfig>,
}

impl TlsConnector {
    /// Build a connector from the bridge address and the three PEM files
    /// written by the pairing tool: the bridge's CA certificate, the
    /// client certificate and the client private key.
    ///
    /// All certificate problems surface here as [`Error::Config`], before
    /// any connection is attempted.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        ca_cert: &Path,
        client_cert: &Path,
        client_key: &Path,
    ) -> Result<Self> {
        let host = host.into();

        let mut roots = RootCertStore::empty();
        for cert in load_certs(ca_cert)? {
            roots
                .add(cert)
                .map_err(|e| Error::Config(format!("invalid bridge CA certificate: {e}")))?;
        }

        let certs = load_certs(client_cert)?;
        let key = load_private_key(client_key)?;

        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_client_auth_cert(certs, key)
            .map_err(|e| Error::Config(format!("invalid client certificate chain: {e}")))?;

        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| Error::Config(format!("invalid hostname {host:?}: {e}")))?;

        Ok(Self {
            host,
            port,
            server_name,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl Connector for TlsConnector {
    async fn connect(&self) -> Result<Box<dyn LeapStream>> {
        debug!("connecting to {}:{}", self.host, self.port);
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let connector = tokio_rustls::TlsConnector::from(self.config.clone());
        let tls = connector.connect(self.server_name.clone(), stream).await?;
        Ok(Box::new(tls))
    }
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Config(format!("malformed PEM in {}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(Error::Config(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| Error::Config(format!("malformed PEM in {}: {e}", path.display())))?
        .ok_or_else(|| Error::Config(format!("no private key found in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_certificate_files_are_a_config_error() {
        let result = TlsConnector::new(
            "192.168.1.40",
            LEAP_PORT,
            "/nonexistent/ca.crt".as_ref(),
            "/nonexistent/client.crt".as_ref(),
            "/nonexistent/client.key".as_ref(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
