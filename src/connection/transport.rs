//! Dialing: TCP connect, keepalive and the optional TLS handshake.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{self, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{info, warn};

use crate::config::{ClientConfig as Config, Hooks};
use crate::error::{ClientError, Result};

/// A byte stream the connection tasks can run over.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin + 'static> Transport for T {}

/// Open the configured connection within the connect timeout.
pub(crate) async fn dial(config: &Config, hooks: &Hooks) -> Result<Box<dyn Transport>> {
    if config.server.is_empty() {
        return Err(ClientError::EmptyServer);
    }
    let addr = config.server_addr();
    match tokio::time::timeout(config.connect_timeout(), open(&addr, config, hooks)).await {
        Ok(stream) => stream,
        Err(_) => Err(ClientError::ConnectTimeout(addr)),
    }
}

async fn open(addr: &str, config: &Config, hooks: &Hooks) -> Result<Box<dyn Transport>> {
    let tcp = TcpStream::connect(addr).await?;
    tcp.set_nodelay(true)?;
    if let Err(e) = enable_keepalive(&tcp) {
        warn!(error = %e, "Failed to enable TCP keepalive");
    }

    if !config.tls {
        info!(server = %addr, "Connected");
        return Ok(Box::new(tcp));
    }

    let tls = match &hooks.tls_config {
        Some(tls) => Arc::clone(tls),
        None => Arc::new(build_tls_config(config)?),
    };
    let host = host_part(addr);
    let server_name = ServerName::try_from(host.to_owned())
        .map_err(|_| ClientError::InvalidServerName(host.to_owned()))?;
    let stream = TlsConnector::from(tls)
        .connect(server_name, tcp)
        .await
        .map_err(|e| ClientError::Tls(e.to_string()))?;

    info!(server = %addr, verify = config.tls_verify, "TLS handshake completed");
    Ok(Box::new(stream))
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

/// `host` from `host:port` or `[v6]:port`.
fn host_part(addr: &str) -> &str {
    let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
    host.trim_start_matches('[').trim_end_matches(']')
}

/// TLS settings from the config: a PEM bundle, the platform roots, or no
/// verification at all.
pub(crate) fn build_tls_config(config: &Config) -> Result<ClientConfig> {
    if !config.tls_verify {
        warn!("TLS certificate verification is disabled");
        return Ok(ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth());
    }

    let mut roots = RootCertStore::empty();
    match &config.tls_ca_file {
        Some(path) => {
            let pem = std::fs::read(path)?;
            for cert in rustls_pemfile::certs(&mut Cursor::new(&pem)) {
                roots
                    .add(cert?)
                    .map_err(|e| ClientError::Tls(e.to_string()))?;
            }
        }
        None => {
            let certs = rustls_native_certs::load_native_certs();
            for cert in certs.certs {
                if let Err(e) = roots.add(cert) {
                    warn!(error = %e, "Failed to add root cert");
                }
            }
            for e in &certs.errors {
                warn!(error = %e, "Error loading native certs");
            }
        }
    }
    if roots.is_empty() {
        return Err(ClientError::Tls("no trust roots available".into()));
    }

    Ok(ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Accepts any server certificate.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
