//! TLS handshakes that observe certificates instead of judging them.
//!
//! The monitor has to connect to hosts serving expired, self-signed or
//! mismatched certificates, so verification is switched off at the transport
//! level: no chain, name or handshake signature check can fail the handshake.
//! A certificate with a key the crypto provider refuses (RSA under 2048 bits,
//! say) is still reported.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{self, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tokio_rustls::TlsConnector;

/// Extra time a handshake may take once the TCP connection is up.
pub const HANDSHAKE_GRACE: Duration = Duration::from_secs(5);

/// Reasons a single address could not be probed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid server name {0:?}")]
    InvalidServerName(String),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("handshake deadline exceeded")]
    HandshakeTimeout,

    #[error("handshake failed: {0}")]
    Handshake(#[source] io::Error),

    #[error("peer presented no certificate")]
    NoCertificate,
}

/// Verifier that accepts any certificate and any handshake signature.
#[derive(Debug)]
struct AcceptAnyCertificate {
    /// Advertised to the peer so it picks a scheme we can name.
    schemes: Vec<SignatureScheme>,
}

impl AcceptAnyCertificate {
    fn new(provider: &CryptoProvider) -> Self {
        Self {
            schemes: provider.signature_verification_algorithms.supported_schemes(),
        }
    }
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

/// Build a connector that completes handshakes regardless of certificate trust.
pub fn observing_connector() -> Result<TlsConnector, rustls::Error> {
    let provider = Arc::new(crypto::ring::default_provider());
    let verifier = AcceptAnyCertificate::new(&provider);

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Handshake with `addr` presenting `host` as SNI and return the leaf certificate.
///
/// The TCP connect is bounded by `connect_timeout`; the whole exchange by
/// `connect_timeout + HANDSHAKE_GRACE`.
pub async fn fetch_leaf(
    connector: &TlsConnector,
    addr: SocketAddr,
    host: &str,
    connect_timeout: Duration,
) -> Result<CertificateDer<'static>, ProbeError> {
    let deadline = Instant::now() + connect_timeout + HANDSHAKE_GRACE;

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| ProbeError::InvalidServerName(host.to_string()))?;

    let stream = time::timeout(connect_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| ProbeError::ConnectTimeout(connect_timeout))?
        .map_err(ProbeError::Connect)?;

    let mut tls = time::timeout_at(deadline, connector.connect(server_name, stream))
        .await
        .map_err(|_| ProbeError::HandshakeTimeout)?
        .map_err(ProbeError::Handshake)?;

    let leaf = tls
        .get_ref()
        .1
        .peer_certificates()
        .and_then(|chain| chain.first())
        .map(|cert| cert.clone().into_owned())
        .ok_or(ProbeError::NoCertificate)?;

    let _ = time::timeout_at(deadline, tls.shutdown()).await;
    Ok(leaf)
}
