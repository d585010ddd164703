//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rcgen::{Certificate, CertificateParams};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use ssl_watch::probe::ProbeSettings;

/// A TLS server presenting a fixed certificate.
pub struct TlsServer {
    pub addr: SocketAddr,
    pub der: Vec<u8>,
}

/// Self-signed certificate for `names`, valid from now on.
pub fn certificate(names: &[&str]) -> Certificate {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    rcgen::generate_simple_self_signed(names).unwrap()
}

/// Self-signed certificate for `names` that expired in 2001.
pub fn expired_certificate(names: &[&str]) -> Certificate {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let mut params = CertificateParams::new(names);
    params.not_before = rcgen::date_time_ymd(2000, 1, 1);
    params.not_after = rcgen::date_time_ymd(2001, 1, 1);
    Certificate::from_params(params).unwrap()
}

/// Serve `cert` on an ephemeral loopback port until the test ends.
pub async fn start_tls_server(cert: Certificate) -> TlsServer {
    let der = cert.serialize_der().unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(cert.serialize_private_key_der()));

    let config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![CertificateDer::from(der.clone())], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let acceptor = acceptor.clone();
                    tokio::spawn(async move {
                        if let Ok(stream) = acceptor.accept(socket).await {
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            drop(stream);
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    TlsServer { addr, der }
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub fn fast_settings() -> ProbeSettings {
    ProbeSettings {
        connect_timeout: Duration::from_secs(2),
        lookup_timeout: Duration::from_secs(2),
    }
}

pub fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
