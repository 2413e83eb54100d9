//! Administrative API TLS plumbing (§4.3, §9), grounded on
//! `original_source/session-manager/common/otsapi/OgonServerSSL.h`: peer
//! certificate verification is deliberately disabled (clients authenticate
//! by `authToken`, not by client cert), and socket teardown is fork-aware.

use std::io;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::{danger::ClientCertVerified, danger::ClientCertVerifier};
use rustls::{DigitallySignedStruct, ServerConfig};

/// Accepts any client certificate, or none — the original's documented
/// "SSL socket override disables peer-cert authorization": the admin
/// endpoint authenticates by `authToken`, not client cert.
#[derive(Debug)]
struct NoClientAuth;

impl ClientCertVerifier for NoClientAuth {
    fn offer_client_auth(&self) -> bool {
        false
    }

    fn client_auth_mandatory(&self) -> bool {
        false
    }

    fn root_hint_subjects(&self) -> &[rustls::DistinguishedName] {
        &[]
    }

    fn verify_client_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<ClientCertVerified, rustls::Error> {
        Ok(ClientCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ED25519,
        ]
    }
}

pub fn load_server_config(cert_path: &Path, key_path: &Path) -> io::Result<ServerConfig> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;

    let config = ServerConfig::builder()
        .with_client_cert_verifier(Arc::new(NoClientAuth))
        .with_single_cert(certs, key)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(config)
}

fn load_certs(path: &Path) -> io::Result<Vec<CertificateDer<'static>>> {
    let file = std::fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);
    rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()
}

fn load_key(path: &Path) -> io::Result<PrivateKeyDer<'static>> {
    let file = std::fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)?
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no private key found"))
}

/// Guards socket teardown against a fork that duplicated the listening
/// fd into a child process: records the creating PID and skips close if
/// the current PID differs at drop time, the direct port of
/// `OgonServerSSL`'s rationale.
pub struct ForkAwareListener {
    inner: Option<std::net::TcpListener>,
    creator_pid: u32,
}

impl ForkAwareListener {
    pub fn new(inner: std::net::TcpListener) -> Self {
        Self { inner: Some(inner), creator_pid: std::process::id() }
    }

    pub fn into_inner(mut self) -> std::net::TcpListener {
        self.inner.take().expect("ForkAwareListener::into_inner called twice")
    }
}

impl Drop for ForkAwareListener {
    fn drop(&mut self) {
        if std::process::id() != self.creator_pid {
            // A forked child: let the listener fd leak rather than close
            // the parent's socket out from under it.
            if let Some(listener) = self.inner.take() {
                std::mem::forget(listener);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_aware_listener_closes_normally_in_creating_process() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let guarded = ForkAwareListener::new(listener);
        drop(guarded);
        // No panic / leak assertion possible in-process; this exercises
        // the non-forked path without special-casing teardown.
    }

    #[test]
    fn into_inner_returns_the_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let guarded = ForkAwareListener::new(listener);
        let _inner = guarded.into_inner();
    }
}
