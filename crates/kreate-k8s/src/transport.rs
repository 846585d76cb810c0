//! HTTP access to the cluster's API server.

use std::io::ErrorKind;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use ureq::tls::{Certificate, ClientCert, PemItem, PrivateKey, RootCerts, TlsConfig};

use crate::kubeconfig::{Cluster, Kubeconfig, User};

const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
    #[error("kubeconfig has no current cluster")]
    NoCluster,
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("GET {url} returned an invalid JSON body")]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid credentials: {0}")]
    Credentials(String),
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Http(#[from] ureq::Error),
}

impl TransportError {
    #[must_use]
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, Self::ConnectionRefused(_))
    }
}

/// Performs authenticated GET requests against the current cluster.
pub trait Transport: Send + Sync {
    /// Fetch `url` using the credentials of the current context and decode the body as JSON.
    fn get_json(&self, kubeconfig: &Kubeconfig, url: &str) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn get_json(&self, kubeconfig: &Kubeconfig, url: &str) -> Result<Value, TransportError> {
        (**self).get_json(kubeconfig, url)
    }
}

/// Builds a fresh agent per request from the current context's TLS material.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

fn read_material(
    kubeconfig: &Kubeconfig,
    data: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<Vec<u8>>, TransportError> {
    if let Some(data) = data {
        let decoded = STANDARD
            .decode(data.trim())
            .map_err(|err| TransportError::Credentials(err.to_string()))?;
        return Ok(Some(decoded));
    }
    if let Some(file) = file {
        let path = kubeconfig.resolve_path(file);
        let content = std::fs::read(&path).map_err(|source| TransportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        return Ok(Some(content));
    }
    Ok(None)
}

fn parse_certificates(pem: &[u8]) -> Result<Vec<Certificate<'static>>, TransportError> {
    let mut certs = Vec::new();
    for item in ureq::tls::parse_pem(pem) {
        if let PemItem::Certificate(cert) =
            item.map_err(|err| TransportError::Credentials(err.to_string()))?
        {
            certs.push(cert.to_owned());
        }
    }
    if certs.is_empty() {
        return Err(TransportError::Credentials(
            "no certificate found in PEM data".to_string(),
        ));
    }
    Ok(certs)
}

fn parse_private_key(pem: &[u8]) -> Result<PrivateKey<'static>, TransportError> {
    for item in ureq::tls::parse_pem(pem) {
        if let PemItem::PrivateKey(key) =
            item.map_err(|err| TransportError::Credentials(err.to_string()))?
        {
            return Ok(key.to_owned());
        }
    }
    Err(TransportError::Credentials(
        "no private key found in PEM data".to_string(),
    ))
}

fn tls_config(
    kubeconfig: &Kubeconfig,
    cluster: &Cluster,
    user: Option<&User>,
) -> Result<TlsConfig, TransportError> {
    let mut tls = TlsConfig::builder().disable_verification(cluster.insecure_skip_tls_verify);

    if let Some(ca) = read_material(
        kubeconfig,
        cluster.certificate_authority_data.as_deref(),
        cluster.certificate_authority.as_deref(),
    )? {
        let certs = parse_certificates(&ca)?;
        tls = tls.root_certs(RootCerts::new_with_certs(&certs));
    }

    if let Some(user) = user {
        let cert = read_material(
            kubeconfig,
            user.client_certificate_data.as_deref(),
            user.client_certificate.as_deref(),
        )?;
        let key = read_material(
            kubeconfig,
            user.client_key_data.as_deref(),
            user.client_key.as_deref(),
        )?;
        if let (Some(cert), Some(key)) = (cert, key) {
            let chain = parse_certificates(&cert)?;
            let key = parse_private_key(&key)?;
            tls = tls.client_cert(Some(ClientCert::new_with_certs(&chain, key)));
        }
    }

    Ok(tls.build())
}

fn authorization(kubeconfig: &Kubeconfig, user: &User) -> Result<Option<String>, TransportError> {
    if let Some(token) = &user.token {
        return Ok(Some(format!("Bearer {token}")));
    }
    if let Some(file) = &user.token_file {
        let path = kubeconfig.resolve_path(file);
        let token = std::fs::read_to_string(&path).map_err(|source| TransportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        return Ok(Some(format!("Bearer {}", token.trim())));
    }
    if let (Some(username), Some(password)) = (&user.username, &user.password) {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        return Ok(Some(format!("Basic {encoded}")));
    }
    Ok(None)
}

fn classify(err: ureq::Error, url: &str) -> TransportError {
    match err {
        ureq::Error::Io(io) if io.kind() == ErrorKind::ConnectionRefused => {
            TransportError::ConnectionRefused(io.to_string())
        }
        ureq::Error::ConnectionFailed => TransportError::ConnectionRefused(url.to_string()),
        ureq::Error::StatusCode(status) => TransportError::Status {
            url: url.to_string(),
            status,
        },
        other => TransportError::Http(other),
    }
}

impl Transport for UreqTransport {
    fn get_json(&self, kubeconfig: &Kubeconfig, url: &str) -> Result<Value, TransportError> {
        let cluster = kubeconfig.current_cluster().ok_or(TransportError::NoCluster)?;
        let user = kubeconfig.current_user();

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .tls_config(tls_config(kubeconfig, cluster, user)?)
            .build()
            .into();

        let mut request = agent.get(url).header("Accept", "application/json");
        if let Some(user) = user
            && let Some(auth) = authorization(kubeconfig, user)?
        {
            request = request.header("Authorization", auth);
        }

        tracing::debug!(url, "GET");
        let mut response = request.call().map_err(|err| classify(err, url))?;
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_string()
            .map_err(|err| classify(err, url))?;
        serde_json::from_str(&body).map_err(|source| TransportError::InvalidBody {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_takes_precedence_over_basic_auth() {
        let config = Kubeconfig::default();
        let user = User {
            token: Some("abc".to_string()),
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
            ..User::default()
        };
        assert_eq!(
            authorization(&config, &user).expect("auth").as_deref(),
            Some("Bearer abc")
        );

        let basic = User {
            token: None,
            ..user
        };
        assert_eq!(
            authorization(&config, &basic).expect("auth").as_deref(),
            Some("Basic YWRtaW46c2VjcmV0")
        );
        assert_eq!(
            authorization(&config, &User::default()).expect("auth"),
            None
        );
    }

    #[test]
    fn invalid_inline_material_is_a_credentials_error() {
        let config = Kubeconfig::default();
        let err = read_material(&config, Some("not base64!"), None).expect_err("decode");
        assert!(matches!(err, TransportError::Credentials(_)));
        assert!(read_material(&config, None, None).expect("none").is_none());
    }

    #[test]
    fn connection_failures_are_classified_as_refused() {
        let refused = ureq::Error::Io(std::io::Error::from(ErrorKind::ConnectionRefused));
        assert!(classify(refused, "https://localhost:1").is_connection_refused());
        assert!(classify(ureq::Error::ConnectionFailed, "https://localhost:1").is_connection_refused());
        assert!(matches!(
            classify(ureq::Error::StatusCode(404), "https://localhost:1/x"),
            TransportError::Status { status: 404, .. }
        ));
    }
}
