use std::{path::Path, sync::Arc};

use ::tracing::{info, warn};
use axum_server::tls_rustls::RustlsConfig;
use k8s_openapi::api::core::v1::Secret;
use kube::Api;
use rustls::ServerConfig;
use rustls_pki_types::{pem::PemObject, CertificateDer, PrivateKeyDer};

use crate::errors::CertificateError;

/// File mounted by Kubernetes inside of every Pod, holding the namespace of
/// the service account in use.
pub(crate) const SERVICE_ACCOUNT_NAMESPACE_FILE: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

pub(crate) const TLS_CERT_KEY: &str = "tls.crt";
pub(crate) const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// PEM encoded certificate chain and private key
#[derive(Clone)]
pub(crate) struct TlsMaterial {
    pub(crate) cert: Vec<u8>,
    pub(crate) key: Vec<u8>,
}

impl TlsMaterial {
    /// Extract the certificate and its key from a `kubernetes.io/tls` secret
    pub(crate) fn from_secret(secret: &Secret) -> Result<Self, CertificateError> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        let value = |key: &str| {
            secret
                .data
                .as_ref()
                .and_then(|data| data.get(key))
                .map(|bytes| bytes.0.clone())
                .ok_or_else(|| CertificateError::MissingSecretKey {
                    name: name.clone(),
                    key: key.to_string(),
                })
        };

        Ok(Self {
            cert: value(TLS_CERT_KEY)?,
            key: value(TLS_PRIVATE_KEY_KEY)?,
        })
    }
}

/// Namespace the webhook runs into
pub(crate) async fn current_namespace(path: &Path) -> Result<String, CertificateError> {
    let namespace = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CertificateError::Namespace {
            path: path.display().to_string(),
            source,
        })?;

    Ok(namespace.trim().to_string())
}

pub(crate) async fn fetch_tls_material(
    client: kube::Client,
    namespace: &str,
    name: &str,
) -> Result<TlsMaterial, CertificateError> {
    let secrets: Api<Secret> = Api::namespaced(client, namespace);
    let secret = secrets
        .get(name)
        .await
        .map_err(|source| CertificateError::SecretFetch {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        })?;

    info!(namespace, secret = name, "loaded TLS secret");
    TlsMaterial::from_secret(&secret)
}

/// Build the configuration of the HTTPS server from the TLS secret stored
/// inside of Kubernetes. The key material is never written to disk.
pub(crate) async fn create_tls_config(
    namespace: Option<&str>,
    secret_name: &str,
) -> anyhow::Result<RustlsConfig> {
    let namespace = match namespace {
        Some(namespace) => namespace.to_string(),
        None => current_namespace(Path::new(SERVICE_ACCOUNT_NAMESPACE_FILE)).await?,
    };

    let client = kube::Client::try_default().await?;
    let material = fetch_tls_material(client, &namespace, secret_name).await?;
    let server_config = build_tls_server_config(&material)?;

    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

// Build the TLS server
pub(crate) fn build_tls_server_config(
    material: &TlsMaterial,
) -> Result<ServerConfig, CertificateError> {
    let (cert, key) = load_server_cert_and_key(material)?;

    let mut server_config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(cert, key)?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(server_config)
}

// Load the server certificate chain and key
fn load_server_cert_and_key(
    material: &TlsMaterial,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), CertificateError> {
    let certs = CertificateDer::pem_slice_iter(&material.cert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| CertificateError::Pem {
            key: TLS_CERT_KEY.to_string(),
            source,
        })?;

    if certs.is_empty() {
        return Err(CertificateError::NoCertificate(TLS_CERT_KEY.to_string()));
    }

    let mut keys: Vec<PrivateKeyDer> = PrivateKeyDer::pem_slice_iter(&material.key)
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse private key: {e}");
            }
            it.ok()
        })
        .collect();

    if keys.len() != 1 {
        return Err(CertificateError::PrivateKeyCount {
            key: TLS_PRIVATE_KEY_KEY.to_string(),
            found: keys.len(),
        });
    }

    Ok((certs, keys.remove(0)))
}
