use thiserror::Error;

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("admission request does not contain an object")]
    MissingObject,

    #[error("cannot decode object metadata: {0}")]
    ObjectDecode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("cannot serialize JSON patch: {0}")]
    PatchSerialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("cannot read namespace from {path}: {source}")]
    Namespace {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot fetch secret {namespace}/{name}: {source}")]
    SecretFetch {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("secret {name} missing {key}")]
    MissingSecretKey { name: String, key: String },

    #[error("cannot parse PEM data from {key}: {source}")]
    Pem {
        key: String,
        #[source]
        source: rustls_pki_types::pem::Error,
    },

    #[error("expected at least one certificate in {0}, found none")]
    NoCertificate(String),

    #[error("expected exactly one private key in {key}, found {found}")]
    PrivateKeyCount { key: String, found: usize },

    #[error("cannot build TLS server configuration: {0}")]
    Tls(#[from] rustls::Error),
}
