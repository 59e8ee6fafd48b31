use thiserror::Error;

/// Errors from talking to the upstream API. These surface to the caller of
/// an ingestion run; recovery policy is the caller's choice.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level failure (unreachable, timeout, TLS, ...).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors while constructing a provider.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// The credential environment variable is not set.
    #[error(transparent)]
    MissingCredential(#[from] shared_utils::env::MissingEnvVarError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
