//! Error types for the WSAA client.
//!
//! Every fallible operation in this crate returns [`WsaaError`]. The
//! variants distinguish caller precondition violations (recoverable by
//! completing provisioning) from fatal per-call failures and from
//! transport-level outcomes, so callers can decide what to retry.

use thiserror::Error;

/// Errors surfaced by WSAA client operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WsaaError {
    /// The RSA algorithm or crypto provider is not available in this
    /// environment. Fatal; retrying cannot succeed.
    #[error("RSA key generation unavailable: {0}")]
    CryptoUnavailable(#[source] openssl::error::ErrorStack),

    /// Stored or supplied PEM text could not be parsed.
    #[error("malformed key material: {0}")]
    MalformedKeyMaterial(String),

    /// The authority's response document could not be parsed.
    #[error("malformed authority response: {0}")]
    MalformedResponse(String),

    /// No identity record has been provisioned yet.
    #[error("no identity record has been provisioned")]
    NoIdentity,

    /// The identity record exists but a required field is absent.
    /// Carries the first missing field so the caller knows which
    /// provisioning step is outstanding.
    #[error("identity record is missing required field `{field}`")]
    IncompleteIdentity {
        /// Name of the first missing field.
        field: &'static str,
    },

    /// A CSR or CMS signing structure could not be constructed.
    /// Fatal for the call; the same inputs will fail again.
    #[error("signing operation failed: {0}")]
    SigningFailed(#[source] openssl::error::ErrorStack),

    /// The WSAA authority could not be reached. Transient; the caller
    /// may retry with backoff.
    #[error("authority unreachable: {0}")]
    AuthorityUnreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The WSAA authority was reached, understood the request and
    /// declined it. Not retryable without changing the request.
    #[error("authority rejected the login request: {0}")]
    AuthorityRejected(String),

    /// The identity storage collaborator failed.
    #[error("identity storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for WSAA client operations.
pub type Result<T> = std::result::Result<T, WsaaError>;
