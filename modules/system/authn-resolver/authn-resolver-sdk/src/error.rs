//! Error types for the `AuthN` resolver module.

use thiserror::Error;

/// Errors that can occur when using the `AuthN` resolver API.
#[derive(Debug, Error)]
pub enum AuthNResolverError {
    /// The token is invalid, expired, or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Verification material is missing or unreadable (e.g. RSA key file).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A remote verifier (JWKS endpoint) is not reachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
