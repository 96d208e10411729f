//! Domain errors for the `AuthN` resolver.

use authn_resolver_sdk::AuthNResolverError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("unsupported signing method '{0}'")]
    UnsupportedSigningMethod(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("no shared secret configured for HS256 verification")]
    MissingSecret,

    #[error("failed to load RSA public key from '{path}': {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("OIDC verifier is misconfigured: {0}")]
    OidcConfig(String),

    #[error("JWKS endpoint unavailable: {0}")]
    JwksUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<jsonwebtoken::errors::Error> for DomainError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(e.to_string())
    }
}

impl From<DomainError> for AuthNResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnsupportedSigningMethod(_) => {
                Self::Unauthorized("Invalid Signing Method".to_owned())
            }
            DomainError::InvalidToken(reason) => Self::Unauthorized(reason),
            DomainError::MissingSecret
            | DomainError::KeyLoad { .. }
            | DomainError::OidcConfig(_) => Self::Configuration(e.to_string()),
            DomainError::JwksUnavailable(reason) => Self::ServiceUnavailable(reason),
            DomainError::Internal(reason) => Self::Internal(reason),
        }
    }
}
