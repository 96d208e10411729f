//! Upstream OAuth credential lifecycle.

pub mod manager;
pub mod oauth;
pub mod registry;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

pub use manager::TokenManager;
pub use oauth::OAuthRefresher;
pub use registry::TokenManagerRegistry;

/// Remaining validity below which a token is treated as expired.
pub const EXPIRY_DELTA: Duration = Duration::from_secs(10);

/// Access token obtained from a provider.
#[derive(Debug, Clone)]
pub struct UpstreamToken {
    access_token: SecretString,
    expires_at: Option<Instant>,
}

impl UpstreamToken {
    #[must_use]
    pub fn new(access_token: SecretString, expires_in: Option<Duration>) -> Self {
        Self {
            access_token,
            expires_at: expires_in.map(|d| Instant::now() + d),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Non-empty and either without expiry or more than [`EXPIRY_DELTA`]
    /// away from it.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.access_token.expose_secret().is_empty() {
            return false;
        }
        self.expires_at
            .is_none_or(|at| at.saturating_duration_since(Instant::now()) > EXPIRY_DELTA)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("token refresh misconfigured: {0}")]
    Config(String),
}

/// Obtains a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// # Errors
    /// Any failure to obtain a token.
    async fn refresh(&self) -> Result<UpstreamToken, TokenError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn token(value: &str, expires_in: Option<Duration>) -> UpstreamToken {
        UpstreamToken::new(SecretString::from(value.to_owned()), expires_in)
    }

    #[test]
    fn validity_rules() {
        assert!(token("t", None).is_valid());
        assert!(token("t", Some(Duration::from_secs(3600))).is_valid());
        assert!(!token("t", Some(Duration::from_secs(5))).is_valid());
        assert!(!token("t", Some(Duration::ZERO)).is_valid());
        assert!(!token("", None).is_valid());
    }
}
