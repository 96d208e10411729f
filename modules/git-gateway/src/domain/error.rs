//! Gateway errors.

use http::StatusCode;

use super::Provider;
use super::token::TokenError;

/// Failure of one provider request before a response was obtained.
///
/// Upstream HTTP errors are not represented here: any response the provider
/// returns, 5xx included, is passed back to the client.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("No {0} Settings Configured")]
    NotConfigured(Provider),

    #[error("Access to endpoint not allowed: no claims found in Bearer token")]
    MissingClaims,

    #[error("Access to endpoint not allowed: this part of {0}'s API has been restricted")]
    Restricted(Provider),

    #[error("invalid {provider} upstream target: {reason}")]
    InvalidTarget { provider: Provider, reason: String },

    #[error("{provider} upstream credential is unusable: {reason}")]
    InvalidCredential { provider: Provider, reason: String },

    #[error("{provider} token refresh failed: {source}")]
    TokenRefresh {
        provider: Provider,
        #[source]
        source: TokenError,
    },

    #[error("{provider} upstream call failed: {reason}")]
    Upstream { provider: Provider, reason: String },

    #[error("gateway setup failed: {0}")]
    Setup(String),
}

impl GatewayError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured(_) => StatusCode::NOT_FOUND,
            Self::MissingClaims | Self::Restricted(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::InvalidTarget { .. }
            | Self::InvalidCredential { .. }
            | Self::TokenRefresh { .. }
            | Self::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client. Causes of server-side failures are
    /// only logged.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotConfigured(_) | Self::MissingClaims | Self::Restricted(_) => self.to_string(),
            Self::InvalidTarget { provider, .. }
            | Self::InvalidCredential { provider, .. }
            | Self::TokenRefresh { provider, .. } => {
                format!("Unable to process {provider} endpoint")
            }
            Self::Upstream { provider, .. } => format!("{provider} is unavailable"),
            Self::Setup(_) => "Internal server error".to_owned(),
        }
    }
}
