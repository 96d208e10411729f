//! Strategy trait for bearer token verification.

use async_trait::async_trait;

use crate::error::AuthNResolverError;
use crate::models::AuthenticationResult;

/// One verification strategy: shared-secret JWT or a third-party identity
/// provider. Strategies are built by the resolver from the active policy.
#[async_trait]
pub trait AuthenticatorPlugin: Send + Sync {
    /// Verify a bearer token and return its claims.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is invalid, expired, or malformed
    /// - `ServiceUnavailable` if verification material cannot be fetched
    /// - `Internal` for unexpected errors
    async fn authenticate(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError>;
}
