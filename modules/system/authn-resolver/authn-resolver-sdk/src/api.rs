//! Public API trait for the `AuthN` resolver.

use async_trait::async_trait;
use gateway_security::TenantConfig;

use crate::error::AuthNResolverError;
use crate::models::AuthenticationResult;

/// Public API trait for the `AuthN` resolver.
///
/// The resolver owns the configured policy and picks the verification
/// strategy for the given tenant configuration:
///
/// ```ignore
/// let result = authn.authenticate(&tenant_config, "eyJhbGciOi...").await?;
/// let claims = result.claims;
/// ```
#[async_trait]
pub trait AuthNResolverClient: Send + Sync {
    /// Authenticate a bearer token against the tenant's verification material.
    ///
    /// # Arguments
    ///
    /// * `config` - Tenant configuration holding the JWT method and key material
    /// * `bearer_token` - The raw bearer token string (without "Bearer " prefix)
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is invalid, expired, malformed, or the
    ///   tenant names an unsupported signing method
    /// - `Configuration` if the tenant's key material cannot be loaded
    /// - `ServiceUnavailable` if a remote verifier cannot be reached
    /// - `Internal` for unexpected errors
    async fn authenticate(
        &self,
        config: &TenantConfig,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError>;
}
