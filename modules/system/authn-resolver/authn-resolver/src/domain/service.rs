//! Strategy selection for the `AuthN` resolver.

use std::sync::Arc;

use authn_resolver_sdk::{AuthNResolverError, AuthenticationResult, AuthenticatorPlugin};
use gateway_security::{SigningMethod, TenantConfig};

use super::keys::KeyCache;
use super::{DomainError, OidcAuthenticator, SharedSecretAuthenticator};
use crate::config::{AuthNPolicy, AuthNResolverConfig};

/// `AuthN` resolver service.
///
/// Under `shared_secret` an authenticator is derived from each tenant's `jwt`
/// block; under `third_party` one OIDC verifier serves every tenant.
pub struct Service {
    policy: AuthNPolicy,
    oidc: Option<Arc<OidcAuthenticator>>,
    keys: KeyCache,
}

impl Service {
    /// # Errors
    /// `DomainError::OidcConfig` if the `third_party` policy is selected with
    /// incomplete OIDC settings.
    pub fn from_config(cfg: &AuthNResolverConfig) -> Result<Self, DomainError> {
        let oidc = match cfg.policy {
            AuthNPolicy::SharedSecret => None,
            AuthNPolicy::ThirdParty => Some(Arc::new(OidcAuthenticator::new(cfg.oidc.clone())?)),
        };

        Ok(Self {
            policy: cfg.policy,
            oidc,
            keys: KeyCache::new(),
        })
    }

    #[must_use]
    pub fn policy(&self) -> AuthNPolicy {
        self.policy
    }

    /// Builds the authenticator that applies to `config`.
    ///
    /// # Errors
    /// - `UnsupportedSigningMethod` for an unknown `jwt.method`
    /// - `MissingSecret` for HS256 without a secret
    /// - `KeyLoad` when the RS256 key file cannot be read or parsed
    pub fn authenticator_for(
        &self,
        config: &TenantConfig,
    ) -> Result<Arc<dyn AuthenticatorPlugin>, DomainError> {
        if let Some(oidc) = &self.oidc {
            return Ok(Arc::clone(oidc) as Arc<dyn AuthenticatorPlugin>);
        }

        let method = config
            .jwt
            .signing_method()
            .map_err(|e| DomainError::UnsupportedSigningMethod(e.0))?;

        let authenticator = match method {
            SigningMethod::Hs256 => {
                let secret = config.jwt.secret.as_ref().ok_or(DomainError::MissingSecret)?;
                SharedSecretAuthenticator::hs256(secret)
            }
            SigningMethod::Rs256 => {
                SharedSecretAuthenticator::rs256(self.keys.rsa_public_key(&config.jwt.keyfile)?)
            }
        };
        Ok(Arc::new(authenticator))
    }

    /// Checks that `config` yields a usable authenticator. Used at startup in
    /// single-tenant mode so key problems fail fast.
    ///
    /// # Errors
    /// Same as [`Service::authenticator_for`].
    pub fn validate_tenant(&self, config: &TenantConfig) -> Result<(), DomainError> {
        self.authenticator_for(config).map(|_| ())
    }

    /// # Errors
    /// Strategy construction errors are converted to `AuthNResolverError`;
    /// verification errors come from the strategy itself.
    pub async fn authenticate(
        &self,
        config: &TenantConfig,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError> {
        let authenticator = self.authenticator_for(config)?;
        authenticator.authenticate(bearer_token).await
    }
}
