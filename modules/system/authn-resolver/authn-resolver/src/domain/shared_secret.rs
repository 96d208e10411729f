//! Shared-secret JWT verification (HS256 or RS256).

use async_trait::async_trait;
use authn_resolver_sdk::{AuthNResolverError, AuthenticationResult, AuthenticatorPlugin};
use gateway_security::Claims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};

use super::DomainError;

/// Verifies JWTs signed with the tenant's own key material.
///
/// `exp` is required; `nbf` is enforced when present. The audience is not
/// checked because operator-issued tokens carry a site-specific value.
pub struct SharedSecretAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl SharedSecretAuthenticator {
    #[must_use]
    pub fn hs256(secret: &SecretString) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: validation(Algorithm::HS256),
        }
    }

    #[must_use]
    pub fn rs256(key: DecodingKey) -> Self {
        Self {
            key,
            validation: validation(Algorithm::RS256),
        }
    }

    /// # Errors
    /// `DomainError::InvalidToken` for any signature, format or time failure.
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

fn validation(alg: Algorithm) -> Validation {
    let mut v = Validation::new(alg);
    v.validate_nbf = true;
    v.validate_aud = false;
    v
}

#[async_trait]
impl AuthenticatorPlugin for SharedSecretAuthenticator {
    async fn authenticate(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError> {
        let claims = self.verify(bearer_token)?;
        Ok(AuthenticationResult { claims })
    }
}
