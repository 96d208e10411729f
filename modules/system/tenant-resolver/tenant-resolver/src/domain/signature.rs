//! Operator signature verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use tenant_resolver_sdk::OperatorClaims;

use super::DomainError;

/// Verifies HS256 assertions signed with the operator shared secret.
///
/// Only HS256 is accepted. `exp` is checked when present but not required.
pub struct OperatorSignatureVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl OperatorSignatureVerifier {
    #[must_use]
    pub fn new(operator_token: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(operator_token.expose_secret().as_bytes()),
            validation,
        }
    }

    /// # Errors
    /// - `InvalidSignature` when the assertion does not verify
    /// - `MissingInstanceId` when it verifies but names no instance
    pub fn verify(&self, signature: &str) -> Result<OperatorClaims, DomainError> {
        let claims = decode::<OperatorClaims>(signature, &self.key, &self.validation)?.claims;
        if claims.id.is_empty() {
            return Err(DomainError::MissingInstanceId);
        }
        Ok(claims)
    }
}
