//! Domain models for the `AuthN` resolver module.

use gateway_security::Claims;

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Claims carried by the verified token. Third-party tokens carry no
    /// `app_metadata`, so their role list is always empty.
    pub claims: Claims,
}
