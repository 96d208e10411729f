//! Configuration for the tenant resolver.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TenantResolverConfig {
    /// Shared secret used by the operator to sign tenant assertions and to
    /// authenticate against the admin endpoints.
    #[serde(with = "gateway_security::secret")]
    pub operator_token: Option<SecretString>,
}
