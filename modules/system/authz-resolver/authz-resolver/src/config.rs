//! Configuration for the `AuthZ` resolver.

use serde::{Deserialize, Serialize};

/// Named authorization policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthZPolicy {
    /// Caller must hold one of the tenant's allow-listed roles.
    #[default]
    Roles,
}

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthZResolverConfig {
    pub policy: AuthZPolicy,
}
