//! Domain models for the tenant resolver module.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gateway_security::TenantConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tenant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Gateway-generated identifier; the `id` claim of operator signatures.
    pub id: String,
    /// Operator-supplied identifier, unique across instances.
    pub uuid: String,
    /// Raw configuration blob, decoded on use.
    pub config: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Instance {
    /// Decodes the stored configuration.
    ///
    /// # Errors
    /// Returns the decode error when the blob does not match `TenantConfig`.
    pub fn tenant_config(&self) -> Result<TenantConfig, serde_json::Error> {
        serde_json::from_value(self.config.clone())
    }
}

/// Input for [`InstanceStore::create_instance`](crate::InstanceStore::create_instance).
#[derive(Debug, Clone)]
pub struct NewInstance {
    pub uuid: String,
    pub config: Value,
}

/// Claims of an operator-signed assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorClaims {
    /// Tenant (instance) identifier.
    #[serde(default)]
    pub id: String,
    /// Operator-side correlation identifier.
    #[serde(default, alias = "netlify_id", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Tenant scope installed into the request context.
#[derive(Debug, Clone)]
pub struct ResolvedTenant {
    pub instance_id: String,
    pub correlation_id: Option<String>,
    pub site_url: Option<String>,
    pub config: Arc<TenantConfig>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_claims_accept_legacy_correlation_key() {
        let claims: OperatorClaims =
            serde_json::from_value(json!({ "id": "inst-1", "netlify_id": "op-9" })).unwrap();
        assert_eq!(claims.correlation_id.as_deref(), Some("op-9"));

        let claims: OperatorClaims =
            serde_json::from_value(json!({ "id": "inst-1", "correlation_id": "op-9" })).unwrap();
        assert_eq!(claims.correlation_id.as_deref(), Some("op-9"));
    }

    #[test]
    fn instance_config_decodes_lazily() {
        let now = Utc::now();
        let good = Instance {
            id: "i".to_owned(),
            uuid: "u".to_owned(),
            config: json!({ "github": { "repo": "acme/site" } }),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(good.tenant_config().unwrap().github.repo, "acme/site");

        let bad = Instance {
            config: json!({ "roles": "not-a-list" }),
            ..good
        };
        assert!(bad.tenant_config().is_err());
    }
}
