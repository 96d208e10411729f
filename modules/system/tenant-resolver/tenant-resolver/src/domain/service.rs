//! Tenant resolution from operator signatures.

use std::sync::Arc;

use tenant_resolver_sdk::{InstanceStore, ResolvedTenant};

use super::{DomainError, OperatorSignatureVerifier};

/// Tenant resolver service.
pub struct Service {
    verifier: OperatorSignatureVerifier,
    store: Arc<dyn InstanceStore>,
}

impl Service {
    #[must_use]
    pub fn new(verifier: OperatorSignatureVerifier, store: Arc<dyn InstanceStore>) -> Self {
        Self { verifier, store }
    }

    /// Verifies `signature`, loads the tenant it names and decodes its
    /// configuration. Nothing is cached; every request sees the current
    /// stored configuration.
    ///
    /// # Errors
    /// Signature, store and decode failures as `DomainError`.
    pub async fn resolve(&self, signature: &str) -> Result<ResolvedTenant, DomainError> {
        let claims = self.verifier.verify(signature)?;
        let instance = self.store.get_instance(&claims.id).await?;

        let config = instance
            .tenant_config()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;

        Ok(ResolvedTenant {
            instance_id: instance.id,
            correlation_id: claims.correlation_id,
            site_url: claims.site_url,
            config: Arc::new(config),
        })
    }
}
