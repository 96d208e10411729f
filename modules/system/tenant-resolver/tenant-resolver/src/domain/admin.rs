//! Operator instance management.

use std::sync::Arc;

use gateway_security::TenantConfig;
use serde_json::Value;
use tenant_resolver_sdk::{Instance, InstanceStore, InstanceStoreError, NewInstance};

use super::DomainError;

/// Create/read/update/delete of tenant instances on behalf of the operator.
pub struct AdminService {
    store: Arc<dyn InstanceStore>,
}

impl AdminService {
    #[must_use]
    pub fn new(store: Arc<dyn InstanceStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// `InvalidConfig` for an undecodable config; `AlreadyExists` (store) for
    /// a duplicate uuid.
    pub async fn create(&self, uuid: &str, config: Value) -> Result<Instance, DomainError> {
        decode(&config)?;
        if self.store.get_instance_by_uuid(uuid).await?.is_some() {
            return Err(InstanceStoreError::AlreadyExists(uuid.to_owned()).into());
        }

        let instance = self
            .store
            .create_instance(NewInstance {
                uuid: uuid.to_owned(),
                config,
            })
            .await?;
        tracing::info!(instance_id = %instance.id, uuid = %instance.uuid, "instance created");
        Ok(instance)
    }

    /// # Errors
    /// `Store(NotFound)` if the instance does not exist.
    pub async fn get(&self, instance_id: &str) -> Result<Instance, DomainError> {
        Ok(self.store.get_instance(instance_id).await?)
    }

    /// Overlays `update` on the stored configuration: non-empty fields win,
    /// the role list is replaced.
    ///
    /// # Errors
    /// `Store(NotFound)` or `InvalidConfig`.
    pub async fn update(&self, instance_id: &str, update: Value) -> Result<Instance, DomainError> {
        let existing = self.store.get_instance(instance_id).await?;
        let base = existing
            .tenant_config()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        let merged = base.merge(decode(&update)?);

        let blob =
            serde_json::to_value(&merged).map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        let instance = self.store.update_instance(instance_id, blob).await?;
        tracing::info!(instance_id = %instance.id, "instance updated");
        Ok(instance)
    }

    /// # Errors
    /// `Store(NotFound)` if the instance does not exist.
    pub async fn delete(&self, instance_id: &str) -> Result<(), DomainError> {
        self.store.delete_instance(instance_id).await?;
        tracing::info!(instance_id = %instance_id, "instance deleted");
        Ok(())
    }
}

fn decode(config: &Value) -> Result<TenantConfig, DomainError> {
    serde_json::from_value(config.clone()).map_err(|e| DomainError::InvalidConfig(e.to_string()))
}
