//! In-memory instance store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tenant_resolver_sdk::{Instance, InstanceStore, InstanceStoreError, NewInstance};
use uuid::Uuid;

/// Process-local store keyed by instance id.
///
/// Creation is serialized so the operator uuid stays unique; reads and
/// updates go straight to the map.
#[derive(Default)]
pub struct InMemoryInstanceStore {
    instances: DashMap<String, Instance>,
    create_lock: Mutex<()>,
}

impl InMemoryInstanceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed record, e.g. when seeding from configuration.
    pub fn insert(&self, instance: Instance) {
        self.instances.insert(instance.id.clone(), instance);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn find_by_uuid(&self, uuid: &str) -> Option<Instance> {
        self.instances
            .iter()
            .find(|entry| entry.uuid == uuid)
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn get_instance(&self, instance_id: &str) -> Result<Instance, InstanceStoreError> {
        self.instances
            .get(instance_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| InstanceStoreError::NotFound(instance_id.to_owned()))
    }

    async fn get_instance_by_uuid(
        &self,
        uuid: &str,
    ) -> Result<Option<Instance>, InstanceStoreError> {
        Ok(self.find_by_uuid(uuid))
    }

    async fn create_instance(&self, new: NewInstance) -> Result<Instance, InstanceStoreError> {
        let _guard = self.create_lock.lock();
        if self.find_by_uuid(&new.uuid).is_some() {
            return Err(InstanceStoreError::AlreadyExists(new.uuid));
        }

        let now = Utc::now();
        let instance = Instance {
            id: Uuid::new_v4().to_string(),
            uuid: new.uuid,
            config: new.config,
            created_at: now,
            updated_at: now,
        };
        self.instances.insert(instance.id.clone(), instance.clone());
        Ok(instance)
    }

    async fn update_instance(
        &self,
        instance_id: &str,
        config: Value,
    ) -> Result<Instance, InstanceStoreError> {
        let mut entry = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| InstanceStoreError::NotFound(instance_id.to_owned()))?;
        entry.config = config;
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<(), InstanceStoreError> {
        self.instances
            .remove(instance_id)
            .map(|_| ())
            .ok_or_else(|| InstanceStoreError::NotFound(instance_id.to_owned()))
    }
}
