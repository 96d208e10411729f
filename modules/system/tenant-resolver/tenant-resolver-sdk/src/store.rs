//! Persistence contract for tenant records.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::InstanceStoreError;
use crate::models::{Instance, NewInstance};

/// Storage for tenant instances.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// # Errors
    /// `NotFound` if no instance has this id.
    async fn get_instance(&self, instance_id: &str) -> Result<Instance, InstanceStoreError>;

    /// # Errors
    /// `Internal` on storage failure. A missing uuid is `Ok(None)`.
    async fn get_instance_by_uuid(
        &self,
        uuid: &str,
    ) -> Result<Option<Instance>, InstanceStoreError>;

    /// # Errors
    /// `AlreadyExists` when the operator uuid is taken.
    async fn create_instance(&self, new: NewInstance) -> Result<Instance, InstanceStoreError>;

    /// Replaces the stored configuration and bumps `updated_at`.
    ///
    /// # Errors
    /// `NotFound` if no instance has this id.
    async fn update_instance(
        &self,
        instance_id: &str,
        config: Value,
    ) -> Result<Instance, InstanceStoreError>;

    /// # Errors
    /// `NotFound` if no instance has this id.
    async fn delete_instance(&self, instance_id: &str) -> Result<(), InstanceStoreError>;
}
