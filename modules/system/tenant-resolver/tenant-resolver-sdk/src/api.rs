//! Public API traits for the tenant resolver.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TenantResolverError;
use crate::models::{Instance, ResolvedTenant};

/// Resolves the tenant named by an operator-signed assertion.
///
/// ```ignore
/// let tenant = resolver.resolve(signature).await?;
/// let ctx = ctx
///     .with_instance(tenant.instance_id, tenant.correlation_id)
///     .with_config(tenant.config);
/// ```
#[async_trait]
pub trait TenantResolverClient: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidSignature` if the assertion fails verification
    /// - `MissingInstanceId` if the verified assertion names no tenant
    /// - `NotFound` if the store has no such tenant
    /// - `InvalidConfig` if the stored configuration cannot be decoded
    /// - `Internal` for store failures
    async fn resolve(&self, signature: &str) -> Result<ResolvedTenant, TenantResolverError>;
}

/// Instance management used by the operator administrative surface.
#[async_trait]
pub trait InstanceAdminClient: Send + Sync {
    /// # Errors
    /// `AlreadyExists` for a duplicate operator `uuid`; `InvalidConfig` when
    /// `config` is not a valid tenant configuration.
    async fn create_instance(
        &self,
        uuid: &str,
        config: Value,
    ) -> Result<Instance, TenantResolverError>;

    /// # Errors
    /// `NotFound` if no instance has this id.
    async fn get_instance(&self, instance_id: &str) -> Result<Instance, TenantResolverError>;

    /// Merges `config` into the stored configuration.
    ///
    /// # Errors
    /// `NotFound` if no instance has this id; `InvalidConfig` if either side
    /// does not decode.
    async fn update_instance(
        &self,
        instance_id: &str,
        config: Value,
    ) -> Result<Instance, TenantResolverError>;

    /// # Errors
    /// `NotFound` if no instance has this id.
    async fn delete_instance(&self, instance_id: &str) -> Result<(), TenantResolverError>;
}
