//! Local (in-process) clients for the tenant resolver.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tenant_resolver_sdk::{
    Instance, InstanceAdminClient, ResolvedTenant, TenantResolverClient, TenantResolverError,
};

use super::{AdminService, DomainError, Service};

fn log_and_convert(op: &str, e: DomainError) -> TenantResolverError {
    match &e {
        DomainError::Store(tenant_resolver_sdk::InstanceStoreError::Internal(_))
        | DomainError::InvalidConfig(_)
        | DomainError::MissingOperatorToken => {
            tracing::error!(operation = op, error = %e, "tenant_resolver call failed");
        }
        _ => tracing::debug!(operation = op, error = %e, "tenant_resolver call rejected"),
    }
    e.into()
}

/// Local client wrapping the resolution service.
pub struct TenantResolverLocalClient {
    svc: Arc<Service>,
}

impl TenantResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

#[async_trait]
impl TenantResolverClient for TenantResolverLocalClient {
    async fn resolve(&self, signature: &str) -> Result<ResolvedTenant, TenantResolverError> {
        self.svc
            .resolve(signature)
            .await
            .map_err(|e| log_and_convert("resolve", e))
    }
}

/// Local client wrapping the admin service.
pub struct InstanceAdminLocalClient {
    svc: Arc<AdminService>,
}

impl InstanceAdminLocalClient {
    #[must_use]
    pub fn new(svc: Arc<AdminService>) -> Self {
        Self { svc }
    }
}

#[async_trait]
impl InstanceAdminClient for InstanceAdminLocalClient {
    async fn create_instance(
        &self,
        uuid: &str,
        config: Value,
    ) -> Result<Instance, TenantResolverError> {
        self.svc
            .create(uuid, config)
            .await
            .map_err(|e| log_and_convert("create_instance", e))
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Instance, TenantResolverError> {
        self.svc
            .get(instance_id)
            .await
            .map_err(|e| log_and_convert("get_instance", e))
    }

    async fn update_instance(
        &self,
        instance_id: &str,
        config: Value,
    ) -> Result<Instance, TenantResolverError> {
        self.svc
            .update(instance_id, config)
            .await
            .map_err(|e| log_and_convert("update_instance", e))
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<(), TenantResolverError> {
        self.svc
            .delete(instance_id)
            .await
            .map_err(|e| log_and_convert("delete_instance", e))
    }
}
