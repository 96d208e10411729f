//! Tenant resolver module.

use std::sync::Arc;

use tenant_resolver_sdk::{InstanceAdminClient, InstanceStore, TenantResolverClient};
use tracing::info;

use crate::config::TenantResolverConfig;
use crate::domain::{
    AdminService, DomainError, InstanceAdminLocalClient, OperatorSignatureVerifier, Service,
    TenantResolverLocalClient,
};

/// Tenant Resolver module.
///
/// Wires the signature verifier and the admin service to one instance store.
pub struct TenantResolver {
    service: Arc<Service>,
    admin: Arc<AdminService>,
}

impl TenantResolver {
    /// # Errors
    /// `MissingOperatorToken` when no operator secret is configured.
    pub fn init(
        cfg: &TenantResolverConfig,
        store: Arc<dyn InstanceStore>,
    ) -> Result<Self, DomainError> {
        let token = cfg
            .operator_token
            .as_ref()
            .ok_or(DomainError::MissingOperatorToken)?;
        info!("Initializing tenant_resolver");

        let verifier = OperatorSignatureVerifier::new(token);
        Ok(Self {
            service: Arc::new(Service::new(verifier, Arc::clone(&store))),
            admin: Arc::new(AdminService::new(store)),
        })
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn TenantResolverClient> {
        Arc::new(TenantResolverLocalClient::new(Arc::clone(&self.service)))
    }

    #[must_use]
    pub fn admin_client(&self) -> Arc<dyn InstanceAdminClient> {
        Arc::new(InstanceAdminLocalClient::new(Arc::clone(&self.admin)))
    }
}
