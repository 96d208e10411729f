//! `AuthN` resolver module.

use std::sync::Arc;

use authn_resolver_sdk::AuthNResolverClient;
use gateway_security::TenantConfig;
use tracing::info;

use crate::config::AuthNResolverConfig;
use crate::domain::{AuthNResolverLocalClient, DomainError, Service};

/// `AuthN` Resolver module.
///
/// Builds the service for the configured policy and exposes it as an
/// `AuthNResolverClient`.
pub struct AuthNResolver {
    service: Arc<Service>,
}

impl AuthNResolver {
    /// # Errors
    /// Fails when the selected policy's settings are incomplete.
    #[tracing::instrument(skip_all, fields(policy = ?cfg.policy))]
    pub fn init(cfg: &AuthNResolverConfig) -> Result<Self, DomainError> {
        info!("Initializing authn_resolver");
        let service = Arc::new(Service::from_config(cfg)?);
        Ok(Self { service })
    }

    /// Verifies that a fixed tenant configuration has usable key material.
    ///
    /// # Errors
    /// Returns the key or method error that would otherwise surface on the
    /// first request.
    pub fn validate_tenant(&self, config: &TenantConfig) -> Result<(), DomainError> {
        self.service.validate_tenant(config)
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn AuthNResolverClient> {
        Arc::new(AuthNResolverLocalClient::new(Arc::clone(&self.service)))
    }
}
