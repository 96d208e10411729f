//! `AuthZ` resolver module.

use std::sync::Arc;

use authz_resolver_sdk::AuthZResolverClient;
use tracing::info;

use crate::config::AuthZResolverConfig;
use crate::domain::{AuthZResolverLocalClient, Service};

/// `AuthZ` Resolver module.
pub struct AuthZResolver {
    service: Arc<Service>,
}

impl AuthZResolver {
    #[must_use]
    pub fn init(cfg: &AuthZResolverConfig) -> Self {
        info!(policy = ?cfg.policy, "Initializing authz_resolver");
        Self {
            service: Arc::new(Service::new(cfg.policy)),
        }
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn AuthZResolverClient> {
        Arc::new(AuthZResolverLocalClient::new(Arc::clone(&self.service)))
    }
}
