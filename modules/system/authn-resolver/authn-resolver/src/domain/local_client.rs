//! Local (in-process) client for the `AuthN` resolver.

use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::{AuthNResolverClient, AuthNResolverError, AuthenticationResult};
use gateway_security::TenantConfig;

use super::Service;

/// Local client wrapping the service.
pub struct AuthNResolverLocalClient {
    svc: Arc<Service>,
}

impl AuthNResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_error(op: &str, e: &AuthNResolverError) {
    match e {
        AuthNResolverError::Unauthorized(reason) => {
            tracing::debug!(operation = op, reason = %reason, "token rejected");
        }
        other => tracing::error!(operation = op, error = %other, "authn_resolver call failed"),
    }
}

#[async_trait]
impl AuthNResolverClient for AuthNResolverLocalClient {
    async fn authenticate(
        &self,
        config: &TenantConfig,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError> {
        self.svc
            .authenticate(config, bearer_token)
            .await
            .inspect_err(|e| log_error("authenticate", e))
    }
}
