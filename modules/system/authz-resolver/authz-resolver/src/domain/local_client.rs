//! Local (in-process) client for the `AuthZ` resolver.

use std::sync::Arc;

use async_trait::async_trait;
use authz_resolver_sdk::{
    AuthZResolverClient, AuthZResolverError, EvaluationRequest, EvaluationResponse,
};

use super::Service;

/// Local client wrapping the service.
pub struct AuthZResolverLocalClient {
    svc: Arc<Service>,
}

impl AuthZResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

#[async_trait]
impl AuthZResolverClient for AuthZResolverLocalClient {
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResponse, AuthZResolverError> {
        let response = self.svc.evaluate(&request);
        if let Some(reason) = &response.deny_reason {
            tracing::debug!(
                error_code = %reason.error_code,
                subject = request.claims.as_ref().and_then(|c| c.sub.as_deref()).unwrap_or("-"),
                "access denied"
            );
        }
        Ok(response)
    }
}
