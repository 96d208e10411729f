//! Git gateway module.

use std::sync::Arc;

use axum::body::Body;
use gateway_http::build_https_client;
use gateway_security::RequestContext;
use http::{Request, Response};
use tracing::info;

use crate::config::GitGatewayConfig;
use crate::domain::{GatewayError, Provider, Service};

/// Provider gateways sharing one outbound client and token registry.
#[derive(Clone)]
pub struct GitGateway {
    service: Arc<Service>,
}

impl GitGateway {
    /// # Errors
    /// `GatewayError::Setup` if the gateway cannot be constructed.
    pub fn init(cfg: &GitGatewayConfig) -> Result<Self, GatewayError> {
        info!("Initializing git_gateway");
        let client = build_https_client(&cfg.http_client);
        Ok(Self {
            service: Arc::new(Service::new(client)?),
        })
    }

    /// # Errors
    /// See [`Service::handle`].
    pub async fn handle(
        &self,
        provider: Provider,
        ctx: RequestContext,
        req: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        self.service.handle(provider, ctx, req).await
    }

    /// Drops cached upstream tokens for a tenant instance, so the next request
    /// authenticates with its current configuration.
    pub fn forget_instance(&self, instance_id: &str) {
        self.service.forget_instance(instance_id);
    }
}
