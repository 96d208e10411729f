//! Provider request handling.

use std::collections::HashMap;

use axum::body::Body;
use gateway_http::HttpsClient;
use gateway_security::{RequestContext, TenantConfig, UpstreamCredential};
use http::{Request, Response};
use tracing::{Instrument, field};

use super::provider::ProviderRoutes;
use super::target::build_upstream_uri;
use super::token::TokenManagerRegistry;
use super::transform::transform_response;
use super::{GatewayError, Provider, forward};

/// Tenant scope used for token managers in single-tenant mode.
const DEFAULT_SCOPE: &str = "default";

/// Proxies requests for all providers.
pub struct Service {
    client: HttpsClient<Body>,
    routes: HashMap<Provider, ProviderRoutes>,
    tokens: TokenManagerRegistry,
}

impl Service {
    /// # Errors
    /// `GatewayError::Setup` if an allow-list pattern fails to compile.
    pub fn new(client: HttpsClient<Body>) -> Result<Self, GatewayError> {
        let routes = Provider::ALL
            .into_iter()
            .map(|p| ProviderRoutes::new(p).map(|r| (p, r)))
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|e| GatewayError::Setup(e.to_string()))?;

        Ok(Self {
            tokens: TokenManagerRegistry::new(client.clone()),
            client,
            routes,
        })
    }

    /// Admits, rewrites and forwards `req` to `provider`, then rewrites the
    /// response.
    ///
    /// `ctx` must already carry the tenant configuration and, after access
    /// control, the caller's claims.
    ///
    /// # Errors
    /// See [`GatewayError`]. Responses from the provider, including errors,
    /// are returned as `Ok`.
    pub async fn handle(
        &self,
        provider: Provider,
        ctx: RequestContext,
        req: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let span = tracing::info_span!(
            "git_gateway",
            provider = %provider,
            upstream_status = field::Empty,
            ratelimit_remaining = field::Empty,
            upstream_request_id = field::Empty,
        );
        self.handle_inner(provider, ctx, req).instrument(span).await
    }

    pub fn forget_instance(&self, instance_id: &str) {
        self.tokens.evict(instance_id);
    }

    async fn handle_inner(
        &self,
        provider: Provider,
        ctx: RequestContext,
        req: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let config = ctx
            .config()
            .filter(|cfg| provider.is_configured(cfg))
            .cloned()
            .ok_or(GatewayError::NotConfigured(provider))?;

        if ctx.claims().is_none() {
            return Err(GatewayError::MissingClaims);
        }

        let routes = self
            .routes
            .get(&provider)
            .ok_or_else(|| GatewayError::Setup(format!("no routes for {provider}")))?;
        let path = req.uri().path().to_owned();
        if !routes.is_allowed(&path) {
            tracing::info!(path = %path, "path outside the allow-list");
            return Err(GatewayError::Restricted(provider));
        }

        let api_root = provider.api_root(&config);
        let uri = build_upstream_uri(&api_root, &routes.strip_mount(&path), req.uri().query())
            .map_err(|reason| GatewayError::InvalidTarget { provider, reason })?;

        let credential = self.credential(provider, &ctx, &config).await?;
        let ctx = ctx
            .with_proxy_target(uri.to_string())
            .with_upstream_credential(credential);

        let (mut parts, body) = req.into_parts();
        forward::prepare(provider, &mut parts, uri, ctx.upstream_credential())?;
        tracing::info!(target_url = ctx.proxy_target().unwrap_or_default(), "Proxying to {provider}");

        let resp = self
            .client
            .request(Request::from_parts(parts, body))
            .await
            .map_err(|e| GatewayError::Upstream {
                provider,
                reason: e.to_string(),
            })?;

        let span = tracing::Span::current();
        span.record("upstream_status", resp.status().as_u16());
        if provider == Provider::GitLab {
            record_gitlab_headers(&span, resp.headers());
        }

        transform_response(provider, &api_root, resp.map(Body::new)).await
    }

    async fn credential(
        &self,
        provider: Provider,
        ctx: &RequestContext,
        config: &TenantConfig,
    ) -> Result<UpstreamCredential, GatewayError> {
        let not_configured = || GatewayError::NotConfigured(provider);
        match provider {
            Provider::GitHub => config
                .github
                .access_token
                .clone()
                .map(UpstreamCredential::Bearer)
                .ok_or_else(not_configured),
            Provider::GitLab => {
                let token = config
                    .gitlab
                    .access_token
                    .clone()
                    .ok_or_else(not_configured)?;
                Ok(if config.gitlab.uses_private_token() {
                    UpstreamCredential::PrivateToken(token)
                } else {
                    UpstreamCredential::Bearer(token)
                })
            }
            Provider::BitBucket => {
                let scope = ctx.instance_id().unwrap_or(DEFAULT_SCOPE);
                let token_error = |source| GatewayError::TokenRefresh { provider, source };
                let manager = self
                    .tokens
                    .bitbucket(scope, &config.bitbucket)
                    .map_err(token_error)?;
                let token = manager.get_token().await.map_err(token_error)?;
                Ok(UpstreamCredential::Bearer(token.access_token().clone()))
            }
        }
    }
}

fn record_gitlab_headers(span: &tracing::Span, headers: &http::HeaderMap) {
    let text = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    if let Some(remaining) = text("ratelimit-remaining") {
        span.record("ratelimit_remaining", remaining);
    }
    if let Some(id) = text("x-request-id") {
        span.record("upstream_request_id", id);
    }
}
