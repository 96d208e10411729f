//! API Gateway module definition
//!
//! Owns the HTTP surface: provider mounts, `/settings`, `/health`, the
//! operator endpoints, and the middleware stack wrapped around them.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use authn_resolver_sdk::AuthNResolverClient;
use authz_resolver_sdk::AuthZResolverClient;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{any, get, post};
use axum::Router;
use git_gateway::{GitGateway, Provider};
use http::StatusCode;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::auth::{self, AccessControl};
use crate::config::ApiGatewayConfig;
use crate::error::{self, Problem};
use crate::instances::{self, AdminState};
use crate::middleware;
use crate::tenant::{self, MultiTenant, Tenancy};
use crate::web;

/// Clients the gateway delegates to.
pub struct Dependencies {
    pub authn: Arc<dyn AuthNResolverClient>,
    pub authz: Arc<dyn AuthZResolverClient>,
    pub git: GitGateway,
}

/// Main API Gateway module: builds the router and runs the HTTP server.
pub struct ApiGateway {
    config: ApiGatewayConfig,
    tenancy: Tenancy,
    access: AccessControl,
    git: GitGateway,
}

impl ApiGateway {
    #[must_use]
    pub fn new(config: ApiGatewayConfig, tenancy: Tenancy, deps: Dependencies) -> Self {
        Self {
            config,
            tenancy,
            access: AccessControl {
                authn: deps.authn,
                authz: deps.authz,
            },
            git: deps.git,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiGatewayConfig {
        &self.config
    }

    /// Build the HTTP router with the full middleware stack applied.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(self.proxied_routes());

        if let Tenancy::Multi(multi) = &self.tenancy {
            router = router.merge(self.operator_routes(multi));
        }

        let router = router.fallback(|| async { Problem::new(StatusCode::NOT_FOUND, "Not Found") });
        self.apply_middleware_stack(router)
    }

    /// Provider mounts and `/settings`: tenant stage, then access control.
    fn proxied_routes(&self) -> Router {
        let mut router = Router::new().route("/settings", get(web::settings));

        for provider in Provider::ALL {
            let git = self.git.clone();
            let handler = move |req: Request| {
                let git = git.clone();
                async move { web::proxy(provider, &git, req).await }
            };
            router = router
                .route(&format!("/{}", provider.mount()), any(handler.clone()))
                .route(&format!("/{}/{{*rest}}", provider.mount()), any(handler));
        }

        // `route_layer`: the last added runs first.
        router
            .route_layer(from_fn_with_state(
                self.access.clone(),
                auth::access_control_middleware,
            ))
            .route_layer(from_fn_with_state(
                self.tenancy.clone(),
                tenant::tenant_middleware,
            ))
    }

    fn operator_routes(&self, multi: &Arc<MultiTenant>) -> Router {
        let state = AdminState {
            admin: Arc::clone(&multi.admin),
            git: self.git.clone(),
            endpoint: self.config.endpoint.clone(),
        };
        Router::new()
            .route("/", get(instances::manifest))
            .route("/instances", post(instances::create_instance))
            .route(
                "/instances/{instance_id}",
                get(instances::get_instance)
                    .put(instances::update_instance)
                    .delete(instances::delete_instance),
            )
            .route_layer(from_fn_with_state(Arc::clone(multi), auth::operator_guard))
            .with_state(state)
    }

    /// Apply all middleware layers to a router (request ID, tracing, timeout, body limit, CORS, error mapping)
    fn apply_middleware_stack(&self, mut router: Router) -> Router {
        // IMPORTANT: `axum::Router::layer(...)` behaves like Tower layers: the **last** added layer
        // becomes the **outermost** layer and therefore runs **first** on the request path.
        //
        // Desired request execution order (outermost -> innermost):
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> BodyLimit -> CORS -> ErrorMapping -> (tenant -> access control, per route) -> Router
        //
        // Therefore we must add layers in the reverse order (innermost -> outermost) below.
        let config = &self.config;

        // 6) Error mapping (outer to the per-route stages so it can stamp their problems)
        router = router.layer(from_fn(error::error_mapping_middleware));

        // 5) CORS (outer to tenant/auth so OPTIONS preflight short-circuits)
        if config.cors_enabled {
            router = router.layer(crate::cors::build_cors_layer(&config.cors));
        }

        // 4) Body limit
        router = router.layer(RequestBodyLimitLayer::new(config.defaults.body_limit_bytes));
        router = router.layer(DefaultBodyLimit::max(config.defaults.body_limit_bytes));

        // 3) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ));

        // 2) Record request_id into span + extensions (requires span to exist first => must be inner to Trace)
        router = router.layer(from_fn(middleware::request_id::push_req_id_to_extensions));

        // 1) Trace (outer to push_req_id_to_extensions)
        router = router.layer({
            use tower_http::trace::TraceLayer;
            use tracing::field::Empty;

            TraceLayer::new_for_http()
                .make_span_with(|req: &http::Request<axum::body::Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        request_id = Empty,
                        instance_id = Empty,
                        correlation_id = Empty,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &http::Response<axum::body::Body>,
                     latency: Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                        tracing::info!("request completed");
                    },
                )
        });

        // 0) Request ID handling
        let x_request_id = middleware::request_id::header();
        // If missing, generate x-request-id first; then propagate it to the response.
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(
            x_request_id,
            middleware::request_id::MakeReqId,
        ));

        router
    }

    /// Parse bind address from configuration string.
    fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr> {
        bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))
    }

    /// Bind and serve until `shutdown` resolves; in-flight requests are
    /// drained before returning.
    ///
    /// # Errors
    /// Returns an error for an invalid bind address or a failed bind.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = Self::parse_bind_address(&self.config.bind_addr)?;
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
