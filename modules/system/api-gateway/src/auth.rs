use std::sync::Arc;

use authn_resolver_sdk::{AuthNResolverClient, extract_bearer_token};
use authz_resolver_sdk::{AuthZResolverClient, EvaluationRequest};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gateway_security::RequestContext;
use http::{HeaderMap, Method};
use secrecy::ExposeSecret;

use crate::error::ApiError;
use crate::tenant::MultiTenant;

/// Shared state for the access-control middleware.
#[derive(Clone)]
pub struct AccessControl {
    pub authn: Arc<dyn AuthNResolverClient>,
    pub authz: Arc<dyn AuthZResolverClient>,
}

/// Authenticates the bearer token against the tenant's verification material,
/// then checks the caller's roles against the tenant's allow-list.
///
/// Runs after the tenant stage. On success the request context gains the
/// verified claims.
pub async fn access_control_middleware(
    State(state): State<AccessControl>,
    mut req: Request,
    next: Next,
) -> Response {
    // Skip CORS preflight
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let ctx = req.extensions().get::<RequestContext>().cloned();
    let token = extract_bearer_token(req.headers()).map(str::to_owned);

    match authorize(&state, ctx, token).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

async fn authorize(
    state: &AccessControl,
    ctx: Option<RequestContext>,
    token: Option<String>,
) -> Result<RequestContext, ApiError> {
    let ctx = ctx.ok_or_else(|| {
        ApiError::internal("Internal server error", &"request context missing")
    })?;
    let config = ctx.config().cloned().ok_or_else(|| {
        ApiError::internal("Internal server error", &"tenant configuration missing")
    })?;
    let token = token.ok_or_else(|| {
        ApiError::Unauthorized("This endpoint requires a Bearer token".to_owned())
    })?;

    let claims = state.authn.authenticate(&config, &token).await?.claims;

    let verdict = state
        .authz
        .evaluate(EvaluationRequest::new(Some(claims.clone()), &config.roles))
        .await?;
    if !verdict.decision {
        let details = verdict
            .deny_reason
            .and_then(|r| r.details)
            .unwrap_or_default();
        return Err(ApiError::Unauthorized(format!(
            "Access to endpoint not allowed: {details}"
        )));
    }

    Ok(ctx.with_claims(claims))
}

/// Admits only requests bearing the operator token.
pub async fn operator_guard(
    State(multi): State<Arc<MultiTenant>>,
    req: Request,
    next: Next,
) -> Response {
    let presented = extract_bearer_token(req.headers());
    if presented.is_some_and(|t| t == multi.operator_token.expose_secret()) {
        next.run(req).await
    } else {
        ApiError::Unauthorized("Request does not include an Operator token".to_owned())
            .into_response()
    }
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(http::header::ORIGIN)
        && headers.contains_key(http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
