//! Tenant stage: installs the per-request [`RequestContext`] carrying the
//! tenant configuration.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gateway_security::{RequestContext, SIGNATURE_HEADER, TenantConfig};
use secrecy::SecretString;
use tenant_resolver_sdk::{InstanceAdminClient, TenantResolverClient};

use crate::error::ApiError;
use crate::middleware::request_id::XRequestId;

/// Collaborators used only in multi-tenant mode.
pub struct MultiTenant {
    pub resolver: Arc<dyn TenantResolverClient>,
    pub admin: Arc<dyn InstanceAdminClient>,
    /// Bearer token the operator presents on the administrative endpoints.
    pub operator_token: SecretString,
}

/// Where the tenant configuration of a request comes from.
#[derive(Clone)]
pub enum Tenancy {
    /// One configuration fixed at process start.
    Single(Arc<TenantConfig>),
    /// Configuration named by the operator signature on each request.
    Multi(Arc<MultiTenant>),
}

pub async fn tenant_middleware(
    State(tenancy): State<Tenancy>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut ctx = RequestContext::new();
    if let Some(XRequestId(rid)) = req.extensions().get::<XRequestId>() {
        ctx = ctx.with_request_id(rid.clone());
    }
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    match resolve(&tenancy, ctx, signature).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

async fn resolve(
    tenancy: &Tenancy,
    ctx: RequestContext,
    signature: Option<String>,
) -> Result<RequestContext, ApiError> {
    let multi = match tenancy {
        Tenancy::Single(config) => return Ok(ctx.with_config(Arc::clone(config))),
        Tenancy::Multi(multi) => multi,
    };

    let signature = signature
        .ok_or_else(|| ApiError::BadRequest("Operator microservice headers missing".to_owned()))?;
    let tenant = multi.resolver.resolve(&signature).await?;

    let span = tracing::Span::current();
    span.record("instance_id", tenant.instance_id.as_str());
    if let Some(correlation_id) = &tenant.correlation_id {
        span.record("correlation_id", correlation_id.as_str());
    }
    tracing::debug!(instance_id = %tenant.instance_id, "tenant resolved");

    Ok(ctx
        .with_instance(tenant.instance_id, tenant.correlation_id)
        .with_config(tenant.config)
        .with_signature(signature))
}
