use axum::Json;
use axum::extract::{Extension, Request};
use axum::response::Response;
use gateway_security::RequestContext;
use git_gateway::{GitGateway, Provider};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ApiError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "version": VERSION,
        "name": "git-gateway",
        "description": "git-gateway is an access control proxy to git hosting APIs",
    }))
}

/// Which providers the tenant has credentials for, and its role allow-list.
#[derive(Debug, Serialize)]
pub struct Settings {
    pub github_enabled: bool,
    pub gitlab_enabled: bool,
    pub bitbucket_enabled: bool,
    pub roles: Vec<String>,
}

/// # Errors
/// Internal error when the tenant stage did not run.
pub async fn settings(Extension(ctx): Extension<RequestContext>) -> Result<Json<Settings>, ApiError> {
    let config = ctx.config().ok_or_else(|| {
        ApiError::internal("Internal server error", &"tenant configuration missing")
    })?;
    Ok(Json(Settings {
        github_enabled: config.github.is_enabled(),
        gitlab_enabled: config.gitlab.is_enabled(),
        bitbucket_enabled: config.bitbucket.is_enabled(),
        roles: config.roles.clone(),
    }))
}

/// Hands an admitted request to the provider gateway.
///
/// # Errors
/// Gateway failures, converted to their client-facing form.
pub async fn proxy(provider: Provider, git: &GitGateway, req: Request) -> Result<Response, ApiError> {
    let ctx = req.extensions().get::<RequestContext>().cloned().ok_or_else(|| {
        ApiError::internal("Internal server error", &"request context missing")
    })?;
    Ok(git.handle(provider, ctx, req).await?)
}
