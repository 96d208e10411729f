//! Operator administrative surface (multi-tenant mode only).

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use git_gateway::GitGateway;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tenant_resolver_sdk::{Instance, InstanceAdminClient, TenantResolverError};

use crate::error::ApiError;
use crate::web::VERSION;

/// State shared by the instance handlers.
#[derive(Clone)]
pub struct AdminState {
    pub admin: Arc<dyn InstanceAdminClient>,
    /// Holds per-instance upstream tokens that must not outlive an edit.
    pub git: GitGateway,
    /// Public endpoint reported back on creation.
    pub endpoint: String,
}

fn empty_config() -> Value {
    json!({})
}

#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub uuid: String,
    #[serde(default = "empty_config")]
    pub config: Value,
}

#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    #[serde(default)]
    pub config: Option<Value>,
}

/// Instance as shown to the operator, credentials masked.
#[derive(Debug, Serialize)]
pub struct InstanceView {
    pub id: String,
    pub uuid: String,
    pub config: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CreatedInstance {
    #[serde(flatten)]
    pub instance: InstanceView,
    pub endpoint: String,
    pub state: &'static str,
}

impl InstanceView {
    fn from_instance(instance: Instance) -> Result<Self, ApiError> {
        let config = instance
            .tenant_config()
            .map_err(|e| ApiError::internal("Error loading environment config", &e))?
            .to_redacted_json();
        Ok(Self {
            id: instance.id,
            uuid: instance.uuid,
            config,
            created_at: instance.created_at,
            updated_at: instance.updated_at,
        })
    }
}

pub async fn manifest() -> Json<Value> {
    Json(json!({
        "version": VERSION,
        "name": "GitGateway",
        "description": "GitGateway is an access control proxy to git repos",
    }))
}

/// # Errors
/// 400 for a malformed body or duplicate `uuid`; 500 for store failures.
pub async fn create_instance(
    State(state): State<AdminState>,
    params: Result<Json<CreateParams>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedInstance>), ApiError> {
    let Json(params) = params.map_err(decode_error)?;
    let instance = state
        .admin
        .create_instance(&params.uuid, params.config)
        .await
        .map_err(|e| admin_error(e, "Database error creating instance"))?;

    tracing::info!(instance_id = %instance.id, uuid = %instance.uuid, "instance created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedInstance {
            instance: InstanceView::from_instance(instance)?,
            endpoint: state.endpoint.clone(),
            state: "active",
        }),
    ))
}

/// # Errors
/// 404 when the instance does not exist.
pub async fn get_instance(
    State(state): State<AdminState>,
    Path(instance_id): Path<String>,
) -> Result<Json<InstanceView>, ApiError> {
    let instance = state
        .admin
        .get_instance(&instance_id)
        .await
        .map_err(|e| admin_error(e, "Database error loading instance"))?;
    Ok(Json(InstanceView::from_instance(instance)?))
}

/// Merges the supplied configuration into the stored one.
///
/// # Errors
/// 404 when the instance does not exist; 400 for a malformed body.
pub async fn update_instance(
    State(state): State<AdminState>,
    Path(instance_id): Path<String>,
    params: Result<Json<UpdateParams>, JsonRejection>,
) -> Result<Json<InstanceView>, ApiError> {
    let Json(params) = params.map_err(decode_error)?;
    let updated = match params.config {
        Some(config) => state.admin.update_instance(&instance_id, config).await,
        None => state.admin.get_instance(&instance_id).await,
    }
    .map_err(|e| admin_error(e, "Database error updating instance"))?;
    state.git.forget_instance(&updated.id);

    tracing::info!(instance_id = %updated.id, "instance updated");
    Ok(Json(InstanceView::from_instance(updated)?))
}

/// # Errors
/// 404 when the instance does not exist.
pub async fn delete_instance(
    State(state): State<AdminState>,
    Path(instance_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .admin
        .delete_instance(&instance_id)
        .await
        .map_err(|e| admin_error(e, "Database error deleting instance"))?;
    state.git.forget_instance(&instance_id);

    tracing::info!(instance_id = %instance_id, "instance deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[allow(clippy::needless_pass_by_value)]
fn decode_error(e: JsonRejection) -> ApiError {
    ApiError::BadRequest(format!("Error decoding params: {}", e.body_text()))
}

fn admin_error(e: TenantResolverError, internal: &str) -> ApiError {
    match e {
        TenantResolverError::NotFound { .. } => ApiError::NotFound("Instance not found".to_owned()),
        TenantResolverError::AlreadyExists { .. } => {
            ApiError::BadRequest("An instance with that UUID already exists".to_owned())
        }
        TenantResolverError::InvalidConfig(cause) => {
            ApiError::BadRequest(format!("Error decoding params: {cause}"))
        }
        other => ApiError::internal(internal, &other),
    }
}
