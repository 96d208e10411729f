//! Gateway-originated error responses.
//!
//! Every stage's typed error is converted into [`ApiError`] here, and every
//! [`ApiError`] renders as a [`Problem`] body.

use authn_resolver_sdk::AuthNResolverError;
use authz_resolver_sdk::AuthZResolverError;
use axum::Json;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use git_gateway::GatewayError;
use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde::Serialize;
use tenant_resolver_sdk::TenantResolverError;

use crate::middleware::request_id::XRequestId;

const PROBLEM_JSON: &str = "application/problem+json";

/// JSON problem body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: status.canonical_reason().unwrap_or("Error").to_owned(),
            status: status.as_u16(),
            detail: detail.into(),
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = (status, Json(self.clone())).into_response();
        resp.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        resp.extensions_mut().insert(self);
        resp
    }
}

/// Error returned by gateway handlers and middleware.
///
/// `cause` is logged and never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{detail}: {cause}")]
    Internal { detail: String, cause: String },

    #[error("{detail}: {cause}")]
    BadGateway { detail: String, cause: String },

    #[error("{detail}: {cause}")]
    Unavailable { detail: String, cause: String },
}

impl ApiError {
    #[must_use]
    pub fn internal(detail: impl Into<String>, cause: &impl std::fmt::Display) -> Self {
        Self::Internal {
            detail: detail.into(),
            cause: cause.to_string(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::BadRequest(detail)
            | Self::Unauthorized(detail)
            | Self::NotFound(detail)
            | Self::Internal { detail, .. }
            | Self::BadGateway { detail, .. }
            | Self::Unavailable { detail, .. } => detail,
        }
    }

    #[must_use]
    pub fn into_problem(self) -> Problem {
        log_api_error(&self);
        Problem::new(self.status(), self.detail())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_problem().into_response()
    }
}

/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_api_error(err: &ApiError) {
    match err {
        ApiError::Internal { detail, cause }
        | ApiError::BadGateway { detail, cause }
        | ApiError::Unavailable { detail, cause } => {
            tracing::error!(status = err.status().as_u16(), cause = %cause, "{detail}");
        }
        ApiError::BadRequest(detail) | ApiError::Unauthorized(detail) | ApiError::NotFound(detail) => {
            tracing::info!(status = err.status().as_u16(), "{detail}");
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        let detail = e.public_message();
        match e.status() {
            StatusCode::NOT_FOUND => Self::NotFound(detail),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(detail),
            StatusCode::BAD_GATEWAY => Self::BadGateway {
                detail,
                cause: e.to_string(),
            },
            _ => Self::Internal {
                detail,
                cause: e.to_string(),
            },
        }
    }
}

/// Wording used while resolving the tenant of a proxied request.
impl From<TenantResolverError> for ApiError {
    fn from(e: TenantResolverError) -> Self {
        match e {
            TenantResolverError::InvalidSignature(_) => {
                Self::BadRequest("Operator microservice signature is invalid".to_owned())
            }
            TenantResolverError::MissingInstanceId => {
                Self::BadRequest("Instance ID is missing".to_owned())
            }
            TenantResolverError::NotFound { .. } => {
                Self::NotFound("Unable to locate site configuration".to_owned())
            }
            TenantResolverError::AlreadyExists { .. } => {
                Self::BadRequest("An instance with that UUID already exists".to_owned())
            }
            TenantResolverError::InvalidConfig(cause) => Self::Internal {
                detail: "Error loading environment config".to_owned(),
                cause,
            },
            TenantResolverError::Internal(cause) => Self::Internal {
                detail: "Database error loading instance".to_owned(),
                cause,
            },
        }
    }
}

impl From<AuthNResolverError> for ApiError {
    fn from(e: AuthNResolverError) -> Self {
        match e {
            AuthNResolverError::Unauthorized(cause) => {
                tracing::debug!("AuthN rejected: {cause}");
                Self::Unauthorized("Invalid token".to_owned())
            }
            AuthNResolverError::Configuration(cause) => Self::Internal {
                detail: "Unable to verify token".to_owned(),
                cause,
            },
            AuthNResolverError::ServiceUnavailable(cause) => Self::Unavailable {
                detail: "Authentication service unavailable".to_owned(),
                cause,
            },
            AuthNResolverError::Internal(cause) => Self::Internal {
                detail: "Internal authentication error".to_owned(),
                cause,
            },
        }
    }
}

impl From<AuthZResolverError> for ApiError {
    fn from(e: AuthZResolverError) -> Self {
        match e {
            AuthZResolverError::Internal(cause) => Self::Internal {
                detail: "Internal authorization error".to_owned(),
                cause,
            },
        }
    }
}

/// Stamps the request id onto problem bodies produced further in.
pub async fn error_mapping_middleware(req: Request, next: Next) -> Response {
    let rid = req.extensions().get::<XRequestId>().map(|r| r.0.clone());
    let resp = next.run(req).await;

    let Some(rid) = rid else {
        return resp;
    };
    let unstamped = resp
        .extensions()
        .get::<Problem>()
        .filter(|p| p.request_id.is_none())
        .cloned();
    match unstamped {
        Some(problem) => {
            let (parts, _) = resp.into_parts();
            let mut stamped = problem.with_request_id(rid).into_response();
            for (name, value) in &parts.headers {
                if name != CONTENT_TYPE && name != http::header::CONTENT_LENGTH {
                    stamped.headers_mut().append(name, value.clone());
                }
            }
            stamped
        }
        None => resp,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use git_gateway::Provider;

    #[test]
    fn problem_shape() {
        let p = Problem::new(StatusCode::UNAUTHORIZED, "Invalid token").with_request_id("r-1");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "type": "about:blank",
                "title": "Unauthorized",
                "status": 401,
                "detail": "Invalid token",
                "request_id": "r-1"
            })
        );
    }

    #[test]
    fn gateway_errors_keep_their_status_and_hide_causes() {
        let e: ApiError = GatewayError::Upstream {
            provider: Provider::GitHub,
            reason: "connection refused".to_owned(),
        }
        .into();
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.detail(), "GitHub is unavailable");

        let e: ApiError = GatewayError::NotConfigured(Provider::GitLab).into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
        assert_eq!(e.detail(), "No GitLab Settings Configured");

        let e: ApiError = GatewayError::Restricted(Provider::GitHub).into();
        assert_eq!(e.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn tenant_errors_map_to_client_and_server_failures() {
        let e: ApiError = TenantResolverError::InvalidSignature("bad".to_owned()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.detail(), "Operator microservice signature is invalid");

        let e: ApiError = TenantResolverError::NotFound {
            instance_id: "x".to_owned(),
        }
        .into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);

        let e: ApiError = TenantResolverError::InvalidConfig("roles".to_owned()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.detail(), "Error loading environment config");
    }

    #[test]
    fn authn_configuration_failure_is_internal() {
        let e: ApiError = AuthNResolverError::Configuration("no key".to_owned()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.detail().contains("no key"));

        let e: ApiError = AuthNResolverError::Unauthorized("expired".to_owned()).into();
        assert_eq!(e.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(e.detail(), "Invalid token");
    }
}
