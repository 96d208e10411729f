//! Domain models for the `AuthZ` resolver module.

use gateway_security::Claims;
use serde::{Deserialize, Serialize};

/// Who is asking, and which roles the tenant admits.
#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    /// Verified claims; `None` when no identity was established.
    pub claims: Option<Claims>,
    /// Role allow-list of the tenant. Empty admits every authenticated caller.
    pub allowed_roles: Vec<String>,
}

impl EvaluationRequest {
    #[must_use]
    pub fn new(claims: Option<Claims>, allowed_roles: &[String]) -> Self {
        Self {
            claims,
            allowed_roles: allowed_roles.to_vec(),
        }
    }
}

/// Reason for a deny decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyReason {
    /// Machine-readable error code.
    pub error_code: String,
    /// Human-readable details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub decision: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_reason: Option<DenyReason>,
}

impl EvaluationResponse {
    #[must_use]
    pub fn allow() -> Self {
        Self {
            decision: true,
            deny_reason: None,
        }
    }

    #[must_use]
    pub fn deny(error_code: &str, details: &str) -> Self {
        Self {
            decision: false,
            deny_reason: Some(DenyReason {
                error_code: error_code.to_owned(),
                details: Some(details.to_owned()),
            }),
        }
    }
}
