//! Role allow-list evaluation.

use authz_resolver_sdk::{EvaluationRequest, EvaluationResponse};

use crate::config::AuthZPolicy;

pub const NO_CLAIMS: &str = "no_claims";
pub const ROLE_NOT_ALLOWED: &str = "role_not_allowed";

/// `AuthZ` resolver service.
pub struct Service {
    policy: AuthZPolicy,
}

impl Service {
    #[must_use]
    pub fn new(policy: AuthZPolicy) -> Self {
        Self { policy }
    }

    /// Evaluates the request under the configured policy.
    ///
    /// Missing claims are always denied. An empty allow-list admits any
    /// authenticated caller; otherwise one claimed role must equal an
    /// allow-listed role exactly.
    #[must_use]
    pub fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResponse {
        let AuthZPolicy::Roles = self.policy;

        let Some(claims) = request.claims.as_ref() else {
            return EvaluationResponse::deny(NO_CLAIMS, "no claims found in Bearer token");
        };

        if request.allowed_roles.is_empty() {
            return EvaluationResponse::allow();
        }

        if claims
            .roles()
            .any(|role| request.allowed_roles.iter().any(|allowed| allowed == role))
        {
            EvaluationResponse::allow()
        } else {
            EvaluationResponse::deny(ROLE_NOT_ALLOWED, "your role doesn't allow access")
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use gateway_security::Claims;

    fn svc() -> Service {
        Service::new(AuthZPolicy::Roles)
    }

    fn roles(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| (*r).to_owned()).collect()
    }

    #[test]
    fn empty_allow_list_admits_any_authenticated_caller() {
        let req = EvaluationRequest::new(Some(Claims::default()), &[]);
        assert!(svc().evaluate(&req).decision);
    }

    #[test]
    fn missing_claims_are_denied_even_with_empty_allow_list() {
        let res = svc().evaluate(&EvaluationRequest::new(None, &[]));
        assert!(!res.decision);
        assert_eq!(res.deny_reason.unwrap().error_code, NO_CLAIMS);
    }

    #[test]
    fn intersecting_role_is_allowed() {
        let claims = Claims::default().with_roles(["viewer", "editor"]);
        let req = EvaluationRequest::new(Some(claims), &roles(&["admin", "editor"]));
        assert!(svc().evaluate(&req).decision);
    }

    #[test]
    fn disjoint_roles_are_denied() {
        let claims = Claims::default().with_roles(["viewer"]);
        let res = svc().evaluate(&EvaluationRequest::new(Some(claims), &roles(&["admin"])));
        assert!(!res.decision);
        assert_eq!(res.deny_reason.unwrap().error_code, ROLE_NOT_ALLOWED);
    }

    #[test]
    fn role_match_is_case_sensitive() {
        let claims = Claims::default().with_roles(["Admin"]);
        let req = EvaluationRequest::new(Some(claims), &roles(&["admin"]));
        assert!(!svc().evaluate(&req).decision);
    }

    #[test]
    fn caller_without_roles_is_denied_by_non_empty_list() {
        let req = EvaluationRequest::new(Some(Claims::default()), &roles(&["admin"]));
        assert!(!svc().evaluate(&req).decision);
    }
}
