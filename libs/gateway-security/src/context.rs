use std::sync::Arc;

use secrecy::SecretString;

use crate::{claims::Claims, tenant::TenantConfig};

/// Header carrying the operator's signed tenant assertion. It selects the
/// tenant inbound and is never sent upstream.
pub const SIGNATURE_HEADER: &str = "x-nf-sign";

/// Credential injected into the upstream request.
#[derive(Debug, Clone)]
pub enum UpstreamCredential {
    /// `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// `Private-Token: <token>`
    PrivateToken(SecretString),
}

/// Request-scoped state threaded through the gateway pipeline.
///
/// Every stage derives a new value from the previous one with the `with_*`
/// builders; nothing is mutated in place once a stage has handed it on.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: Option<String>,
    claims: Option<Arc<Claims>>,
    config: Option<Arc<TenantConfig>>,
    instance_id: Option<String>,
    correlation_id: Option<String>,
    /// Operator signature, kept for forwarding to downstream collaborators.
    /// Wrapped in `SecretString` so `Debug` redacts it.
    signature: Option<SecretString>,
    proxy_target: Option<String>,
    upstream_credential: Option<UpstreamCredential>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = Some(Arc::new(claims));
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Arc<TenantConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Records the tenant identity resolved from an operator signature.
    #[must_use]
    pub fn with_instance(
        mut self,
        instance_id: impl Into<String>,
        correlation_id: Option<String>,
    ) -> Self {
        self.instance_id = Some(instance_id.into());
        self.correlation_id = correlation_id;
        self
    }

    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<SecretString>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    #[must_use]
    pub fn with_proxy_target(mut self, target: impl Into<String>) -> Self {
        self.proxy_target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_upstream_credential(mut self, credential: UpstreamCredential) -> Self {
        self.upstream_credential = Some(credential);
        self
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    #[must_use]
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_deref()
    }

    #[must_use]
    pub fn config(&self) -> Option<&Arc<TenantConfig>> {
        self.config.as_ref()
    }

    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    #[must_use]
    pub fn signature(&self) -> Option<&SecretString> {
        self.signature.as_ref()
    }

    #[must_use]
    pub fn proxy_target(&self) -> Option<&str> {
        self.proxy_target.as_deref()
    }

    #[must_use]
    pub fn upstream_credential(&self) -> Option<&UpstreamCredential> {
        self.upstream_credential.as_ref()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn builder_stages_accumulate() {
        let config = Arc::new(TenantConfig::default());
        let ctx = RequestContext::new()
            .with_request_id("req-1")
            .with_config(Arc::clone(&config))
            .with_instance("inst-1", Some("corr-1".to_owned()))
            .with_signature("sig".to_owned())
            .with_claims(Claims::default().with_roles(["admin"]))
            .with_proxy_target("https://api.github.com/repos/acme/site/contents")
            .with_upstream_credential(UpstreamCredential::Bearer("tok".to_owned().into()));

        assert_eq!(ctx.request_id(), Some("req-1"));
        assert!(ctx.config().is_some_and(|c| Arc::ptr_eq(c, &config)));
        assert_eq!(ctx.instance_id(), Some("inst-1"));
        assert_eq!(ctx.correlation_id(), Some("corr-1"));
        assert_eq!(ctx.signature().map(ExposeSecret::expose_secret), Some("sig"));
        assert!(ctx.claims().is_some_and(|c| c.has_role("admin")));
        assert_eq!(
            ctx.proxy_target(),
            Some("https://api.github.com/repos/acme/site/contents")
        );
        assert!(matches!(
            ctx.upstream_credential(),
            Some(UpstreamCredential::Bearer(t)) if t.expose_secret() == "tok"
        ));
    }

    #[test]
    fn earlier_stage_value_is_unchanged() {
        let base = RequestContext::new().with_request_id("req-1");
        let derived = base.clone().with_claims(Claims::default());

        assert!(base.claims().is_none());
        assert!(derived.claims().is_some());
    }

    #[test]
    fn debug_redacts_secrets() {
        let ctx = RequestContext::new()
            .with_signature("operator-signature".to_owned())
            .with_upstream_credential(UpstreamCredential::PrivateToken(
                "gl-secret".to_owned().into(),
            ));
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("operator-signature"));
        assert!(!rendered.contains("gl-secret"));
    }
}
