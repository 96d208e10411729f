//! Configuration for the `AuthN` resolver.

use serde::{Deserialize, Serialize};

/// Named authentication policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthNPolicy {
    /// JWT verified with the tenant's `jwt` block (HS256 secret or RS256 key file).
    #[default]
    SharedSecret,
    /// Token issued by an external OpenID Connect provider.
    ThirdParty,
}

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthNResolverConfig {
    pub policy: AuthNPolicy,
    /// Used only with the `third_party` policy.
    pub oidc: OidcConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OidcConfig {
    /// Expected `iss` claim.
    pub issuer: String,
    /// JWKS document URL. Defaults to `<issuer>/.well-known/jwks.json`.
    pub jwks_uri: String,
    /// Expected `aud` claim; usually the OAuth client id.
    pub audience: String,
    /// When set, `azp`/`client_id` claims (if present) must equal this value.
    pub client_id: String,
    /// Clock skew tolerance for `exp`/`nbf`.
    pub leeway_seconds: u64,
    /// How long a fetched key set is reused before refetching.
    pub jwks_cache_ttl_seconds: u64,
    /// Minimum age of the key set before an unknown `kid` may refetch it.
    pub jwks_min_refetch_seconds: u64,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            jwks_uri: String::new(),
            audience: String::new(),
            client_id: String::new(),
            leeway_seconds: 60,
            jwks_cache_ttl_seconds: 3600,
            jwks_min_refetch_seconds: 60,
        }
    }
}

impl OidcConfig {
    #[must_use]
    pub fn jwks_uri(&self) -> String {
        if self.jwks_uri.is_empty() {
            format!("{}/.well-known/jwks.json", self.issuer.trim_end_matches('/'))
        } else {
            self.jwks_uri.clone()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn policy_names_are_snake_case() {
        let cfg: AuthNResolverConfig =
            serde_json::from_str(r#"{"policy": "third_party"}"#).unwrap();
        assert_eq!(cfg.policy, AuthNPolicy::ThirdParty);

        let cfg: AuthNResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.policy, AuthNPolicy::SharedSecret);
    }

    #[test]
    fn jwks_uri_defaults_from_issuer() {
        let cfg = OidcConfig {
            issuer: "https://idp.example.com/".to_owned(),
            ..OidcConfig::default()
        };
        assert_eq!(cfg.jwks_uri(), "https://idp.example.com/.well-known/jwks.json");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<AuthNResolverConfig, _> = serde_json::from_str(r#"{"vendor": "x"}"#);
        assert!(res.is_err());
    }
}
