//! Third-party (OpenID Connect) token verification.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use authn_resolver_sdk::{AuthNResolverError, AuthenticationResult, AuthenticatorPlugin};
use gateway_security::Claims;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::DomainError;
use super::jwks::JwksFetcher;
use crate::config::OidcConfig;

struct CachedJwks {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedJwks {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

#[derive(Deserialize)]
struct OidcClaims {
    #[serde(flatten)]
    claims: Claims,
    #[serde(default)]
    azp: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
}

/// Verifies RS256 tokens issued by an external identity provider.
///
/// Keys come from the provider's JWKS document and are cached for
/// `jwks_cache_ttl_seconds`. An unknown `kid` triggers a refetch so key
/// rotation is picked up without a restart, at most once per
/// `jwks_min_refetch_seconds`.
///
/// The provider's claim set has no `app_metadata`, so the resulting claims
/// never carry roles.
pub struct OidcAuthenticator {
    cfg: OidcConfig,
    fetcher: JwksFetcher,
    cache: RwLock<Option<CachedJwks>>,
}

impl OidcAuthenticator {
    /// # Errors
    /// `DomainError::OidcConfig` when the issuer, audience or JWKS URI is
    /// missing or malformed.
    pub fn new(cfg: OidcConfig) -> Result<Self, DomainError> {
        if cfg.issuer.is_empty() {
            return Err(DomainError::OidcConfig("issuer is required".to_owned()));
        }
        if cfg.audience.is_empty() {
            return Err(DomainError::OidcConfig("audience is required".to_owned()));
        }
        let fetcher = JwksFetcher::new(&cfg.jwks_uri())?;

        Ok(Self {
            cfg,
            fetcher,
            cache: RwLock::new(None),
        })
    }

    /// # Errors
    /// - `DomainError::InvalidToken` for signature, issuer, audience, client
    ///   or time failures
    /// - `DomainError::JwksUnavailable` when keys cannot be fetched
    pub async fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| DomainError::InvalidToken("token missing key ID (kid)".to_owned()))?;

        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.cfg.issuer]);
        validation.set_audience(&[&self.cfg.audience]);
        validation.leeway = self.cfg.leeway_seconds;
        validation.validate_nbf = true;

        let data = decode::<OidcClaims>(token, &key, &validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidIssuer => "invalid issuer",
                ErrorKind::InvalidAudience => "invalid audience",
                ErrorKind::InvalidSignature => "invalid signature",
                ErrorKind::ImmatureSignature => "token not yet valid",
                _ => "token validation failed",
            };
            DomainError::InvalidToken(reason.to_owned())
        })?;

        self.check_client(&data.claims)?;

        let mut claims = data.claims.claims;
        claims.app_metadata.clear();
        claims.user_metadata.clear();
        Ok(claims)
    }

    fn check_client(&self, claims: &OidcClaims) -> Result<(), DomainError> {
        if self.cfg.client_id.is_empty() {
            return Ok(());
        }
        let presented = claims.azp.as_deref().or(claims.client_id.as_deref());
        match presented {
            Some(id) if id != self.cfg.client_id => Err(DomainError::InvalidToken(
                "token issued to a different client".to_owned(),
            )),
            _ => Ok(()),
        }
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, DomainError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && !cached.is_expired()
                && let Some(key) = cached.keys.get(kid)
            {
                return Ok(key.clone());
            }
        }

        self.refresh_for(kid).await?;

        let cache = self.cache.read().await;
        cache
            .as_ref()
            .and_then(|c| c.keys.get(kid))
            .cloned()
            .ok_or_else(|| DomainError::InvalidToken(format!("unknown key ID: {kid}")))
    }

    /// Refetches the key set unless a fresh one already has `kid` or is too
    /// recent to be refetched. Holds the write lock across the fetch so
    /// concurrent misses share one request.
    async fn refresh_for(&self, kid: &str) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref()
            && !cached.is_expired()
            && (cached.keys.contains_key(kid) || !self.refetch_allowed(cached))
        {
            tracing::debug!(kid = %kid, "JWKS refetch suppressed");
            return Ok(());
        }

        let set = self.fetcher.fetch().await?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.as_ref() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid.clone(), key);
                }
                Err(err) => tracing::warn!(kid = %kid, error = %err, "Failed to parse JWK"),
            }
        }

        tracing::debug!(count = keys.len(), "refreshed JWKS");
        *cache = Some(CachedJwks {
            keys,
            fetched_at: Instant::now(),
            ttl: Duration::from_secs(self.cfg.jwks_cache_ttl_seconds),
        });
        Ok(())
    }

    fn refetch_allowed(&self, cached: &CachedJwks) -> bool {
        cached.fetched_at.elapsed() >= Duration::from_secs(self.cfg.jwks_min_refetch_seconds)
    }
}

#[async_trait]
impl AuthenticatorPlugin for OidcAuthenticator {
    async fn authenticate(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticationResult, AuthNResolverError> {
        let claims = self.verify(bearer_token).await?;
        Ok(AuthenticationResult { claims })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
    use serde_json::{Value, json};

    const PRIVATE_KEY: &[u8] = include_bytes!("../../tests/fixtures/rsa_private.pem");
    const JWKS: &str = include_str!("../../tests/fixtures/jwks.json");
    const ISSUER: &str = "https://idp.example.com";
    const AUDIENCE: &str = "git-gateway-client";

    fn now() -> i64 {
        i64::try_from(get_current_timestamp()).unwrap()
    }

    fn sign(kid: &str, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_owned());
        encode(&header, claims, &EncodingKey::from_rsa_pem(PRIVATE_KEY).unwrap()).unwrap()
    }

    fn valid_claims() -> Value {
        json!({
            "sub": "oidc-user",
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": now() + 600,
            "iat": now(),
            "jti": "token-1",
            "app_metadata": { "roles": ["admin"] }
        })
    }

    fn config(server: &MockServer) -> OidcConfig {
        OidcConfig {
            issuer: ISSUER.to_owned(),
            jwks_uri: server.url("/jwks"),
            audience: AUDIENCE.to_owned(),
            client_id: AUDIENCE.to_owned(),
            ..OidcConfig::default()
        }
    }

    fn authenticator(server: &MockServer) -> OidcAuthenticator {
        OidcAuthenticator::new(config(server)).unwrap()
    }

    #[tokio::test]
    async fn valid_token_maps_standard_claims_without_roles() {
        let server = MockServer::start_async().await;
        let jwks = server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(JWKS);
            })
            .await;

        let auth = authenticator(&server);
        let claims = auth.verify(&sign("test-key-1", &valid_claims())).await.unwrap();

        assert_eq!(claims.sub.as_deref(), Some("oidc-user"));
        assert_eq!(claims.iss.as_deref(), Some(ISSUER));
        assert_eq!(claims.jti.as_deref(), Some("token-1"));
        assert_eq!(claims.roles().count(), 0);

        // Second verification is served from the cache.
        auth.verify(&sign("test-key-1", &valid_claims())).await.unwrap();
        assert_eq!(jwks.hits_async().await, 1);
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(200).body(JWKS);
            })
            .await;

        let mut claims = valid_claims();
        claims["aud"] = json!("someone-else");

        let res = authenticator(&server).verify(&sign("test-key-1", &claims)).await;
        assert!(matches!(res, Err(DomainError::InvalidToken(ref r)) if r == "invalid audience"));
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(200).body(JWKS);
            })
            .await;

        let mut claims = valid_claims();
        claims["iss"] = json!("https://evil.example.com");

        let res = authenticator(&server).verify(&sign("test-key-1", &claims)).await;
        assert!(matches!(res, Err(DomainError::InvalidToken(ref r)) if r == "invalid issuer"));
    }

    #[tokio::test]
    async fn other_client_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(200).body(JWKS);
            })
            .await;

        let mut claims = valid_claims();
        claims["azp"] = json!("another-client");

        let res = authenticator(&server).verify(&sign("test-key-1", &claims)).await;
        assert!(matches!(res, Err(DomainError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn unknown_kid_forces_refetch() {
        let server = MockServer::start_async().await;
        let jwks = server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(200).body(JWKS);
            })
            .await;

        let auth = OidcAuthenticator::new(OidcConfig {
            jwks_min_refetch_seconds: 0,
            ..config(&server)
        })
        .unwrap();
        auth.verify(&sign("test-key-1", &valid_claims())).await.unwrap();

        let res = auth.verify(&sign("rotated-key", &valid_claims())).await;
        assert!(matches!(res, Err(DomainError::InvalidToken(_))));
        assert_eq!(jwks.hits_async().await, 2);
    }

    #[tokio::test]
    async fn unknown_kids_cannot_hammer_the_identity_provider() {
        let server = MockServer::start_async().await;
        let jwks = server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(200).body(JWKS);
            })
            .await;

        let auth = authenticator(&server);
        for i in 0..5 {
            let res = auth.verify(&sign(&format!("forged-{i}"), &valid_claims())).await;
            assert!(
                matches!(res, Err(DomainError::InvalidToken(ref r)) if r.starts_with("unknown key ID"))
            );
        }
        // Known keys keep verifying from the cache.
        auth.verify(&sign("test-key-1", &valid_claims())).await.unwrap();

        assert_eq!(jwks.hits_async().await, 1);
    }

    #[tokio::test]
    async fn unreachable_jwks_is_service_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/jwks");
                then.status(503);
            })
            .await;

        let res = authenticator(&server)
            .authenticate(&sign("test-key-1", &valid_claims()))
            .await;
        assert!(matches!(res, Err(AuthNResolverError::ServiceUnavailable(_))));
    }

    #[test]
    fn missing_issuer_is_config_error() {
        let res = OidcAuthenticator::new(OidcConfig {
            audience: AUDIENCE.to_owned(),
            ..OidcConfig::default()
        });
        assert!(matches!(res, Err(DomainError::OidcConfig(_))));
    }
}
