#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Router builders and token helpers shared by the integration tests.

use std::sync::Arc;

use api_gateway::{ApiGateway, ApiGatewayConfig, Dependencies, MultiTenant, Tenancy};
use authn_resolver::AuthNResolver;
use authn_resolver::config::AuthNResolverConfig;
use authz_resolver::AuthZResolver;
use authz_resolver::config::AuthZResolverConfig;
use axum::Router;
use axum::body::Body;
use gateway_security::TenantConfig;
use git_gateway::{GitGateway, GitGatewayConfig};
use http::Response;
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use secrecy::SecretString;
use serde_json::{Value, json};
use tenant_resolver::TenantResolver;
use tenant_resolver::config::TenantResolverConfig;
use tenant_resolver::infra::storage::InMemoryInstanceStore;

pub const SITE_SECRET: &str = "site-secret";
pub const OPERATOR_TOKEN: &str = "operator-token";

pub fn deps() -> Dependencies {
    Dependencies {
        authn: AuthNResolver::init(&AuthNResolverConfig::default())
            .unwrap()
            .client(),
        authz: AuthZResolver::init(&AuthZResolverConfig::default()).client(),
        git: GitGateway::init(&GitGatewayConfig::default()).unwrap(),
    }
}

pub fn single_tenant(config: ApiGatewayConfig, tenant: Value) -> Router {
    let tenant: TenantConfig = serde_json::from_value(tenant).unwrap();
    ApiGateway::new(config, Tenancy::Single(Arc::new(tenant)), deps()).build_router()
}

/// Tenant with HS256 client tokens and the given role allow-list.
pub fn tenant(roles: &[&str]) -> Value {
    json!({
        "jwt": { "secret": SITE_SECRET },
        "github": { "access_token": "gh-token", "repo": "acme/site" },
        "roles": roles,
    })
}

pub fn multi_tenant(config: ApiGatewayConfig) -> Router {
    let cfg = TenantResolverConfig {
        operator_token: Some(SecretString::from(OPERATOR_TOKEN.to_owned())),
    };
    let resolver = TenantResolver::init(&cfg, Arc::new(InMemoryInstanceStore::new())).unwrap();
    let multi = MultiTenant {
        resolver: resolver.client(),
        admin: resolver.admin_client(),
        operator_token: SecretString::from(OPERATOR_TOKEN.to_owned()),
    };
    ApiGateway::new(config, Tenancy::Multi(Arc::new(multi)), deps()).build_router()
}

fn now() -> i64 {
    i64::try_from(get_current_timestamp()).unwrap()
}

pub fn sign_hs256(secret: &str, claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Client bearer token signed with `secret`, valid for an hour.
pub fn client_token(secret: &str, roles: &[&str]) -> String {
    sign_hs256(
        secret,
        &json!({
            "sub": "user-1",
            "email": "editor@example.com",
            "exp": now() + 3600,
            "app_metadata": { "roles": roles },
        }),
    )
}

/// Operator assertion naming `instance_id`.
pub fn operator_signature(instance_id: &str) -> String {
    sign_hs256(
        OPERATOR_TOKEN,
        &json!({ "id": instance_id, "netlify_id": "op-corr-1" }),
    )
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text_body(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
