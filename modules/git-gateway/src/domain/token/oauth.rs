//! OAuth 2.0 refresh-token grant.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gateway_http::HttpsClient;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, Uri};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{TokenError, TokenRefresher, UpstreamToken};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Exchanges a refresh token for an access token at the provider's token
/// endpoint, authenticating with HTTP Basic client credentials.
///
/// When the provider rotates the refresh token, the new one is kept for the
/// next exchange.
pub struct OAuthRefresher {
    client: HttpsClient<Body>,
    token_url: Uri,
    client_id: String,
    client_secret: Option<SecretString>,
    refresh_token: Mutex<SecretString>,
}

impl OAuthRefresher {
    /// # Errors
    /// `TokenError::Config` if `token_url` is not a valid URI.
    pub fn new(
        client: HttpsClient<Body>,
        token_url: &str,
        client_id: impl Into<String>,
        client_secret: Option<SecretString>,
        refresh_token: SecretString,
    ) -> Result<Self, TokenError> {
        let token_url = token_url
            .parse::<Uri>()
            .map_err(|e| TokenError::Config(format!("invalid token_url '{token_url}': {e}")))?;
        Ok(Self {
            client,
            token_url,
            client_id: client_id.into(),
            client_secret,
            refresh_token: Mutex::new(refresh_token),
        })
    }

    fn basic_auth(&self) -> String {
        let secret = self
            .client_secret
            .as_ref()
            .map_or("", ExposeSecret::expose_secret);
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{secret}", self.client_id))
        )
    }

    fn request(&self) -> Result<Request<Body>, TokenError> {
        let refresh_token = self.refresh_token.lock().clone();
        let form = serde_urlencoded::to_string([
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
        ])
        .map_err(|e| TokenError::Config(e.to_string()))?;

        Request::builder()
            .method(Method::POST)
            .uri(self.token_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.basic_auth())
            .body(Body::from(form))
            .map_err(|e| TokenError::Config(e.to_string()))
    }
}

#[async_trait]
impl TokenRefresher for OAuthRefresher {
    async fn refresh(&self) -> Result<UpstreamToken, TokenError> {
        let resp = self
            .client
            .request(self.request()?)
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let parsed: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;
        if parsed.access_token.is_empty() {
            return Err(TokenError::InvalidResponse(
                "empty access_token".to_owned(),
            ));
        }

        if let Some(rotated) = parsed.refresh_token.filter(|t| !t.is_empty()) {
            *self.refresh_token.lock() = SecretString::from(rotated);
        }

        tracing::info!(
            token_url = %self.token_url,
            expires_in = ?parsed.expires_in,
            "obtained upstream access token"
        );
        Ok(UpstreamToken::new(
            SecretString::from(parsed.access_token),
            parsed.expires_in.map(Duration::from_secs),
        ))
    }
}
