//! JWKS retrieval for the OIDC verifier.

use bytes::Bytes;
use gateway_http::{HttpClientConfig, HttpsClient, build_https_client};
use http::{Request, Uri, header};
use http_body_util::{BodyExt, Empty};
use jsonwebtoken::jwk::JwkSet;

use super::DomainError;

/// Fetches the identity provider's signing keys.
pub struct JwksFetcher {
    client: HttpsClient<Empty<Bytes>>,
    uri: Uri,
}

impl JwksFetcher {
    /// # Errors
    /// `DomainError::OidcConfig` if `uri` is not a valid absolute URI.
    pub fn new(uri: &str) -> Result<Self, DomainError> {
        let uri: Uri = uri
            .parse()
            .map_err(|e| DomainError::OidcConfig(format!("invalid jwks_uri '{uri}': {e}")))?;
        if uri.host().is_none() {
            return Err(DomainError::OidcConfig(format!(
                "jwks_uri '{uri}' must be absolute"
            )));
        }

        Ok(Self {
            client: build_https_client(&HttpClientConfig::default()),
            uri,
        })
    }

    /// # Errors
    /// `DomainError::JwksUnavailable` on transport failure, non-2xx status or
    /// an unparsable document.
    pub async fn fetch(&self) -> Result<JwkSet, DomainError> {
        let req = Request::get(self.uri.clone())
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| DomainError::JwksUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DomainError::JwksUnavailable(format!(
                "JWKS endpoint returned {status}"
            )));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| DomainError::JwksUnavailable(e.to_string()))?
            .to_bytes();

        serde_json::from_slice(&body)
            .map_err(|e| DomainError::JwksUnavailable(format!("invalid JWKS document: {e}")))
    }
}
