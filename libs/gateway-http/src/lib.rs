//! Outbound HTTP(S) client used for upstream provider calls, OAuth token
//! refresh and JWKS retrieval.
//!
//! TLS goes through rustls with the aws-lc-rs provider and the platform's
//! native root store. Plain `http://` targets are allowed so local test
//! servers can stand in for providers.

use std::time::Duration;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};

pub type HttpsClient<B> = Client<HttpsConnector<HttpConnector>, B>;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpClientConfig {
    #[serde(with = "humantime_serde_compat")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde_compat")]
    pub pool_idle_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Builds a pooled client for bodies of type `B`.
#[must_use]
pub fn build_https_client<B>(cfg: &HttpClientConfig) -> HttpsClient<B>
where
    B: http_body::Body + Send,
    B::Data: Send,
{
    install_crypto_provider();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(cfg.connect_timeout));

    let builder = match HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!(error = %e, "no native root certificates found; HTTPS upstreams will fail verification");
            HttpsConnectorBuilder::new().with_tls_config(
                rustls::ClientConfig::builder()
                    .with_root_certificates(rustls::RootCertStore::empty())
                    .with_no_client_auth(),
            )
        }
    };

    let connector = builder
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(cfg.pool_idle_timeout)
        .build(connector)
}

/// Installs aws-lc-rs as the process-wide rustls provider if none is set.
pub fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none()
        && rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .is_err()
    {
        tracing::debug!("rustls crypto provider was installed concurrently");
    }
}

mod humantime_serde_compat {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Empty;

    #[test]
    fn config_parses_humantime_durations() {
        let cfg: HttpClientConfig =
            serde_json::from_str(r#"{"connect_timeout": "2s", "pool_idle_timeout": "1m"}"#)
                .unwrap();
        assert_eq!(cfg.connect_timeout, Duration::from_secs(2));
        assert_eq!(cfg.pool_idle_timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn client_builds_inside_runtime() {
        let _client: HttpsClient<Empty<Bytes>> = build_https_client(&HttpClientConfig::default());
        assert!(rustls::crypto::CryptoProvider::get_default().is_some());
    }
}
