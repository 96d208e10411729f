use std::time::Duration;

use http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Builds the gateway's CORS policy.
///
/// With no explicit origin list the request origin is mirrored, which keeps
/// credentialed requests valid. Explicit lists reject (and log) any other
/// origin.
#[must_use]
pub fn build_cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let allow_origin = if cfg.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let allowed: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::predicate(move |origin: &HeaderValue, _req: &http::request::Parts| {
            let is_allowed = allowed.contains(origin);
            if !is_allowed {
                tracing::warn!(
                    origin = origin.to_str().unwrap_or("<non-utf8>"),
                    "CORS origin rejected"
                );
            }
            is_allowed
        })
    };

    let methods: Vec<Method> = cfg
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    let headers: Vec<HeaderName> = cfg
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(cfg.allow_credentials)
        .max_age(Duration::from_secs(cfg.max_age_seconds))
}
