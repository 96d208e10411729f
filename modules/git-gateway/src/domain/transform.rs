//! Upstream response rewriting.

use std::io::{Read, Write};

use axum::body::Body;
use bytes::Bytes;
use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue, LINK,
    TRANSFER_ENCODING,
};
use http::{HeaderMap, Response};
use http_body_util::BodyExt;

use super::links::{rewrite_link_header, rewrite_pagination_body};
use super::{GatewayError, Provider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Identity,
    Gzip,
    Deflate,
}

impl Encoding {
    fn of(headers: &HeaderMap) -> Option<Self> {
        let Some(value) = headers.get(CONTENT_ENCODING) else {
            return Some(Self::Identity);
        };
        let value = value.to_str().ok()?.trim();
        [
            ("identity", Self::Identity),
            ("gzip", Self::Gzip),
            ("deflate", Self::Deflate),
        ]
        .into_iter()
        .find_map(|(name, enc)| value.eq_ignore_ascii_case(name).then_some(enc))
    }

    fn decode(self, body: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Self::Identity => out.extend_from_slice(body),
            Self::Gzip => {
                GzDecoder::new(body).read_to_end(&mut out)?;
            }
            Self::Deflate => {
                ZlibDecoder::new(body).read_to_end(&mut out)?;
            }
        }
        Ok(out)
    }

    fn encode(self, body: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Identity => Ok(body.to_vec()),
            Self::Gzip => {
                let mut enc = GzEncoder::new(Vec::new(), Compression::default());
                enc.write_all(body)?;
                enc.finish()
            }
            Self::Deflate => {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(body)?;
                enc.finish()
            }
        }
    }
}

/// Applies the provider's response rules.
///
/// - upstream `Access-Control-Allow-Origin` is dropped (the gateway's own
///   CORS layer answers instead)
/// - pagination links are rewritten to gateway-relative paths
/// - 5xx bodies are logged and passed through unchanged
///
/// # Errors
/// `GatewayError::Upstream` if the upstream body cannot be read.
pub async fn transform_response(
    provider: Provider,
    api_root: &str,
    response: Response<Body>,
) -> Result<Response<Body>, GatewayError> {
    let (mut parts, body) = response.into_parts();
    parts.headers.remove(ACCESS_CONTROL_ALLOW_ORIGIN);

    if provider.paginates_with_link_header()
        && let Some(link) = parts.headers.get(LINK).and_then(|v| v.to_str().ok())
    {
        let rewritten = rewrite_link_header(link, api_root);
        match HeaderValue::from_str(&rewritten) {
            Ok(value) => {
                parts.headers.insert(LINK, value);
            }
            Err(e) => tracing::warn!(error = %e, "rewritten Link header is not a valid header value"),
        }
    }

    if parts.status.is_server_error() {
        let bytes = collect(provider, body).await?;
        tracing::warn!(
            provider = %provider,
            status = parts.status.as_u16(),
            body = %String::from_utf8_lossy(&bytes),
            "Proxied host returned server error"
        );
        return Ok(Response::from_parts(parts, Body::from(bytes)));
    }

    if provider.paginates_with_json_body() && is_json(&parts.headers) {
        let Some(encoding) = Encoding::of(&parts.headers) else {
            return Ok(Response::from_parts(parts, body));
        };
        let raw = collect(provider, body).await?;
        let out = rewrite_encoded_body(&raw, encoding, api_root).unwrap_or(raw);

        parts.headers.remove(TRANSFER_ENCODING);
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(out.len()));
        return Ok(Response::from_parts(parts, Body::from(out)));
    }

    Ok(Response::from_parts(parts, body))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn rewrite_encoded_body(raw: &[u8], encoding: Encoding, api_root: &str) -> Option<Bytes> {
    let plain = match encoding.decode(raw) {
        Ok(plain) => plain,
        Err(e) => {
            tracing::warn!(error = %e, ?encoding, "failed to decode upstream body; passing through");
            return None;
        }
    };
    let rewritten = rewrite_pagination_body(&plain, api_root)?;
    match encoding.encode(&rewritten) {
        Ok(encoded) => Some(Bytes::from(encoded)),
        Err(e) => {
            tracing::warn!(error = %e, ?encoding, "failed to re-encode upstream body; passing through");
            None
        }
    }
}

async fn collect(provider: Provider, body: Body) -> Result<Bytes, GatewayError> {
    body.collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| GatewayError::Upstream {
            provider,
            reason: format!("failed reading upstream body: {e}"),
        })
}
