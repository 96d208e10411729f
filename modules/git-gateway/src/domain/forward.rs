//! Outbound request preparation.

use gateway_security::{SIGNATURE_HEADER, UpstreamCredential};
use http::header::{AUTHORIZATION, CONNECTION, HOST, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri, request::Parts};
use secrecy::ExposeSecret;

use super::{GatewayError, Provider};

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const PRIVATE_TOKEN: &str = "private-token";
const CLIENT_IP: &str = "client-ip";

/// Rewrites the inbound request head into the upstream one.
///
/// The client's own credentials never leave the gateway. `OPTIONS` requests
/// go out without any credential.
///
/// # Errors
/// `GatewayError::InvalidCredential` if the credential cannot be carried in a
/// header; the request must not be sent without it.
pub fn prepare(
    provider: Provider,
    parts: &mut Parts,
    uri: Uri,
    credential: Option<&UpstreamCredential>,
) -> Result<(), GatewayError> {
    strip_hop_by_hop(&mut parts.headers);
    parts.headers.remove(HOST);
    parts.headers.remove(AUTHORIZATION);
    parts.headers.remove(PRIVATE_TOKEN);
    parts.headers.remove(SIGNATURE_HEADER);
    if provider == Provider::GitLab {
        parts.headers.remove(CLIENT_IP);
    }

    parts.uri = uri;

    if parts.method == Method::OPTIONS {
        return Ok(());
    }
    if let Some(credential) = credential {
        let (name, value) =
            credential_header(credential).map_err(|e| GatewayError::InvalidCredential {
                provider,
                reason: e.to_string(),
            })?;
        parts.headers.insert(name, value);
    }
    Ok(())
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn credential_header(
    credential: &UpstreamCredential,
) -> Result<(HeaderName, HeaderValue), http::header::InvalidHeaderValue> {
    let (name, raw) = match credential {
        UpstreamCredential::Bearer(token) => {
            (AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
        }
        UpstreamCredential::PrivateToken(token) => {
            (
                HeaderName::from_static(PRIVATE_TOKEN),
                token.expose_secret().to_owned(),
            )
        }
    };
    let mut value = HeaderValue::from_str(&raw)?;
    value.set_sensitive(true);
    Ok((name, value))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::Request;
    use http::header::USER_AGENT;
    use secrecy::SecretString;

    fn parts(method: Method) -> Parts {
        Request::builder()
            .method(method)
            .uri("/github/contents/README.md")
            .header(HOST, "gateway.example.com")
            .header(AUTHORIZATION, "Bearer client-jwt")
            .header("private-token", "forged")
            .header(SIGNATURE_HEADER, "operator-sig")
            .header("client-ip", "10.0.0.1")
            .header(CONNECTION, "keep-alive, x-custom-hop")
            .header("x-custom-hop", "1")
            .header("accept", "application/json")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn bearer(token: &str) -> UpstreamCredential {
        UpstreamCredential::Bearer(SecretString::from(token.to_owned()))
    }

    #[test]
    fn client_credentials_are_replaced() {
        let mut p = parts(Method::GET);
        let uri: Uri = "https://api.github.com/repos/acme/site/contents/README.md"
            .parse()
            .unwrap();
        prepare(Provider::GitHub, &mut p, uri.clone(), Some(&bearer("gh-token"))).unwrap();

        assert_eq!(p.uri, uri);
        assert_eq!(p.headers[AUTHORIZATION], "Bearer gh-token");
        assert!(p.headers[AUTHORIZATION].is_sensitive());
        assert!(p.headers.get("private-token").is_none());
        assert!(p.headers.get(SIGNATURE_HEADER).is_none());
        assert!(p.headers.get(HOST).is_none());
        assert!(p.headers.get(CONNECTION).is_none());
        assert!(p.headers.get("x-custom-hop").is_none());
        assert_eq!(p.headers["accept"], "application/json");
        // Only GitLab drops Client-IP.
        assert!(p.headers.get("client-ip").is_some());
    }

    #[test]
    fn gitlab_private_token_and_client_ip() {
        let mut p = parts(Method::POST);
        let cred = UpstreamCredential::PrivateToken(SecretString::from("gl-token".to_owned()));
        prepare(
            Provider::GitLab,
            &mut p,
            Uri::from_static("https://gitlab.com/api/v4/projects/1/merge_requests"),
            Some(&cred),
        )
        .unwrap();

        assert_eq!(p.headers["private-token"], "gl-token");
        assert!(p.headers.get(AUTHORIZATION).is_none());
        assert!(p.headers.get("client-ip").is_none());
    }

    #[test]
    fn options_requests_carry_no_credential() {
        let mut p = parts(Method::OPTIONS);
        prepare(
            Provider::BitBucket,
            &mut p,
            Uri::from_static("https://api.bitbucket.org/2.0/repositories/acme/site/src"),
            Some(&bearer("bb-token")),
        )
        .unwrap();
        assert!(p.headers.get(AUTHORIZATION).is_none());
        assert!(p.headers.get("private-token").is_none());
    }

    #[test]
    fn user_agent_is_not_invented() {
        let mut p = parts(Method::GET);
        prepare(
            Provider::GitHub,
            &mut p,
            Uri::from_static("https://api.github.com/repos/a/b/pulls"),
            Some(&bearer("t")),
        )
        .unwrap();
        assert!(p.headers.get(USER_AGENT).is_none());
    }

    #[test]
    fn unencodable_credential_fails_the_request() {
        for credential in [
            bearer("gh-token\r\nx-injected: 1"),
            UpstreamCredential::PrivateToken(SecretString::from("gl\ntoken".to_owned())),
        ] {
            let mut p = parts(Method::GET);
            let err = prepare(
                Provider::GitLab,
                &mut p,
                Uri::from_static("https://gitlab.com/api/v4/projects/1"),
                Some(&credential),
            )
            .unwrap_err();

            assert!(matches!(err, GatewayError::InvalidCredential { .. }));
            assert_eq!(err.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.public_message(), "Unable to process GitLab endpoint");
            assert!(p.headers.get(AUTHORIZATION).is_none());
            assert!(p.headers.get("private-token").is_none());
        }
    }
}
