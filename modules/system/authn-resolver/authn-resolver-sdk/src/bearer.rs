//! `Authorization` header parsing.

use http::{HeaderMap, header::AUTHORIZATION};

/// Extracts the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively and must be followed by a single
/// space and exactly one non-whitespace token.
#[must_use]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return None;
    }
    Some(token)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn scheme_is_case_insensitive() {
        for scheme in ["Bearer", "bearer", "BEARER", "BeArEr"] {
            assert_eq!(
                extract_bearer_token(&headers(&format!("{scheme} abc.def"))),
                Some("abc.def"),
                "{scheme}"
            );
        }
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(extract_bearer_token(&headers("Bearerabc")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer\tabc")), None);
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer  abc")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer abc def")), None);
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
