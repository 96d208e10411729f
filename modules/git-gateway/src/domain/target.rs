//! Upstream URL construction.
//!
//! Everything here works on escaped text. The request path is never decoded,
//! so `%2F` inside a GitLab file path reaches the provider verbatim.

use http::Uri;
use url::{Position, Url};

/// Joins `a` and `b` with exactly one `/` between them.
#[must_use]
pub fn single_joining_slash(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{a}{}", &b[1..]),
        (false, false) => format!("{a}/{b}"),
        _ => format!("{a}{b}"),
    }
}

/// Builds the upstream URI for a request.
///
/// `path` is the escaped request path with the mount prefix already replaced
/// by `/`. `query` is the raw inbound query; it is appended after any query
/// the API root carries.
///
/// # Errors
/// Returns a description of the problem when `api_root` is not an absolute
/// URL or the result is not a valid URI.
pub fn build_upstream_uri(api_root: &str, path: &str, query: Option<&str>) -> Result<Uri, String> {
    let root = Url::parse(api_root).map_err(|e| format!("invalid API root '{api_root}': {e}"))?;
    if !root.has_host() {
        return Err(format!("API root '{api_root}' has no host"));
    }

    let origin = &root[..Position::AfterPort];
    let joined_path = single_joining_slash(root.path(), path);

    let query = match (root.query().filter(|q| !q.is_empty()), query.filter(|q| !q.is_empty())) {
        (Some(a), Some(b)) => format!("?{a}&{b}"),
        (Some(q), None) | (None, Some(q)) => format!("?{q}"),
        (None, None) => String::new(),
    };

    format!("{origin}{joined_path}{query}")
        .parse::<Uri>()
        .map_err(|e| e.to_string())
}
