//! Pagination link rewriting.
//!
//! Providers return absolute URLs under their API root. Clients only know the
//! gateway, so the API root is cut off and the remainder is handed back as a
//! path relative to the provider mount.

use serde_json::Value;

const PAGINATION_FIELDS: [&str; 2] = ["next", "previous"];

/// Rewrites every `<url>; rel="name"` entry of a `Link` header value.
#[must_use]
pub fn rewrite_link_header(header: &str, api_root: &str) -> String {
    header
        .split(',')
        .map(|entry| rewrite_link_entry(entry, api_root))
        .collect::<Vec<_>>()
        .join(",")
}

fn rewrite_link_entry(entry: &str, api_root: &str) -> String {
    let parts: Vec<&str> = entry.trim().split(';').collect();
    let [link, rel] = parts.as_slice() else {
        return entry.to_owned();
    };

    let (Some(url), Some(rel)) = (between(link, "<", ">"), between(rel, "rel=\"", "\"")) else {
        return entry.to_owned();
    };

    format!("<{}>; rel=\"{rel}\"", strip_root(url, api_root))
}

fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = s.find(open)? + open.len();
    let len = s[start..].find(close)?;
    Some(&s[start..start + len])
}

fn strip_root<'a>(url: &'a str, api_root: &str) -> &'a str {
    url.strip_prefix(api_root).unwrap_or(url)
}

/// Rewrites top-level `next`/`previous` string fields of a JSON object body.
///
/// Returns `None` when the body is not a JSON object; the caller then passes
/// the original bytes through.
#[must_use]
pub fn rewrite_pagination_body(body: &[u8], api_root: &str) -> Option<Vec<u8>> {
    let mut value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object_mut()?;

    for field in PAGINATION_FIELDS {
        if let Some(Value::String(link)) = object.get_mut(field) {
            *link = strip_root(link, api_root).to_owned();
        }
    }

    serde_json::to_vec(&value).ok()
}
