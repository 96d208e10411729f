//! Serde helpers for optional secrets.
//!
//! Credential fields are persisted in the instance store as plain strings and
//! held in memory as `SecretString`. An empty string decodes to `None`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Keys whose values are masked in operator-facing output.
const SECRET_KEYS: &[&str] = &[
    "secret",
    "access_token",
    "client_secret",
    "refresh_token",
    "operator_token",
];

/// Serializes an optional secret as its exposed value (`""` when absent).
///
/// # Errors
/// Propagates serializer errors.
#[allow(clippy::ref_option)]
pub fn serialize<S>(value: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_ref().map_or("", ExposeSecret::expose_secret))
}

/// Deserializes an optional secret, treating `null` and `""` as absent.
///
/// # Errors
/// Fails when the value is neither a string nor `null`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

/// Replaces every character of `secret` with `*`.
#[must_use]
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Masks every string stored under a credential key, at any depth.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) {
                    if let Value::String(s) = v {
                        *s = mask(s);
                    }
                } else {
                    redact(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(default, with = "super")]
        token: Option<SecretString>,
    }

    #[test]
    fn empty_string_is_absent() {
        let h: Holder = serde_json::from_str(r#"{"token": ""}"#).unwrap();
        assert!(h.token.is_none());

        let h: Holder = serde_json::from_str(r#"{"token": null}"#).unwrap();
        assert!(h.token.is_none());

        let h: Holder = serde_json::from_str("{}").unwrap();
        assert!(h.token.is_none());
    }

    #[test]
    fn secret_survives_persistence() {
        let h: Holder = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(h.token.as_ref().map(ExposeSecret::expose_secret), Some("abc"));
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"{"token":"abc"}"#);
    }

    #[test]
    fn mask_keeps_length() {
        assert_eq!(mask("secret"), "******");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn redact_masks_nested_credentials_only() {
        let mut v = serde_json::json!({
            "operator": { "operator_token": "abcd" },
            "tenant": { "github": { "access_token": "xyz", "repo": "acme/site" } },
            "list": [{ "secret": "s3" }]
        });
        redact(&mut v);
        assert_eq!(v["operator"]["operator_token"], "****");
        assert_eq!(v["tenant"]["github"]["access_token"], "***");
        assert_eq!(v["tenant"]["github"]["repo"], "acme/site");
        assert_eq!(v["list"][0]["secret"], "**");
    }
}
