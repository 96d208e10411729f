use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key inside `app_metadata` that carries the caller's role names.
pub const ROLES_KEY: &str = "roles";

/// Token audience: either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(aud) => aud == value,
            Self::Multiple(auds) => auds.iter().any(|aud| aud == value),
        }
    }
}

/// Identity asserted by a verified bearer credential.
///
/// Produced once per request by an authenticator and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub app_metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub user_metadata: Map<String, Value>,
}

impl Claims {
    /// Role names from `app_metadata.roles`. Non-string entries are skipped.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.app_metadata
            .get(ROLES_KEY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles().any(|r| r == role)
    }

    /// Replaces the role list in `app_metadata`.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = roles
            .into_iter()
            .map(|r| Value::String(r.into()))
            .collect();
        self.app_metadata
            .insert(ROLES_KEY.to_owned(), Value::Array(roles));
        self
    }
}
