//! Per-tenant configuration: JWT verification material, provider blocks and
//! the role allow-list.

use std::{fmt, str::FromStr};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::secret;

pub const DEFAULT_GITHUB_ENDPOINT: &str = "https://api.github.com";
pub const DEFAULT_GITLAB_ENDPOINT: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_BITBUCKET_ENDPOINT: &str = "https://api.bitbucket.org/2.0";
pub const DEFAULT_BITBUCKET_TOKEN_URL: &str = "https://bitbucket.org/site/oauth2/access_token";

/// GitLab `access_token_type` value that selects the `Private-Token` header.
pub const GITLAB_PERSONAL_ACCESS: &str = "personal_access";

/// JWT signature algorithm accepted for client bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningMethod {
    #[default]
    Hs256,
    Rs256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSigningMethod(pub String);

impl fmt::Display for UnknownSigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported signing method '{}'", self.0)
    }
}

impl std::error::Error for UnknownSigningMethod {}

impl FromStr for SigningMethod {
    type Err = UnknownSigningMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "HS256" => Ok(Self::Hs256),
            "RS256" => Ok(Self::Rs256),
            other => Err(UnknownSigningMethod(other.to_owned())),
        }
    }
}

impl fmt::Display for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hs256 => "HS256",
            Self::Rs256 => "RS256",
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// `HS256` (default when empty) or `RS256`. Kept as text so an unknown
    /// value is reported per request instead of failing config decoding.
    pub method: String,
    #[serde(with = "secret")]
    pub secret: Option<SecretString>,
    /// Path to a PEM encoded RSA public key, used with `RS256`.
    pub keyfile: String,
}

impl JwtConfig {
    /// # Errors
    /// Returns `UnknownSigningMethod` for anything other than `HS256`/`RS256`.
    pub fn signing_method(&self) -> Result<SigningMethod, UnknownSigningMethod> {
        self.method.parse()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    #[serde(with = "secret")]
    pub access_token: Option<SecretString>,
    pub endpoint: String,
    pub repo: String,
}

impl GitHubConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        non_empty_or(&self.endpoint, DEFAULT_GITHUB_ENDPOINT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    #[serde(with = "secret")]
    pub access_token: Option<SecretString>,
    /// `personal_access` selects `Private-Token`; anything else is OAuth.
    pub access_token_type: String,
    pub endpoint: String,
    pub repo: String,
}

impl GitLabConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        non_empty_or(&self.endpoint, DEFAULT_GITLAB_ENDPOINT)
    }

    #[must_use]
    pub fn uses_private_token(&self) -> bool {
        self.access_token_type == GITLAB_PERSONAL_ACCESS
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BitBucketConfig {
    pub client_id: String,
    #[serde(with = "secret")]
    pub client_secret: Option<SecretString>,
    #[serde(with = "secret")]
    pub refresh_token: Option<SecretString>,
    pub endpoint: String,
    pub repo: String,
    /// OAuth token endpoint override.
    pub token_url: String,
}

impl BitBucketConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.refresh_token.is_some()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        non_empty_or(&self.endpoint, DEFAULT_BITBUCKET_ENDPOINT)
    }

    #[must_use]
    pub fn token_url(&self) -> &str {
        non_empty_or(&self.token_url, DEFAULT_BITBUCKET_TOKEN_URL)
    }
}

/// Configuration scoped to one tenant (or to the whole process in
/// single-tenant mode).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantConfig {
    pub jwt: JwtConfig,
    pub github: GitHubConfig,
    pub gitlab: GitLabConfig,
    pub bitbucket: BitBucketConfig,
    /// Role allow-list. Empty means every authenticated caller is allowed.
    pub roles: Vec<String>,
}

impl TenantConfig {
    /// Overlays `update` on top of `self`.
    ///
    /// Non-empty scalar fields and present secrets in `update` win. The role
    /// list is always taken from `update`.
    #[must_use]
    pub fn merge(mut self, update: Self) -> Self {
        override_str(&mut self.jwt.method, update.jwt.method);
        override_secret(&mut self.jwt.secret, update.jwt.secret);
        override_str(&mut self.jwt.keyfile, update.jwt.keyfile);

        override_secret(&mut self.github.access_token, update.github.access_token);
        override_str(&mut self.github.endpoint, update.github.endpoint);
        override_str(&mut self.github.repo, update.github.repo);

        override_secret(&mut self.gitlab.access_token, update.gitlab.access_token);
        override_str(
            &mut self.gitlab.access_token_type,
            update.gitlab.access_token_type,
        );
        override_str(&mut self.gitlab.endpoint, update.gitlab.endpoint);
        override_str(&mut self.gitlab.repo, update.gitlab.repo);

        override_str(&mut self.bitbucket.client_id, update.bitbucket.client_id);
        override_secret(
            &mut self.bitbucket.client_secret,
            update.bitbucket.client_secret,
        );
        override_secret(
            &mut self.bitbucket.refresh_token,
            update.bitbucket.refresh_token,
        );
        override_str(&mut self.bitbucket.endpoint, update.bitbucket.endpoint);
        override_str(&mut self.bitbucket.repo, update.bitbucket.repo);
        override_str(&mut self.bitbucket.token_url, update.bitbucket.token_url);

        self.roles = update.roles;
        self
    }

    /// JSON view with every credential replaced by `*` of the same length.
    #[must_use]
    pub fn to_redacted_json(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        secret::redact(&mut value);
        value
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

fn override_str(target: &mut String, update: String) {
    if !update.is_empty() {
        *target = update;
    }
}

fn override_secret(target: &mut Option<SecretString>, update: Option<SecretString>) {
    if let Some(s) = update
        && !s.expose_secret().is_empty()
    {
        *target = Some(s);
    }
}
