use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:8081".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_cors_enabled() -> bool {
    true
}

/// API gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiGatewayConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Public base URL of this gateway, reported to the operator when an
    /// instance is created.
    #[serde(default)]
    pub endpoint: String,

    /// End-to-end deadline for one request; 504 on expiry.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Global defaults
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for ApiGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            endpoint: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            cors_enabled: default_cors_enabled(),
            cors: CorsConfig::default(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Defaults {
    /// Global request body size limit in bytes
    pub body_limit_bytes: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CorsConfig {
    /// Allowed origins. Empty or `["*"]` mirrors the request origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Max age for preflight caching in seconds
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: ["GET", "HEAD", "POST", "PUT", "DELETE", "PATCH"]
                .map(str::to_owned)
                .to_vec(),
            allowed_headers: [
                "Accept",
                "Authorization",
                "Private-Token",
                "Content-Type",
                "X-JWT-AUD",
            ]
            .map(str::to_owned)
            .to_vec(),
            allow_credentials: true,
            max_age_seconds: 86_400,
        }
    }
}

impl CorsConfig {
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}
