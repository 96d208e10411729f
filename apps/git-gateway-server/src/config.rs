//! Process configuration.
//!
//! Layers, lowest precedence first: built-in defaults, the optional YAML file
//! passed with `--config`, then `GITGATEWAY_*` environment variables with
//! `__` separating nested keys (`GITGATEWAY_TENANT__GITHUB__ACCESS_TOKEN`).

use std::path::Path;

use anyhow::{Context, Result, bail};
use api_gateway::ApiGatewayConfig;
use authn_resolver::config::AuthNResolverConfig;
use authz_resolver::config::AuthZResolverConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use gateway_security::TenantConfig;
use git_gateway::GitGatewayConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tenant_resolver::config::TenantResolverConfig;

pub const ENV_PREFIX: &str = "GITGATEWAY_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ApiGatewayConfig,
    /// Resolve the tenant per request from the operator signature instead of
    /// using the fixed `tenant` block.
    pub multi_instance_mode: bool,
    /// Single-tenant configuration. Ignored in multi-instance mode.
    pub tenant: TenantConfig,
    pub operator: TenantResolverConfig,
    pub authn: AuthNResolverConfig,
    pub authz: AuthZResolverConfig,
    pub git_gateway: GitGatewayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Builds the effective configuration.
    ///
    /// # Errors
    /// Fails when the file does not exist or any layer does not decode.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Configuration as JSON with every credential masked.
    ///
    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_redacted_json(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self).context("serializing configuration")?;
        gateway_security::secret::redact(&mut value);
        Ok(value)
    }
}
