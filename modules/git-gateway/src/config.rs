//! Configuration for the provider gateways.

use gateway_http::HttpClientConfig;
use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitGatewayConfig {
    /// Outbound client used for provider calls and OAuth refreshes.
    pub http_client: HttpClientConfig,
}
