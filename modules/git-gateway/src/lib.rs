//! Git Gateway Module
//!
//! One proxy per git hosting provider. Each request is admitted against the
//! provider's path allow-list, rewritten onto the configured repository's API
//! root, forwarded with the repository credential swapped in, and its
//! response rewritten so pagination links point back at the gateway.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::GitGatewayConfig;
pub use domain::{GatewayError, Provider};
pub use module::GitGateway;
