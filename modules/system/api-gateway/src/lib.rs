//! API Gateway Module
//!
//! HTTP host of the git gateway. Request flow, outermost first:
//!
//! set request id -> propagate request id -> trace -> push request id to
//! extensions -> timeout -> body limit -> CORS -> error mapping -> router.
//!
//! Provider mounts and `/settings` additionally run the tenant stage and then
//! access control. The operator endpoints (multi-tenant mode only) run the
//! operator token guard instead.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod instances;
pub mod middleware;
pub mod module;
pub mod tenant;
pub mod web;

pub use config::ApiGatewayConfig;
pub use error::{ApiError, Problem};
pub use module::{ApiGateway, Dependencies};
pub use tenant::{MultiTenant, Tenancy};
