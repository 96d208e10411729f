//! Tenant Resolver Module
//!
//! Multi-tenant mode only. Verifies the operator's signed assertion, loads the
//! named tenant's configuration from the instance store and hands it to the
//! rest of the request pipeline. Also backs the operator's instance
//! management endpoints.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use module::TenantResolver;
