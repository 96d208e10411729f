//! Tenant Resolver SDK
//!
//! - [`TenantResolverClient`] - turns an operator signature into a tenant scope
//! - [`InstanceAdminClient`] - operator-facing instance management
//! - [`InstanceStore`] - persistence contract for tenant records
//! - [`Instance`], [`ResolvedTenant`], [`OperatorClaims`] - models
//! - [`TenantResolverError`], [`InstanceStoreError`] - errors

pub mod api;
pub mod error;
pub mod models;
pub mod store;

pub use api::{InstanceAdminClient, TenantResolverClient};
pub use error::{InstanceStoreError, TenantResolverError};
pub use models::{Instance, NewInstance, OperatorClaims, ResolvedTenant};
pub use store::InstanceStore;
