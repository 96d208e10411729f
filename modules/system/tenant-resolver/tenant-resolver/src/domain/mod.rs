//! Domain layer for the tenant resolver.

pub mod admin;
pub mod error;
pub mod local_client;
pub mod service;
pub mod signature;

pub use admin::AdminService;
pub use error::DomainError;
pub use local_client::{InstanceAdminLocalClient, TenantResolverLocalClient};
pub use service::Service;
pub use signature::OperatorSignatureVerifier;
