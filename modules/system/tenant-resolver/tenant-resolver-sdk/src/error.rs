//! Error types for the tenant resolver module.

use thiserror::Error;

/// Errors that can occur when using the tenant resolver API.
#[derive(Debug, Error)]
pub enum TenantResolverError {
    /// The operator signature is malformed or fails verification.
    #[error("operator signature is invalid: {0}")]
    InvalidSignature(String),

    /// The verified signature carries no tenant identifier.
    #[error("instance id is missing")]
    MissingInstanceId,

    /// No tenant with this identifier exists.
    #[error("instance not found: {instance_id}")]
    NotFound { instance_id: String },

    /// An instance with this operator uuid already exists.
    #[error("an instance with uuid '{uuid}' already exists")]
    AlreadyExists { uuid: String },

    /// The tenant configuration blob cannot be decoded.
    #[error("invalid tenant configuration: {0}")]
    InvalidConfig(String),

    /// An internal error occurred (e.g. store unavailable).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors reported by an [`InstanceStore`](crate::InstanceStore).
#[derive(Debug, Error)]
pub enum InstanceStoreError {
    #[error("instance not found: {0}")]
    NotFound(String),

    #[error("an instance with uuid '{0}' already exists")]
    AlreadyExists(String),

    #[error("instance store failure: {0}")]
    Internal(String),
}

impl From<InstanceStoreError> for TenantResolverError {
    fn from(e: InstanceStoreError) -> Self {
        match e {
            InstanceStoreError::NotFound(instance_id) => Self::NotFound { instance_id },
            InstanceStoreError::AlreadyExists(uuid) => Self::AlreadyExists { uuid },
            InstanceStoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}
