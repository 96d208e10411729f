//! Domain errors for the tenant resolver.

use tenant_resolver_sdk::{InstanceStoreError, TenantResolverError};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("operator signature is invalid: {0}")]
    InvalidSignature(String),

    #[error("instance id is missing")]
    MissingInstanceId,

    #[error("no operator token configured")]
    MissingOperatorToken,

    #[error("invalid tenant configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] InstanceStoreError),
}

impl From<jsonwebtoken::errors::Error> for DomainError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidSignature(e.to_string())
    }
}

impl From<DomainError> for TenantResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidSignature(reason) => Self::InvalidSignature(reason),
            DomainError::MissingInstanceId => Self::MissingInstanceId,
            DomainError::InvalidConfig(reason) => Self::InvalidConfig(reason),
            DomainError::MissingOperatorToken => Self::Internal(e.to_string()),
            DomainError::Store(store) => store.into(),
        }
    }
}
