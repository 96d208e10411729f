//! Error types for the `AuthZ` resolver module.

use thiserror::Error;

/// Errors that can occur when using the `AuthZ` resolver API.
///
/// These represent infrastructure failures only. Access denial is expressed
/// via `EvaluationResponse.decision == false`.
#[derive(Debug, Error)]
pub enum AuthZResolverError {
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
