//! `AuthZ` Resolver SDK
//!
//! - [`AuthZResolverClient`] - evaluation API consumed by the API gateway
//! - [`EvaluationRequest`] / [`EvaluationResponse`] - decision model
//! - [`AuthZResolverError`] - infrastructure failures (denial is a decision,
//!   not an error)

pub mod api;
pub mod error;
pub mod models;

pub use api::AuthZResolverClient;
pub use error::AuthZResolverError;
pub use models::{DenyReason, EvaluationRequest, EvaluationResponse};
