//! `AuthN` Resolver SDK
//!
//! Public surface of the `authn_resolver` module:
//!
//! - [`AuthNResolverClient`] - tenant-aware entry point used by the API gateway
//! - [`AuthenticatorPlugin`] - one verification strategy (shared secret, OIDC)
//! - [`AuthenticationResult`] - verified claims
//! - [`AuthNResolverError`] - error types
//! - [`extract_bearer_token`] - `Authorization` header parsing
//!
//! ## Usage
//!
//! ```ignore
//! use authn_resolver_sdk::{AuthNResolverClient, extract_bearer_token};
//!
//! let token = extract_bearer_token(req.headers()).ok_or(...)?;
//! let result = authn.authenticate(&tenant_config, token).await?;
//! let claims = result.claims;
//! ```

pub mod api;
pub mod bearer;
pub mod error;
pub mod models;
pub mod plugin_api;

pub use api::AuthNResolverClient;
pub use bearer::extract_bearer_token;
pub use error::AuthNResolverError;
pub use models::AuthenticationResult;
pub use plugin_api::AuthenticatorPlugin;
