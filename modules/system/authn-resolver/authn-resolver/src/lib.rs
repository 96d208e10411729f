//! `AuthN` Resolver Module
//!
//! Verifies client bearer tokens. The active policy is chosen once from
//! configuration:
//!
//! - `shared_secret`: JWT signed with the tenant's HS256 secret or RS256 key
//! - `third_party`: token issued by an OpenID Connect provider, verified
//!   against its JWKS
//!
//! Provides the `AuthNResolverClient` implementation consumed by the API gateway.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use module::AuthNResolver;
