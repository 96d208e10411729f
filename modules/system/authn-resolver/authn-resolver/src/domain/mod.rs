//! Domain layer for the `AuthN` resolver.

pub mod error;
pub mod jwks;
pub mod keys;
pub mod local_client;
pub mod oidc;
pub mod service;
pub mod shared_secret;

pub use error::DomainError;
pub use local_client::AuthNResolverLocalClient;
pub use oidc::OidcAuthenticator;
pub use service::Service;
pub use shared_secret::SharedSecretAuthenticator;
