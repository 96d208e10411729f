//! Domain layer for the `AuthZ` resolver.

pub mod local_client;
pub mod service;

pub use local_client::AuthZResolverLocalClient;
pub use service::Service;
