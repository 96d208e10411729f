//! Domain layer for the provider gateways.

pub mod error;
pub mod forward;
pub mod links;
pub mod provider;
pub mod service;
pub mod target;
pub mod token;
pub mod transform;

pub use error::GatewayError;
pub use provider::Provider;
pub use service::Service;
