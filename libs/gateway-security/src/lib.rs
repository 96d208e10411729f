//! Security primitives shared by the Git Gateway modules: verified claims,
//! per-tenant configuration and the request-scoped context.

pub mod claims;
pub mod context;
pub mod secret;
pub mod tenant;

pub use claims::{Audience, Claims};
pub use context::{RequestContext, SIGNATURE_HEADER, UpstreamCredential};
pub use tenant::{
    BitBucketConfig, GitHubConfig, GitLabConfig, JwtConfig, SigningMethod, TenantConfig,
    UnknownSigningMethod,
};
