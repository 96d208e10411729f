use std::sync::Arc;

use anyhow::{Context, Result};
use api_gateway::{ApiGateway, Dependencies, MultiTenant, Tenancy};
use authn_resolver::AuthNResolver;
use authz_resolver::AuthZResolver;
use git_gateway::GitGateway;
use tenant_resolver::TenantResolver;
use tenant_resolver::infra::storage::InMemoryInstanceStore;
use tracing::info;

use crate::config::AppConfig;

/// Wires the resolvers and the provider gateway into an [`ApiGateway`].
///
/// In single-tenant mode the fixed tenant's key material is checked here so a
/// bad key file stops the process instead of failing every request.
///
/// # Errors
/// Any module initialization failure, a missing operator token in
/// multi-instance mode, or unusable tenant JWT settings.
pub fn build(config: AppConfig) -> Result<ApiGateway> {
    let authn = AuthNResolver::init(&config.authn).context("initializing authn_resolver")?;
    let authz = AuthZResolver::init(&config.authz);
    let git = GitGateway::init(&config.git_gateway).context("initializing git_gateway")?;

    let tenancy = if config.multi_instance_mode {
        let operator_token = config
            .operator
            .operator_token
            .clone()
            .context("multi_instance_mode requires operator.operator_token")?;
        let resolver = TenantResolver::init(&config.operator, Arc::new(InMemoryInstanceStore::new()))
            .context("initializing tenant_resolver")?;
        info!("multi-instance mode; tenants resolved from operator signatures");
        Tenancy::Multi(Arc::new(MultiTenant {
            resolver: resolver.client(),
            admin: resolver.admin_client(),
            operator_token,
        }))
    } else {
        authn
            .validate_tenant(&config.tenant)
            .context("tenant JWT settings are unusable")?;
        info!(
            github = config.tenant.github.is_enabled(),
            gitlab = config.tenant.gitlab.is_enabled(),
            bitbucket = config.tenant.bitbucket.is_enabled(),
            "single-tenant mode"
        );
        Tenancy::Single(Arc::new(config.tenant))
    };

    Ok(ApiGateway::new(
        config.server,
        tenancy,
        Dependencies {
            authn: authn.client(),
            authz: authz.client(),
            git,
        },
    ))
}
