//! Token managers keyed by provider instance.

use std::sync::Arc;

use axum::body::Body;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gateway_http::HttpsClient;
use gateway_security::BitBucketConfig;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use super::{OAuthRefresher, TokenError, TokenManager};

/// Owns the current [`TokenManager`] of each provider credential.
///
/// Each scope holds one manager, tagged with a fingerprint of the OAuth
/// client and refresh token it was built from. A lookup with different
/// credentials replaces the manager instead of reusing a token minted for the
/// old ones.
pub struct TokenManagerRegistry {
    client: HttpsClient<Body>,
    managers: DashMap<String, Slot>,
}

struct Slot {
    fingerprint: String,
    manager: Arc<TokenManager>,
}

impl TokenManagerRegistry {
    #[must_use]
    pub fn new(client: HttpsClient<Body>) -> Self {
        Self {
            client,
            managers: DashMap::new(),
        }
    }

    /// Returns the manager for `scope`'s BitBucket credential, creating it on
    /// first use or when the credential changed since the last call.
    ///
    /// # Errors
    /// `TokenError::Config` if the configuration has no refresh token or an
    /// invalid token URL.
    pub fn bitbucket(
        &self,
        scope: &str,
        cfg: &BitBucketConfig,
    ) -> Result<Arc<TokenManager>, TokenError> {
        let refresh_token = cfg
            .refresh_token
            .clone()
            .ok_or_else(|| TokenError::Config("no refresh token configured".to_owned()))?;
        let key = bitbucket_key(scope);
        let fingerprint = fingerprint(cfg, &refresh_token);

        if let Some(slot) = self.managers.get(&key)
            && slot.fingerprint == fingerprint
        {
            return Ok(Arc::clone(&slot.manager));
        }

        let refresher = OAuthRefresher::new(
            self.client.clone(),
            cfg.token_url(),
            cfg.client_id.clone(),
            cfg.client_secret.clone(),
            refresh_token,
        )?;

        let fresh = Slot {
            fingerprint,
            manager: Arc::new(TokenManager::new(Arc::new(refresher))),
        };
        let manager = match self.managers.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().fingerprint != fresh.fingerprint {
                    tracing::info!(scope, "BitBucket credentials changed; replacing token manager");
                    entry.insert(fresh);
                }
                Arc::clone(&entry.get().manager)
            }
            Entry::Vacant(entry) => Arc::clone(&entry.insert(fresh).manager),
        };
        Ok(manager)
    }

    /// Drops every manager held for `scope`.
    pub fn evict(&self, scope: &str) {
        if self.managers.remove(&bitbucket_key(scope)).is_some() {
            tracing::debug!(scope, "evicted token managers");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

fn bitbucket_key(scope: &str) -> String {
    format!("bitbucket:{scope}")
}

fn fingerprint(cfg: &BitBucketConfig, refresh_token: &SecretString) -> String {
    let secret = cfg
        .client_secret
        .as_ref()
        .map_or("", ExposeSecret::expose_secret);
    let mut hasher = Sha256::new();
    for part in [
        cfg.client_id.as_str(),
        secret,
        cfg.token_url(),
        refresh_token.expose_secret(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0]);
    }
    hex::encode(&hasher.finalize()[..8])
}
