//! Single-flight token cache.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::{TokenError, TokenRefresher, UpstreamToken};

/// Caches one provider credential and refreshes it on demand.
///
/// The lock is held across the validity check and the refresh, so callers
/// that find the token expired queue behind the one refreshing it and then
/// receive its result instead of refreshing again.
pub struct TokenManager {
    refresher: Arc<dyn TokenRefresher>,
    current: Mutex<Option<UpstreamToken>>,
}

impl TokenManager {
    #[must_use]
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            refresher,
            current: Mutex::new(None),
        }
    }

    /// # Errors
    /// The refresher's error when no valid token is cached and refreshing
    /// fails. The next caller tries again.
    pub async fn get_token(&self) -> Result<UpstreamToken, TokenError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref()
            && token.is_valid()
        {
            return Ok(token.clone());
        }

        tracing::debug!("refreshing upstream access token");
        let token = self.refresher.refresh().await?;
        *current = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingRefresher {
        calls: AtomicUsize,
        expires_in: Option<Duration>,
        fail: bool,
    }

    impl CountingRefresher {
        fn new(expires_in: Option<Duration>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                expires_in,
                fail: false,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self) -> Result<UpstreamToken, TokenError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(TokenError::Transport("connection refused".to_owned()));
            }
            Ok(UpstreamToken::new(
                SecretString::from(format!("token-{n}")),
                self.expires_in,
            ))
        }
    }

    #[tokio::test]
    async fn valid_token_is_reused() {
        let refresher = CountingRefresher::new(Some(Duration::from_secs(3600)));
        let manager = TokenManager::new(refresher.clone());

        let a = manager.get_token().await.unwrap();
        let b = manager.get_token().await.unwrap();
        assert_eq!(a.access_token().expose_secret(), "token-1");
        assert_eq!(b.access_token().expose_secret(), "token-1");
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed() {
        // Tokens expiring within the delta are never considered valid.
        let refresher = CountingRefresher::new(Some(Duration::from_secs(1)));
        let manager = TokenManager::new(refresher.clone());

        manager.get_token().await.unwrap();
        let second = manager.get_token().await.unwrap();
        assert_eq!(second.access_token().expose_secret(), "token-2");
        assert_eq!(refresher.calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let refresher = CountingRefresher::new(Some(Duration::from_secs(3600)));
        let manager = Arc::new(TokenManager::new(refresher.clone()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.get_token().await })
            })
            .collect();

        for task in tasks {
            let token = task.await.unwrap().unwrap();
            assert_eq!(token.access_token().expose_secret(), "token-1");
        }
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn failure_is_surfaced_and_retried_by_next_caller() {
        let refresher = Arc::new(CountingRefresher {
            calls: AtomicUsize::new(0),
            expires_in: None,
            fail: true,
        });
        let manager = TokenManager::new(refresher.clone());

        assert!(matches!(
            manager.get_token().await,
            Err(TokenError::Transport(_))
        ));
        assert!(manager.get_token().await.is_err());
        assert_eq!(refresher.calls(), 2);
    }
}
