use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::StoreConfig;
use crate::store::{KeyValueStore, MemoryStore, RedisStore};

/// Scheme the live store URL must use. Anything else falls back.
const SECURE_SCHEME: &str = "rediss://";

/// Pick the backend once, at startup. Missing or malformed configuration and
/// connection failures all resolve to the seeded in-memory fallback; the
/// process prefers degraded-but-running over crash-on-misconfiguration.
/// Returns the store and whether it is the fallback.
pub async fn resolve_store(config: &StoreConfig) -> (Arc<dyn KeyValueStore>, bool) {
    let (Some(url), Some(token)) = (&config.url, &config.token) else {
        info!("store credentials not set, using in-memory fallback");
        return (Arc::new(MemoryStore::seeded()), true);
    };

    if !url.starts_with(SECURE_SCHEME) {
        warn!(url, "store URL must use the rediss:// scheme, using in-memory fallback");
        return (Arc::new(MemoryStore::seeded()), true);
    }

    match RedisStore::connect(url, token).await {
        Ok(store) => {
            info!("connected to live store");
            (Arc::new(store), false)
        }
        Err(e) => {
            error!(error = %e, "connecting to live store failed, using in-memory fallback");
            (Arc::new(MemoryStore::seeded()), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_resolve_to_fallback() {
        let config = StoreConfig {
            url: None,
            token: None,
        };
        let (store, fallback) = resolve_store(&config).await;
        assert!(fallback);
        assert!(store.ping().await);
    }

    #[tokio::test]
    async fn missing_token_resolves_to_fallback() {
        let config = StoreConfig {
            url: Some("rediss://store.example.com:6379".into()),
            token: None,
        };
        let (_, fallback) = resolve_store(&config).await;
        assert!(fallback);
    }

    #[tokio::test]
    async fn insecure_scheme_resolves_to_fallback() {
        let config = StoreConfig {
            url: Some("redis://store.example.com:6379".into()),
            token: Some("secret".into()),
        };
        let (_, fallback) = resolve_store(&config).await;
        assert!(fallback);
    }
}
