use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::objects::{ObjectStore, S3Objects};
use crate::store::{resolve_store, KeyValueStore};

/// Process-wide context, built exactly once at startup and injected into
/// every handler. Backend resolution happens here, so there is no lazy
/// singleton to race on.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    /// True when `store` is the in-memory fallback.
    pub fallback: bool,
    pub config: Arc<AppConfig>,
    pub objects: Option<Arc<dyn ObjectStore>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env());

        let (store, fallback) = resolve_store(&config.store).await;
        if fallback {
            warn!("running on the in-memory fallback store; content and sessions reset on restart");
        }

        let objects = match &config.objects {
            Some(objects_config) => {
                Some(Arc::new(S3Objects::new(objects_config).await?) as Arc<dyn ObjectStore>)
            }
            None => None,
        };

        Ok(Self {
            store,
            fallback,
            config,
            objects,
        })
    }

    /// Seeded fallback state for tests: default content, the default admin
    /// user, no object storage.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: crate::config::StoreConfig {
                url: None,
                token: None,
            },
            session: crate::config::SessionConfig {
                cookie_name: "portfolio-auth-token".into(),
                max_age_secs: 60 * 60 * 24,
            },
            objects: None,
        });
        Self {
            store: Arc::new(crate::store::MemoryStore::seeded()),
            fallback: true,
            config,
            objects: None,
        }
    }
}
