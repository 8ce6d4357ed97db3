use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::auth::password::hash_password;
use crate::content::defaults;
use crate::store::{keys, KeyValueStore};

/// In-process fallback store. Non-durable: everything resets on restart.
/// Seeded with the default content so the public site renders without any
/// live store; the session namespace starts empty.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn seeded() -> Self {
        let mut data = HashMap::new();

        match defaults::default_content() {
            Ok(entries) => {
                for (key, value) in entries {
                    data.insert(key.to_string(), value);
                }
            }
            Err(e) => error!(error = %e, "serializing default content failed"),
        }

        match hash_password(defaults::DEFAULT_ADMIN_PASSWORD) {
            Ok(hash) => {
                data.insert(
                    keys::user(defaults::DEFAULT_ADMIN_USERNAME),
                    json!({
                        "username": defaults::DEFAULT_ADMIN_USERNAME,
                        "passwordHash": hash,
                    }),
                );
            }
            Err(e) => error!(error = %e, "hashing the default admin credential failed"),
        }

        Self {
            data: RwLock::new(data),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        debug!(key, "memory store get");
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> anyhow::Result<()> {
        debug!(key, "memory store set");
        self.data.write().await.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        debug!(key, "memory store delete");
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_store_carries_default_content() {
        let store = MemoryStore::seeded();
        for key in [
            keys::PROFILE,
            keys::PROJECTS,
            keys::EXPERIENCES,
            keys::EDUCATION,
            keys::TESTIMONIALS,
        ] {
            assert!(
                store.get(key).await.expect("get").is_some(),
                "{key} should be seeded"
            );
        }
        // sessions start empty, the admin user does not
        assert!(store.get(&keys::session("anything")).await.unwrap().is_none());
        assert!(store.get(&keys::user("admin")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn set_get_delete_roundtrip() {
        let store = MemoryStore::empty();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", &json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 1})));

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());

        // deleting an absent key is a no-op
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn ping_is_always_live() {
        assert!(MemoryStore::empty().ping().await);
    }
}
