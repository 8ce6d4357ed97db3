use async_trait::async_trait;
use serde_json::Value;

pub mod memory;
pub mod redis;
pub mod resolver;

pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use resolver::resolve_store;

/// Minimal key/value contract shared by the live store and the in-process
/// fallback. Values are opaque JSON trees; the store never interprets them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn set(&self, key: &str, value: &Value) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    async fn ping(&self) -> bool;
}

/// Well-known keys. Every collection lives under a single key as one
/// serialized value; sessions and users get one key each under a prefix.
pub mod keys {
    pub const PROFILE: &str = "profile";
    pub const PROJECTS: &str = "projects";
    pub const EXPERIENCES: &str = "experiences";
    pub const EDUCATION: &str = "education";
    pub const TESTIMONIALS: &str = "testimonials";
    pub const MESSAGES: &str = "messages";

    pub const SESSION_PREFIX: &str = "session:";
    pub const USER_PREFIX: &str = "user:";

    pub fn session(token: &str) -> String {
        format!("{SESSION_PREFIX}{token}")
    }

    pub fn user(username: &str) -> String {
        format!("{USER_PREFIX}{username}")
    }
}
