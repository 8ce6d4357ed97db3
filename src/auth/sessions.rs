use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::store::{keys, KeyValueStore};

/// Minimal session record: the principal is just a username. Sessions have
/// no server-side expiry; they live until logout deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Created,
    Conflict,
}

/// Checks a credential pair. Unknown user, wrong password, and backend
/// failure all collapse to `false` so callers cannot enumerate usernames.
pub async fn verify_user(store: &dyn KeyValueStore, username: &str, password: &str) -> bool {
    let record = match store.get(&keys::user(username)).await {
        Ok(Some(value)) => match serde_json::from_value::<UserRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                error!(username, error = %e, "stored user record is malformed");
                return false;
            }
        },
        Ok(None) => {
            debug!(username, "login for unknown user");
            return false;
        }
        Err(e) => {
            error!(error = %e, "reading user record failed");
            return false;
        }
    };

    verify_password(password, &record.password_hash).unwrap_or(false)
}

/// Issues a new opaque token and stores the session record under it.
pub async fn create_session(store: &dyn KeyValueStore, username: &str) -> anyhow::Result<String> {
    let token = Uuid::new_v4().simple().to_string();
    let session = Session {
        username: username.to_string(),
    };
    store
        .set(&keys::session(&token), &serde_json::to_value(&session)?)
        .await?;
    Ok(token)
}

pub async fn get_session(store: &dyn KeyValueStore, token: &str) -> Option<Session> {
    match store.get(&keys::session(token)).await {
        Ok(Some(value)) => serde_json::from_value(value).ok(),
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "reading session failed");
            None
        }
    }
}

/// Deletes the session unconditionally; an absent token is a no-op.
pub async fn delete_session(store: &dyn KeyValueStore, token: &str) {
    if let Err(e) = store.delete(&keys::session(token)).await {
        warn!(error = %e, "deleting session failed");
    }
}

/// Creates the user only when the username is free. The duplicate case is a
/// result, not an error, so the caller can render a specific message.
pub async fn create_user(
    store: &dyn KeyValueStore,
    username: &str,
    password: &str,
) -> anyhow::Result<SignupOutcome> {
    let key = keys::user(username);
    if store.get(&key).await?.is_some() {
        return Ok(SignupOutcome::Conflict);
    }
    let record = UserRecord {
        username: username.to_string(),
        password_hash: hash_password(password)?,
    };
    store.set(&key, &serde_json::to_value(&record)?).await?;
    Ok(SignupOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn session_lifecycle_with_seeded_admin() {
        let store = MemoryStore::seeded();

        assert!(verify_user(&store, "admin", "password").await);
        let token = create_session(&store, "admin").await.expect("create session");

        let session = get_session(&store, &token).await.expect("session exists");
        assert_eq!(session.username, "admin");

        delete_session(&store, &token).await;
        assert!(get_session(&store, &token).await.is_none());

        // deleting again is benign
        delete_session(&store, &token).await;
    }

    #[tokio::test]
    async fn login_failure_is_indistinguishable() {
        let store = MemoryStore::seeded();
        // unknown user and wrong password yield the same answer
        assert!(!verify_user(&store, "nobody", "x").await);
        assert!(!verify_user(&store, "admin", "wrong").await);
    }

    #[tokio::test]
    async fn signup_conflicts_on_duplicate_username() {
        let store = MemoryStore::empty();

        let first = create_user(&store, "alice", "pw1").await.unwrap();
        assert_eq!(first, SignupOutcome::Created);

        let second = create_user(&store, "alice", "pw2").await.unwrap();
        assert_eq!(second, SignupOutcome::Conflict);

        // the original credential still wins
        assert!(verify_user(&store, "alice", "pw1").await);
        assert!(!verify_user(&store, "alice", "pw2").await);
    }

    #[tokio::test]
    async fn tokens_are_unique_per_login() {
        let store = MemoryStore::seeded();
        let a = create_session(&store, "admin").await.unwrap();
        let b = create_session(&store, "admin").await.unwrap();
        assert_ne!(a, b);
        // both sessions are live until deleted
        assert!(get_session(&store, &a).await.is_some());
        assert!(get_session(&store, &b).await.is_some());
    }
}
