use serde_json::{json, Map, Value};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error, info};

use crate::content::defaults::{self, DEFAULT_PROFILE_IMAGE};
use crate::content::dto::ContactForm;
use crate::content::types::{Collection, ContactMessage, Profile};
use crate::store::{keys, KeyValueStore};

/// Not-found is distinct from a backend failure so handlers can answer 404
/// for the former and 500 for the latter.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("item not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

fn now_ts() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn now_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Timestamp plus a random suffix: monotonic enough to sort roughly by
/// creation time and wide enough to not collide within one millisecond.
fn new_item_id() -> String {
    format!("{}-{:08x}", now_millis(), rand::random::<u32>())
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

async fn read_items(store: &dyn KeyValueStore, key: &str) -> anyhow::Result<Vec<Value>> {
    Ok(match store.get(key).await? {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    })
}

/// Returns the stored profile, seeding the default on first read. Never
/// fails: the marketing page renders the default rather than an error page
/// when the backend is unreachable.
pub async fn get_profile(store: &dyn KeyValueStore) -> Profile {
    match store.get(keys::PROFILE).await {
        Ok(Some(value)) => match serde_json::from_value::<Profile>(value) {
            Ok(mut profile) => {
                if profile.image.is_none() {
                    profile.image = Some(DEFAULT_PROFILE_IMAGE.into());
                }
                profile
            }
            Err(e) => {
                error!(error = %e, "stored profile is malformed, serving default");
                defaults::default_profile()
            }
        },
        Ok(None) => {
            let profile = defaults::default_profile();
            match serde_json::to_value(&profile) {
                Ok(value) => {
                    if let Err(e) = store.set(keys::PROFILE, &value).await {
                        error!(error = %e, "seeding default profile failed");
                    }
                }
                Err(e) => error!(error = %e, "serializing default profile failed"),
            }
            profile
        }
        Err(e) => {
            error!(error = %e, "reading profile failed, serving default");
            defaults::default_profile()
        }
    }
}

/// Shallow merge at the top level: nested objects present in the patch
/// (stats, socialLinks, ...) replace the stored ones wholesale. This is an
/// explicit administrative action, so failures propagate.
pub async fn update_profile(
    store: &dyn KeyValueStore,
    patch: Map<String, Value>,
) -> anyhow::Result<Value> {
    let mut current = match store.get(keys::PROFILE).await? {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (field, value) in patch {
        current.insert(field, value);
    }
    let value = Value::Object(current);
    store.set(keys::PROFILE, &value).await?;
    Ok(value)
}

/// Full-collection read. Degrades to an empty list on backend failure so
/// public pages keep rendering.
pub async fn list_collection(store: &dyn KeyValueStore, kind: Collection) -> Vec<Value> {
    match read_items(store, kind.key()).await {
        Ok(items) => items,
        Err(e) => {
            error!(collection = kind.key(), error = %e, "collection read failed, serving empty list");
            Vec::new()
        }
    }
}

pub async fn get_item(store: &dyn KeyValueStore, kind: Collection, id: &str) -> Option<Value> {
    list_collection(store, kind)
        .await
        .into_iter()
        .find(|item| item_id(item) == Some(id))
}

/// Full-collection overwrite, used by the bulk-edit forms.
pub async fn replace_collection(
    store: &dyn KeyValueStore,
    kind: Collection,
    items: Vec<Value>,
) -> anyhow::Result<()> {
    store.set(kind.key(), &Value::Array(items)).await
}

/// Assigns an id and creation timestamp, then writes the whole collection
/// back. The backend has no list-append primitive, so concurrent appends to
/// the same collection race last-write-wins.
pub async fn append_item(
    store: &dyn KeyValueStore,
    kind: Collection,
    fields: Map<String, Value>,
) -> anyhow::Result<Value> {
    let mut fields = fields;
    let now = now_ts();
    fields.insert("id".into(), Value::String(new_item_id()));
    fields.insert("createdAt".into(), json!(now));
    fields.insert("updatedAt".into(), json!(now));
    let item = Value::Object(fields);

    let mut items = read_items(store, kind.key()).await?;
    items.push(item.clone());
    store.set(kind.key(), &Value::Array(items)).await?;
    debug!(collection = kind.key(), id = item_id(&item), "item appended");
    Ok(item)
}

/// Merges the patch into the item with the given id and bumps its update
/// timestamp. The id itself is not patchable.
pub async fn update_item(
    store: &dyn KeyValueStore,
    kind: Collection,
    id: &str,
    patch: Map<String, Value>,
) -> Result<Value, RepoError> {
    let mut items = read_items(store, kind.key()).await?;
    let Some(slot) = items.iter_mut().find(|item| item_id(item) == Some(id)) else {
        return Err(RepoError::NotFound);
    };
    if let Value::Object(fields) = slot {
        for (field, value) in patch {
            if field != "id" {
                fields.insert(field, value);
            }
        }
        fields.insert("updatedAt".into(), json!(now_ts()));
    }
    let updated = slot.clone();
    store.set(kind.key(), &Value::Array(items)).await?;
    Ok(updated)
}

/// Deleting an id that is not present is a no-op success.
pub async fn delete_item(
    store: &dyn KeyValueStore,
    kind: Collection,
    id: &str,
) -> anyhow::Result<()> {
    let mut items = read_items(store, kind.key()).await?;
    items.retain(|item| item_id(item) != Some(id));
    store.set(kind.key(), &Value::Array(items)).await
}

/// Prepends the message so the dashboard reads newest-first. Failures are
/// logged, never surfaced: the visitor's contact form reports success even
/// when the store is down.
pub async fn send_contact_message(store: &dyn KeyValueStore, form: ContactForm) {
    let message = ContactMessage {
        id: format!("msg_{}-{:08x}", now_millis(), rand::random::<u32>()),
        name: form.name,
        email: form.email,
        subject: form.subject,
        message: form.message,
        read: false,
        created_at: now_ts(),
    };
    if let Err(e) = prepend_message(store, &message).await {
        error!(error = %e, "storing contact message failed");
    } else {
        info!(id = %message.id, "contact message stored");
    }
}

async fn prepend_message(
    store: &dyn KeyValueStore,
    message: &ContactMessage,
) -> anyhow::Result<()> {
    let mut items = read_items(store, keys::MESSAGES).await?;
    items.insert(0, serde_json::to_value(message)?);
    store.set(keys::MESSAGES, &Value::Array(items)).await
}

pub async fn list_messages(store: &dyn KeyValueStore) -> Vec<Value> {
    match read_items(store, keys::MESSAGES).await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "messages read failed, serving empty list");
            Vec::new()
        }
    }
}

/// Flips `read` to true on the matching message; unknown ids are a no-op.
pub async fn mark_message_read(store: &dyn KeyValueStore, id: &str) -> anyhow::Result<()> {
    let mut items = read_items(store, keys::MESSAGES).await?;
    for item in items.iter_mut() {
        if item_id(item) == Some(id) {
            if let Value::Object(fields) = item {
                fields.insert("read".into(), Value::Bool(true));
            }
        }
    }
    store.set(keys::MESSAGES, &Value::Array(items)).await
}

/// One-time seeding of an empty live backend: fills only the absent keys,
/// so re-running it never clobbers edited content.
pub async fn seed_defaults(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    for (key, value) in defaults::default_content()? {
        if store.get(key).await?.is_none() {
            store.set(key, &value).await?;
            info!(key, "seeded default content");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Store double whose every operation fails, standing in for an
    /// unreachable backend.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<Value>> {
            anyhow::bail!("backend unreachable")
        }

        async fn set(&self, _key: &str, _value: &Value) -> anyhow::Result<()> {
            anyhow::bail!("backend unreachable")
        }

        async fn delete(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("backend unreachable")
        }

        async fn ping(&self) -> bool {
            false
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn get_profile_seeds_default_once() {
        let store = MemoryStore::empty();

        let first = get_profile(&store).await;
        assert_eq!(first.name.as_deref(), Some("Subash Gautam"));
        assert_eq!(
            first
                .social_links
                .as_ref()
                .and_then(|links| links.get("github"))
                .map(String::as_str),
            Some("https://github.com/username")
        );

        // the seed is written through, so the second read returns the
        // stored value unchanged
        let stored = store.get(keys::PROFILE).await.unwrap();
        assert!(stored.is_some());
        let second = get_profile(&store).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_profile_merges_shallowly() {
        let store = MemoryStore::empty();
        get_profile(&store).await;

        let patch = fields(json!({
            "title": "Staff Engineer",
            "stats": {"projects": "99+"},
        }));
        let updated = update_profile(&store, patch).await.unwrap();

        assert_eq!(updated["title"], "Staff Engineer");
        assert_eq!(updated["name"], "Subash Gautam");
        // nested maps are replaced wholesale, not deep-merged
        assert_eq!(updated["stats"], json!({"projects": "99+"}));
    }

    #[tokio::test]
    async fn append_assigns_distinct_ids() {
        let store = MemoryStore::empty();
        let mut ids = Vec::new();
        for i in 0..5 {
            let item = append_item(
                &store,
                Collection::Projects,
                fields(json!({"title": format!("Project {i}")})),
            )
            .await
            .unwrap();
            assert!(item.get("createdAt").is_some());
            ids.push(item_id(&item).unwrap().to_string());
        }
        let items = list_collection(&store, Collection::Projects).await;
        assert_eq!(items.len(), 5);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn append_then_delete_leaves_collection_empty() {
        let store = MemoryStore::empty();
        let item = append_item(
            &store,
            Collection::Projects,
            fields(json!({"title": "X"})),
        )
        .await
        .unwrap();
        let id = item_id(&item).unwrap().to_string();

        delete_item(&store, Collection::Projects, &id).await.unwrap();
        assert!(list_collection(&store, Collection::Projects).await.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_are_benign_on_unknown_id() {
        let store = MemoryStore::empty();
        append_item(&store, Collection::Experiences, fields(json!({"title": "A"})))
            .await
            .unwrap();
        let before = list_collection(&store, Collection::Experiences).await;

        let err = update_item(
            &store,
            Collection::Experiences,
            "no-such-id",
            fields(json!({"title": "B"})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));

        delete_item(&store, Collection::Experiences, "no-such-id")
            .await
            .unwrap();

        let after = list_collection(&store, Collection::Experiences).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn update_item_merges_patch_and_keeps_id() {
        let store = MemoryStore::empty();
        let item = append_item(
            &store,
            Collection::Testimonials,
            fields(json!({"name": "Sarah", "position": "CEO"})),
        )
        .await
        .unwrap();
        let id = item_id(&item).unwrap().to_string();

        let updated = update_item(
            &store,
            Collection::Testimonials,
            &id,
            fields(json!({"position": "CTO", "id": "spoofed"})),
        )
        .await
        .unwrap();

        assert_eq!(updated["name"], "Sarah");
        assert_eq!(updated["position"], "CTO");
        assert_eq!(updated["id"], json!(id));
    }

    #[tokio::test]
    async fn messages_are_newest_first_and_unread() {
        let store = MemoryStore::empty();
        let form = |name: &str| ContactForm {
            name: name.into(),
            email: format!("{name}@example.com"),
            subject: "Hi".into(),
            message: "Hello".into(),
        };

        send_contact_message(&store, form("A")).await;
        send_contact_message(&store, form("B")).await;

        let messages = list_messages(&store).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["name"], "B");
        assert_eq!(messages[1]["name"], "A");
        assert_eq!(messages[0]["read"], json!(false));
        assert_eq!(messages[1]["read"], json!(false));
    }

    #[tokio::test]
    async fn mark_message_read_flips_only_the_target() {
        let store = MemoryStore::empty();
        let form = |name: &str| ContactForm {
            name: name.into(),
            email: format!("{name}@example.com"),
            subject: "Hi".into(),
            message: "Hello".into(),
        };
        send_contact_message(&store, form("A")).await;
        send_contact_message(&store, form("B")).await;

        let target = list_messages(&store).await[1]["id"]
            .as_str()
            .unwrap()
            .to_string();
        mark_message_read(&store, &target).await.unwrap();

        let messages = list_messages(&store).await;
        assert_eq!(messages[1]["read"], json!(true));
        assert_eq!(messages[0]["read"], json!(false));

        // unknown id is a no-op
        mark_message_read(&store, "no-such-id").await.unwrap();
        assert_eq!(list_messages(&store).await, messages);
    }

    #[tokio::test]
    async fn public_reads_degrade_when_backend_is_down() {
        let store = BrokenStore;

        // profile read never fails, it serves the default instead
        let profile = get_profile(&store).await;
        assert_eq!(profile.name.as_deref(), Some("Subash Gautam"));

        assert!(list_collection(&store, Collection::Projects).await.is_empty());
        assert!(get_item(&store, Collection::Projects, "any").await.is_none());
        assert!(list_messages(&store).await.is_empty());
    }

    #[tokio::test]
    async fn contact_send_swallows_backend_failure() {
        // the message is lost, but the call itself must not propagate;
        // surprising, yet it is the behavior the contact form relies on
        let form = ContactForm {
            name: "A".into(),
            email: "a@example.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        };
        send_contact_message(&BrokenStore, form).await;
    }

    #[tokio::test]
    async fn admin_writes_propagate_backend_failure() {
        let store = BrokenStore;

        assert!(update_profile(&store, fields(json!({"title": "X"})))
            .await
            .is_err());
        assert!(replace_collection(&store, Collection::Projects, vec![])
            .await
            .is_err());
        assert!(append_item(&store, Collection::Projects, fields(json!({"title": "X"})))
            .await
            .is_err());
        let err = update_item(&store, Collection::Projects, "id", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Store(_)));
        assert!(delete_item(&store, Collection::Projects, "id").await.is_err());
        assert!(mark_message_read(&store, "id").await.is_err());
        assert!(seed_defaults(&store).await.is_err());
    }

    #[tokio::test]
    async fn seed_defaults_fills_only_absent_keys() {
        let store = MemoryStore::empty();
        replace_collection(&store, Collection::Projects, vec![json!({"id": "mine"})])
            .await
            .unwrap();

        seed_defaults(&store).await.unwrap();
        seed_defaults(&store).await.unwrap();

        // edited key untouched, absent keys filled exactly once
        let projects = list_collection(&store, Collection::Projects).await;
        assert_eq!(projects, vec![json!({"id": "mine"})]);
        let education = list_collection(&store, Collection::Education).await;
        assert_eq!(education.len(), 2);
        assert!(store.get(keys::PROFILE).await.unwrap().is_some());
    }
}
