use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{instrument, warn};

use crate::auth::extractors::AdminSession;
use crate::content::dto::ContactForm;
use crate::content::repo::{self, RepoError};
use crate::content::types::{Collection, Profile};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/contact", post(send_contact))
        .route("/messages", get(list_messages))
        .route("/messages/:id/read", post(mark_message_read))
        .route(
            "/:kind",
            get(list_collection)
                .put(replace_collection)
                .post(append_item),
        )
        .route(
            "/:kind/:id",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn collection(kind: &str) -> Result<Collection, (StatusCode, String)> {
    Collection::from_path(kind).ok_or((
        StatusCode::NOT_FOUND,
        format!("unknown collection: {kind}"),
    ))
}

fn object_body(value: Value) -> Result<Map<String, Value>, (StatusCode, String)> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err((StatusCode::BAD_REQUEST, "expected a JSON object".into())),
    }
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// --- public handlers ---

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Json<Profile> {
    Json(repo::get_profile(state.store.as_ref()).await)
}

#[instrument(skip(state))]
pub async fn list_collection(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    let kind = collection(&kind)?;
    Ok(Json(repo::list_collection(state.store.as_ref(), kind).await))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let kind = collection(&kind)?;
    repo::get_item(state.store.as_ref(), kind, &id)
        .await
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "item not found".into()))
}

#[instrument(skip(state, form))]
pub async fn send_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if form.name.trim().is_empty() || form.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name and message are required".into()));
    }
    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid contact email");
        return Err((StatusCode::BAD_REQUEST, "invalid email".into()));
    }
    // always succeeds from the visitor's point of view
    repo::send_contact_message(state.store.as_ref(), form).await;
    Ok(Json(json!({"success": true})))
}

// --- admin handlers ---

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let patch = object_body(patch)?;
    repo::update_profile(state.store.as_ref(), patch)
        .await
        .map(Json)
        .map_err(internal)
}

#[instrument(skip(state, items))]
pub async fn replace_collection(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(kind): Path<String>,
    Json(items): Json<Vec<Value>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let kind = collection(&kind)?;
    repo::replace_collection(state.store.as_ref(), kind, items)
        .await
        .map_err(internal)?;
    Ok(Json(json!({"success": true})))
}

#[instrument(skip(state, item))]
pub async fn append_item(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(kind): Path<String>,
    Json(item): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, String)> {
    let kind = collection(&kind)?;
    let fields = object_body(item)?;
    let item = repo::append_item(state.store.as_ref(), kind, fields)
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, patch))]
pub async fn update_item(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path((kind, id)): Path<(String, String)>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let kind = collection(&kind)?;
    let patch = object_body(patch)?;
    match repo::update_item(state.store.as_ref(), kind, &id, patch).await {
        Ok(item) => Ok(Json(item)),
        Err(RepoError::NotFound) => Err((StatusCode::NOT_FOUND, "item not found".into())),
        Err(RepoError::Store(e)) => Err(internal(e)),
    }
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let kind = collection(&kind)?;
    repo::delete_item(state.store.as_ref(), kind, &id)
        .await
        .map_err(internal)?;
    Ok(Json(json!({"success": true})))
}

#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Json<Vec<Value>> {
    Json(repo::list_messages(state.store.as_ref()).await)
}

#[instrument(skip(state))]
pub async fn mark_message_read(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    repo::mark_message_read(state.store.as_ref(), &id)
        .await
        .map_err(internal)?;
    Ok(Json(json!({"success": true})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("visitor@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn unknown_collection_is_not_found() {
        assert!(collection("projects").is_ok());
        assert!(collection("messages").is_err());
        assert!(collection("sessions").is_err());
    }
}
