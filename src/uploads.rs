use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use crate::auth::extractors::AdminSession;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blob-status", get(blob_status))
        .route("/files", get(list_files))
        .route("/upload", post(upload))
        .route("/delete-file", post(delete_file))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[derive(Debug, Deserialize)]
pub struct DeleteFileRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    #[serde(default)]
    pub prefix: String,
}

fn object_key(folder: &str, filename: &str) -> String {
    // millisecond prefix keeps re-uploads of the same filename distinct
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let safe: String = filename
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{folder}/{millis}-{safe}")
}

#[instrument(skip(state))]
pub async fn blob_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({"configured": state.objects.is_some()}))
}

/// Multipart form: a `file` part plus an optional `folder` part. Answers
/// with the public URL; the caller persists it into the profile or an item.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, String)> {
    let Some(objects) = state.objects.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "object storage is not configured".into(),
        ));
    };

    let mut folder = "uploads".to_string();
    let mut file: Option<(String, String, bytes::Bytes)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("folder") => {
                if let Ok(value) = field.text().await {
                    if !value.is_empty() {
                        folder = value;
                    }
                }
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                file = Some((filename, content_type, data));
            }
            _ => {}
        }
    }

    let Some((filename, content_type, data)) = file else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };

    let key = object_key(&folder, &filename);
    let url = objects
        .store(&key, data, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, key, "upload failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    info!(key, "file uploaded");
    Ok(Json(json!({"url": url})))
}

/// Listing used by the dashboard's media picker.
#[instrument(skip(state))]
pub async fn list_files(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let Some(objects) = state.objects.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "object storage is not configured".into(),
        ));
    };

    let files = objects.list(&query.prefix).await.map_err(|e| {
        error!(error = %e, prefix = %query.prefix, "listing files failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(json!({"files": files})))
}

#[instrument(skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(payload): Json<DeleteFileRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let Some(objects) = state.objects.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "object storage is not configured".into(),
        ));
    };

    objects.delete(&payload.url).await.map_err(|e| {
        error!(error = %e, url = %payload.url, "delete failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(json!({"success": true})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_prefixed_and_sanitized() {
        let key = object_key("images", "my photo (1).jpg");
        assert!(key.starts_with("images/"));
        assert!(key.ends_with("-my_photo__1_.jpg"));
    }
}
