use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, instrument};

use crate::auth::extractors::AdminSession;
use crate::content::repo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/store-status", get(store_status))
        .route("/store-init", post(store_init))
}

/// `connected` distinguishes the fallback from a live-but-unreachable
/// backend: false on the fallback, and false when the live store fails the
/// liveness probe.
#[instrument(skip(state))]
pub async fn store_status(State(state): State<AppState>) -> Json<Value> {
    let connected = !state.fallback && state.store.ping().await;
    Json(json!({"connected": connected}))
}

/// One-time seeding of default content into an empty live backend. Safe to
/// repeat; only absent keys are written.
#[instrument(skip(state))]
pub async fn store_init(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Result<Json<Value>, (StatusCode, String)> {
    repo::seed_defaults(state.store.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "store initialization failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(json!({"success": true})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fallback_reports_disconnected() {
        let state = AppState::fake();
        let Json(body) = store_status(State(state)).await;
        assert_eq!(body, json!({"connected": false}));
    }
}
