use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::auth::sessions;
use crate::state::AppState;

/// Validates the session cookie against the store and yields the principal's
/// username. Admin handlers take this as a parameter to require a session.
#[derive(Debug)]
pub struct AdminSession(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "cookie parsing failed".to_string(),
                )
            })?;

        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "missing session cookie".to_string(),
            ))?;

        let session = sessions::get_session(state.store.as_ref(), &token)
            .await
            .ok_or_else(|| {
                warn!("request with unknown session token");
                (
                    StatusCode::UNAUTHORIZED,
                    "invalid or expired session".to_string(),
                )
            })?;

        Ok(AdminSession(session.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, Request};

    fn parts_with_cookie(cookie: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/profile");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[tokio::test]
    async fn rejects_missing_cookie() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(None);
        let err = AdminSession::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_unknown_token() {
        let state = AppState::fake();
        let name = state.config.session.cookie_name.clone();
        let mut parts = parts_with_cookie(Some(format!("{name}=bogus")));
        let err = AdminSession::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_live_session_until_logout() {
        let state = AppState::fake();
        let token = sessions::create_session(state.store.as_ref(), "admin")
            .await
            .expect("create session");
        let name = state.config.session.cookie_name.clone();

        let mut parts = parts_with_cookie(Some(format!("{name}={token}")));
        let AdminSession(username) = AdminSession::from_request_parts(&mut parts, &state)
            .await
            .expect("session accepted");
        assert_eq!(username, "admin");

        sessions::delete_session(state.store.as_ref(), &token).await;
        let mut parts = parts_with_cookie(Some(format!("{name}={token}")));
        let err = AdminSession::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }
}
