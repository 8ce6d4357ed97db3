use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{AuthResponse, LoginRequest, MeResponse, SessionUser, SignupRequest};
use crate::auth::extractors::AdminSession;
use crate::auth::sessions::{self, SignupOutcome};
use crate::config::SessionConfig;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/signup", post(signup))
        .route("/auth/me", get(me))
}

/// HTTP-only, path-scoped, SameSite=Lax. Clearing re-sets the same cookie
/// with Max-Age zero.
fn session_cookie(config: &SessionConfig, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), (StatusCode, Json<AuthResponse>)> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(AuthResponse::fail("Username and password are required")),
        ));
    }

    // unknown user and wrong password answer identically
    if !sessions::verify_user(state.store.as_ref(), &payload.username, &payload.password).await {
        warn!(username = %payload.username, "login rejected");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse::fail("Invalid username or password")),
        ));
    }

    let token = sessions::create_session(state.store.as_ref(), &payload.username)
        .await
        .map_err(|e| {
            error!(error = %e, "creating session failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResponse::fail("An error occurred during login")),
            )
        })?;

    info!(username = %payload.username, "login successful");
    let cookie = session_cookie(
        &state.config.session,
        token,
        state.config.session.max_age_secs,
    );
    Ok((jar.add(cookie), Json(AuthResponse::ok("Login successful"))))
}

/// Works without a valid session too: the stored record is deleted when the
/// cookie names one, and the cookie is cleared either way.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<AuthResponse>) {
    if let Some(cookie) = jar.get(&state.config.session.cookie_name) {
        sessions::delete_session(state.store.as_ref(), cookie.value()).await;
    }
    let cleared = session_cookie(&state.config.session, String::new(), 0);
    (jar.add(cleared), Json(AuthResponse::ok("Logout successful")))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<AuthResponse>)> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(AuthResponse::fail("Username and password are required")),
        ));
    }

    match sessions::create_user(state.store.as_ref(), &payload.username, &payload.password).await {
        Ok(SignupOutcome::Created) => {
            info!(username = %payload.username, "user created");
            Ok(Json(AuthResponse::ok("User created successfully")))
        }
        Ok(SignupOutcome::Conflict) => {
            warn!(username = %payload.username, "signup for existing username");
            Err((
                StatusCode::CONFLICT,
                Json(AuthResponse::fail("Username already exists")),
            ))
        }
        Err(e) => {
            error!(error = %e, "creating user failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResponse::fail("An error occurred during signup")),
            ))
        }
    }
}

#[instrument]
pub async fn me(AdminSession(username): AdminSession) -> Json<MeResponse> {
    Json(MeResponse {
        user: SessionUser { username },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_sets_cookie_and_logout_clears_it() {
        let state = AppState::fake();
        let name = state.config.session.cookie_name.clone();

        let (jar, body) = login(
            State(state.clone()),
            CookieJar::new(),
            Json(LoginRequest {
                username: "admin".into(),
                password: "password".into(),
            }),
        )
        .await
        .expect("login succeeds");
        assert!(body.success);

        let cookie = jar.get(&name).expect("session cookie set");
        let token = cookie.value().to_string();
        assert!(!token.is_empty());
        assert!(sessions::get_session(state.store.as_ref(), &token)
            .await
            .is_some());

        let (jar, body) = logout(State(state.clone()), jar).await;
        assert!(body.success);
        let cleared = jar.get(&name).expect("cookie re-set for clearing");
        assert!(cleared.value().is_empty());
        assert!(sessions::get_session(state.store.as_ref(), &token)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn login_failures_share_one_message() {
        let state = AppState::fake();
        let attempt = |username: &str, password: &str| {
            let state = state.clone();
            let payload = LoginRequest {
                username: username.into(),
                password: password.into(),
            };
            async move { login(State(state), CookieJar::new(), Json(payload)).await }
        };

        let (status_a, Json(body_a)) = attempt("nobody", "x").await.unwrap_err();
        let (status_b, Json(body_b)) = attempt("admin", "wrong").await.unwrap_err();
        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_a, status_b);
        assert_eq!(body_a.message, body_b.message);
    }

    #[tokio::test]
    async fn signup_then_login_and_duplicate_conflicts() {
        let state = AppState::fake();

        let ok = signup(
            State(state.clone()),
            Json(SignupRequest {
                username: "alice".into(),
                password: "pw1".into(),
            }),
        )
        .await
        .expect("first signup succeeds");
        assert!(ok.success);

        let (status, _) = signup(
            State(state.clone()),
            Json(SignupRequest {
                username: "alice".into(),
                password: "pw2".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);

        assert!(login(
            State(state),
            CookieJar::new(),
            Json(LoginRequest {
                username: "alice".into(),
                password: "pw1".into(),
            }),
        )
        .await
        .is_ok());
    }
}
