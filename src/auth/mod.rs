pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod password;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::router()
}
