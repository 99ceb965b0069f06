use crate::state::AppState;
use axum::Router;

mod claims;
mod cookie;
mod dto;
pub mod handlers;
pub mod jwt;
mod password;
pub mod repo;
mod repo_types;
pub(crate) mod extractors;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::session_routes())
        .merge(handlers::user_routes())
}
