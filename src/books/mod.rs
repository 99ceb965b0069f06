use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod media;
pub mod repo;
mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
