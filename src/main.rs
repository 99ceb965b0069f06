mod app;
mod auth;
mod books;
mod config;
mod error;
mod state;
mod storage;

use crate::app::{build_app, serve};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bookshelf=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // A failed initial connection aborts startup; everything after is
    // per-request error handling.
    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let app = build_app(app_state)?;
    serve(app).await
}
