pub mod appresult;
pub mod config;
pub mod db;
pub mod index;
pub mod logging;
pub mod res;
pub mod retention;
pub mod rooms;
pub mod session;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

pub use appresult::{AppError, AppResult};
use config::Config;
use rooms::{Hub, RoomRepository};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub rooms: RoomRepository,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: Config) -> Self {
        Self {
            rooms: RoomRepository::new(db_pool, Hub::new()),
            config: Arc::new(config),
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(app_state.config.session_idle));

    Router::new()
        .route("/", get(index::index))
        .route("/health", get(index::health))
        .route("/version", get(index::version))
        .merge(rooms::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
