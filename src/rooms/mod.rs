mod api;
mod code;
mod editor;
mod error;
mod hub;
mod model;
mod new;
mod page;
mod repo;
mod ws;

use axum::{Router, routing::get, routing::post};

use crate::AppState;

pub use code::{ALPHABET, CODE_LEN, RoomCode, generate};
pub use editor::Debouncer;
pub use error::RoomError;
pub use hub::{Hub, Subscription, Watermark};
pub use model::Room;
pub use repo::{MAX_CREATE_ATTEMPTS, RoomRepository};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", post(new::new_room))
        .route("/api/rooms/{code}", get(api::read_room).put(api::update_room))
        .route("/api/rooms/{code}/ws", get(ws::room_ws))
        .route("/{code}", get(page::room))
        .route("/{code}/download", get(page::download))
}
