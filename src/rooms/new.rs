use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{AppResult, session::Identity};

use super::{RoomCode, RoomRepository};

#[derive(Debug, Serialize)]
pub(crate) struct NewRoom {
    code: RoomCode,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room(
    State(rooms): State<RoomRepository>,
    Identity(anon): Identity,
) -> AppResult<(StatusCode, Json<NewRoom>)> {
    let code = rooms.create().await?;
    tracing::info!(%code, %anon, "room opened");

    Ok((StatusCode::CREATED, Json(NewRoom { code })))
}
