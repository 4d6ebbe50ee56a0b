use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::{AppResult, session::Identity};

use super::{Room, RoomCode, RoomError, RoomRepository};

#[derive(Debug, Deserialize)]
pub(crate) struct Edit {
    pub(crate) text: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn read_room(
    Path(code): Path<String>,
    State(rooms): State<RoomRepository>,
    _: Identity,
) -> AppResult<Json<Room>> {
    let code: RoomCode = code.parse()?;
    let room = rooms.read(&code).await?.ok_or(RoomError::NotFound(code))?;

    Ok(Json(room))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_room(
    Path(code): Path<String>,
    State(rooms): State<RoomRepository>,
    Identity(anon): Identity,
    Json(Edit { text }): Json<Edit>,
) -> AppResult<Json<Room>> {
    let code: RoomCode = code.parse()?;
    let room = rooms.update(&code, &text).await?;
    tracing::debug!(%code, %anon, len = text.len(), "room text replaced");

    Ok(Json(room))
}
