use axum::{
    debug_handler,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};

use crate::{AppResult, include_res, res, session::Identity};

use super::{RoomCode, RoomError, RoomRepository};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room(
    Path(code): Path<String>,
    State(rooms): State<RoomRepository>,
    _: Identity,
) -> AppResult<Response> {
    let Ok(code) = code.parse::<RoomCode>() else {
        return Ok(res::sorry("room"));
    };
    if rooms.read(&code).await?.is_none() {
        return Ok(res::sorry("room"));
    }

    let body = include_res!(str, "/pages/room.html").replace("{code}", code.as_str());
    Ok(Html(body).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn download(
    Path(code): Path<String>,
    State(rooms): State<RoomRepository>,
    _: Identity,
) -> AppResult<Response> {
    let code: RoomCode = code.parse()?;
    let room = rooms.read(&code).await?.ok_or(RoomError::NotFound(code))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"bridge-{}.txt\"", room.code),
            ),
        ],
        room.text,
    )
        .into_response())
}
