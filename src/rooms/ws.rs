use std::{sync::Arc, time::Duration};

use axum::{
    debug_handler,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{AppResult, config::Config, session::Identity};

use super::{Debouncer, Room, RoomCode, RoomError, RoomRepository, Watermark, api::Edit};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_ws(
    Path(code): Path<String>,
    State(rooms): State<RoomRepository>,
    State(config): State<Arc<Config>>,
    Identity(anon): Identity,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let code: RoomCode = code.parse()?;
    if rooms.read(&code).await?.is_none() {
        return Err(RoomError::NotFound(code).into());
    }

    let debounce = config.debounce;
    Ok(ws.on_upgrade(move |socket| edit_session(socket, rooms, code, anon, debounce)))
}

fn frame(room: &Room) -> Option<String> {
    serde_json::to_string(room)
        .inspect_err(|err| tracing::warn!(code = %room.code, error = %err, "could not encode room"))
        .ok()
}

/// Writes rooms to the socket. The snapshot and echoes race into the same
/// channel, so anything not newer than what was already shown is skipped.
async fn forward<S>(mut out_rx: mpsc::UnboundedReceiver<Room>, mut sink: S)
where
    S: Sink<Message> + Unpin,
{
    let mut shown = Watermark::default();
    while let Some(room) = out_rx.recv().await {
        if !shown.advance(&room) {
            continue;
        }
        let Some(text) = frame(&room) else {
            continue;
        };
        if sink.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }
}

/// Streams the room to the socket and feeds the socket's edits back through a
/// debouncer. Write failures are logged, never sent to the client.
async fn edit_session(socket: WebSocket, rooms: RoomRepository, code: RoomCode, anon: Uuid, debounce: Duration) {
    tracing::info!(%code, %anon, "editor connected");
    let (sender, mut receiver) = socket.split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Room>();

    let mut forward_task = tokio::spawn(forward(out_rx, sender));

    let echo_tx = out_tx.clone();
    let subscription = rooms.hub().subscribe(&code, move |room| {
        let _ = echo_tx.send(room);
    });

    // snapshot after subscribing, so nothing committed in between goes missing
    match rooms.read(&code).await {
        Ok(Some(room)) => {
            let _ = out_tx.send(room);
        }
        Ok(None) => {
            tracing::warn!(%code, "room vanished before the editor attached");
            forward_task.abort();
            return;
        }
        Err(err) => tracing::warn!(%code, error = %err, "could not load room snapshot"),
    }

    let writer = rooms.clone();
    let room_code = code.clone();
    let debouncer = Debouncer::new(debounce, move |text: String| {
        let rooms = writer.clone();
        let code = room_code.clone();
        async move {
            if let Err(err) = rooms.update(&code, &text).await {
                tracing::warn!(%code, error = %err, "dropped room update");
            }
        }
    });

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(raw))) => match serde_json::from_str::<Edit>(raw.as_str()) {
                    Ok(Edit { text }) => debouncer.push(text),
                    Err(err) => tracing::debug!(%code, error = %err, "ignoring malformed edit"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%code, error = %err, "editor socket failed");
                    break;
                }
            },
            _ = &mut forward_task => break,
        }
    }

    subscription.cancel();
    debouncer.finish().await;
    forward_task.abort();
    tracing::info!(%code, %anon, "editor disconnected");
}
