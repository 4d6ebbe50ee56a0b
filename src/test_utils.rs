use time::OffsetDateTime;

use crate::{
    db,
    rooms::{Hub, RoomCode, RoomRepository},
};

pub async fn rooms() -> RoomRepository {
    let db_pool = db::connect("sqlite::memory:", 1).await.unwrap();
    RoomRepository::new(db_pool, Hub::new())
}

/// Backdates a room, bypassing the repository's server-assigned timestamps.
pub async fn set_last_updated(rooms: &RoomRepository, code: &RoomCode, at: OffsetDateTime) {
    sqlx::query("UPDATE rooms SET last_updated_at=? WHERE code=?")
        .bind((at.unix_timestamp_nanos() / 1_000) as i64)
        .bind(code.as_str())
        .execute(rooms.db_pool())
        .await
        .unwrap();
}
