use sqlx::SqlitePool;
use time::OffsetDateTime;

use super::{
    Hub, Room, RoomCode, RoomError, code,
    model::{RoomRow, to_micros},
};

pub const MAX_CREATE_ATTEMPTS: usize = 10;

/// One row per room, keyed by code. Every committed update is published to
/// the [`Hub`].
#[derive(Clone)]
pub struct RoomRepository {
    db_pool: SqlitePool,
    hub: Hub,
}

impl RoomRepository {
    pub fn new(db_pool: SqlitePool, hub: Hub) -> Self {
        Self { db_pool, hub }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    #[cfg(test)]
    pub(crate) fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub async fn create(&self) -> Result<RoomCode, RoomError> {
        self.create_with(code::generate).await
    }

    /// Inserts an empty room under the first candidate from `next_code` that
    /// isn't taken. The insert itself is the uniqueness check.
    pub async fn create_with<G>(&self, mut next_code: G) -> Result<RoomCode, RoomError>
    where
        G: FnMut() -> RoomCode,
    {
        let now = to_micros(OffsetDateTime::now_utc());

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let code = next_code();
            let inserted = sqlx::query(
                "INSERT INTO rooms (code,text,created_at,last_updated_at) VALUES (?,'',?,?) \
                 ON CONFLICT(code) DO NOTHING",
            )
            .bind(code.as_str())
            .bind(now)
            .bind(now)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

            if inserted == 1 {
                tracing::info!(%code, attempt, "created room");
                return Ok(code);
            }
            tracing::debug!(%code, attempt, "room code taken");
        }

        Err(RoomError::Exhausted { attempts: MAX_CREATE_ATTEMPTS })
    }

    /// `Ok(None)` when nothing is stored under `code`.
    pub async fn read(&self, code: &RoomCode) -> Result<Option<Room>, RoomError> {
        let row: Option<RoomRow> =
            sqlx::query_as("SELECT code,text,created_at,last_updated_at FROM rooms WHERE code=?")
                .bind(code.as_str())
                .fetch_optional(&self.db_pool)
                .await?;

        row.map(Room::from_row).transpose()
    }

    /// Overwrites the text, last write wins. `last_updated_at` always moves
    /// forward, even when two writes land in the same clock tick.
    pub async fn update(&self, code: &RoomCode, text: &str) -> Result<Room, RoomError> {
        let now = to_micros(OffsetDateTime::now_utc());
        let row: Option<RoomRow> = sqlx::query_as(
            "UPDATE rooms SET text=?, last_updated_at=MAX(?, last_updated_at + 1) WHERE code=? \
             RETURNING code,text,created_at,last_updated_at",
        )
        .bind(text)
        .bind(now)
        .bind(code.as_str())
        .fetch_optional(&self.db_pool)
        .await?;

        let room = Room::from_row(row.ok_or_else(|| RoomError::NotFound(code.clone()))?)?;
        self.hub.publish(&room);
        Ok(room)
    }

    /// Deletes every room last updated strictly before `cutoff` in a single
    /// statement and closes their feeds.
    pub async fn delete_stale(&self, cutoff: OffsetDateTime) -> Result<Vec<RoomCode>, RoomError> {
        let deleted: Vec<(String,)> =
            sqlx::query_as("DELETE FROM rooms WHERE last_updated_at < ? RETURNING code")
                .bind(to_micros(cutoff))
                .fetch_all(&self.db_pool)
                .await?;

        let mut codes: Vec<RoomCode> = deleted
            .into_iter()
            .map(|(code,)| RoomCode::from_stored(code))
            .collect();
        codes.sort();

        for code in &codes {
            self.hub.close(code);
        }
        Ok(codes)
    }
}
