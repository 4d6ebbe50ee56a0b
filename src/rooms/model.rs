use serde::Serialize;
use time::OffsetDateTime;

use super::{RoomCode, RoomError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub code: RoomCode,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated_at: OffsetDateTime,
}

/// `code, text, created_at, last_updated_at` as stored.
pub(super) type RoomRow = (String, String, i64, i64);

impl Room {
    pub(super) fn from_row((code, text, created_at, last_updated_at): RoomRow) -> Result<Self, RoomError> {
        Ok(Self {
            code: RoomCode::from_stored(code),
            text,
            created_at: from_micros(created_at)?,
            last_updated_at: from_micros(last_updated_at)?,
        })
    }
}

pub(super) fn to_micros(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000) as i64
}

pub(super) fn from_micros(micros: i64) -> Result<OffsetDateTime, RoomError> {
    Ok(OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)?)
}
