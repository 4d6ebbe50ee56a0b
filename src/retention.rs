//! Deletes rooms nobody has touched for longer than the retention window.

use std::time::Duration;

use time::OffsetDateTime;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::rooms::{RoomCode, RoomError, RoomRepository};

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(5 * 60 * 60);
pub const DEFAULT_SWEEP_EVERY: Duration = Duration::from_secs(5 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub cutoff: OffsetDateTime,
    pub deleted: Vec<RoomCode>,
}

pub async fn sweep(rooms: &RoomRepository, retention: Duration) -> Result<SweepReport, RoomError> {
    sweep_at(rooms, OffsetDateTime::now_utc(), retention).await
}

/// Rooms updated at or after `now - retention` are kept.
pub async fn sweep_at(
    rooms: &RoomRepository,
    now: OffsetDateTime,
    retention: Duration,
) -> Result<SweepReport, RoomError> {
    let cutoff = now - retention;
    tracing::info!(%cutoff, "sweeping rooms idle since before cutoff");

    let deleted = rooms.delete_stale(cutoff).await?;
    if deleted.is_empty() {
        tracing::info!("no stale rooms to delete");
    } else {
        tracing::info!(deleted = deleted.len(), "deleted stale rooms");
    }

    Ok(SweepReport { cutoff, deleted })
}

/// Sweeps once right away, then every `every`.
pub fn spawn(rooms: RoomRepository, every: Duration, retention: Duration) -> JoinHandle<()> {
    tracing::info!(every_secs = every.as_secs(), retention_secs = retention.as_secs(), "starting retention sweeper");

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep(&rooms, retention).await {
                tracing::error!(error = %err, "retention sweep failed");
            }
        }
    })
}
