use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use time::OffsetDateTime;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

use super::{Room, RoomCode};

const FEED_CAPACITY: usize = 64;

/// Highest `last_updated_at` let through so far. A room's timestamp only
/// ever moves forward, so anything at or below the mark is stale or a repeat.
#[derive(Debug, Default, Clone, Copy)]
pub struct Watermark(Option<OffsetDateTime>);

impl Watermark {
    /// Raises the mark to `room` and returns true if `room` is newer.
    pub fn advance(&mut self, room: &Room) -> bool {
        if self.0.is_some_and(|last| room.last_updated_at <= last) {
            return false;
        }
        self.0 = Some(room.last_updated_at);
        true
    }
}

struct Feed {
    id: u64,
    tx: broadcast::Sender<Room>,
    sent: Watermark,
    subscribers: usize,
}

#[derive(Default)]
struct Feeds {
    by_code: HashMap<RoomCode, Feed>,
    next_id: u64,
}

/// Change feed for rooms. Every committed update is published here and fanned
/// out to the subscribers of that room, the writer included.
#[derive(Clone, Default)]
pub struct Hub {
    feeds: Arc<Mutex<Feeds>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards a committed room to its subscribers. Publications that are not
    /// newer than the last one forwarded are dropped, so racing writers can't
    /// reorder what subscribers see.
    pub fn publish(&self, room: &Room) {
        let mut feeds = self.feeds();
        let Some(feed) = feeds.by_code.get_mut(&room.code) else {
            return;
        };

        if !feed.sent.advance(room) {
            tracing::debug!(code = %room.code, "skipping out-of-order publication");
            return;
        }
        let _ = feed.tx.send(room.clone());
    }

    /// Calls `on_update` with the full room after every committed change until
    /// the returned [`Subscription`] is cancelled or dropped.
    pub fn subscribe<F>(&self, code: &RoomCode, mut on_update: F) -> Subscription
    where
        F: FnMut(Room) + Send + 'static,
    {
        let (feed_id, mut rx) = {
            let mut feeds = self.feeds();
            feeds.next_id += 1;
            let id = feeds.next_id;
            let feed = feeds.by_code.entry(code.clone()).or_insert_with(|| Feed {
                id,
                tx: broadcast::channel(FEED_CAPACITY).0,
                sent: Watermark::default(),
                subscribers: 0,
            });
            feed.subscribers += 1;
            (feed.id, feed.tx.subscribe())
        };

        let task_code = code.clone();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(room) => on_update(room),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(code = %task_code, skipped, "subscriber lagged behind room updates");
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!(code = %task_code, "room no longer exists");
                        break;
                    }
                }
            }
        });

        Subscription {
            task,
            hub: self.clone(),
            code: code.clone(),
            feed_id,
        }
    }

    /// Ends every subscription to `code`. Used once the room is gone.
    pub fn close(&self, code: &RoomCode) {
        self.feeds().by_code.remove(code);
    }

    fn release(&self, code: &RoomCode, feed_id: u64) {
        let mut feeds = self.feeds();
        // a feed closed by the sweep may since have been replaced by a new one
        let Some(feed) = feeds.by_code.get_mut(code).filter(|feed| feed.id == feed_id) else {
            return;
        };
        feed.subscribers -= 1;
        if feed.subscribers == 0 {
            feeds.by_code.remove(code);
        }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, code: &RoomCode) -> usize {
        self.feeds().by_code.get(code).map_or(0, |feed| feed.subscribers)
    }

    #[cfg(test)]
    pub(crate) fn feed_count(&self) -> usize {
        self.feeds().by_code.len()
    }

    fn feeds(&self) -> MutexGuard<'_, Feeds> {
        self.feeds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[must_use = "dropping a subscription cancels it"]
pub struct Subscription {
    task: JoinHandle<()>,
    hub: Hub,
    code: RoomCode,
    feed_id: u64,
}

impl Subscription {
    pub fn cancel(self) {
        drop(self);
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
        self.hub.release(&self.code, self.feed_id);
    }
}
