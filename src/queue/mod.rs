//! Per-key FIFO serialization
//!
//! Operations sharing a key run one at a time in the order they claim a
//! ticket; operations on different keys never wait on each other. Lanes are
//! created on first use and live as long as the queue.

use dashmap::DashMap;
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

type Acquire = Pin<Box<dyn Future<Output = OwnedMutexGuard<()>> + Send>>;

enum Place {
    /// No key: runs without waiting
    Free,
    /// The lane was idle and is now held
    Held(OwnedMutexGuard<()>),
    /// Waiting behind earlier tickets
    Queued(Acquire),
}

/// A claimed place in a lane.
///
/// The place is kept from the moment the ticket is issued, so a ticket can be
/// moved into a spawned task without losing its position. Dropping an unused
/// ticket gives the place up.
pub struct Ticket {
    key: Option<Arc<str>>,
    place: Place,
}

impl Ticket {
    /// A ticket that belongs to no lane.
    pub fn free() -> Self {
        Self {
            key: None,
            place: Place::Free,
        }
    }

    /// Wait for this ticket's turn, then run `op` while holding the lane.
    pub async fn run<F, Fut, T>(self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _turn = match self.place {
            Place::Free => None,
            Place::Held(guard) => Some(guard),
            Place::Queued(acquire) => Some(acquire.await),
        };
        if let Some(key) = &self.key {
            trace!(key = %key, "lane acquired");
        }
        op().await
    }
}

impl std::fmt::Debug for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let place = match self.place {
            Place::Free => "free",
            Place::Held(_) => "held",
            Place::Queued(_) => "queued",
        };
        f.debug_struct("Ticket")
            .field("key", &self.key)
            .field("place", &place)
            .finish()
    }
}

/// One FIFO execution lane.
///
/// Cloning a lane yields a handle to the same lane.
#[derive(Debug, Clone)]
pub struct Lane {
    key: Arc<str>,
    // tokio's mutex grants the lock to waiters in FIFO order
    gate: Arc<Mutex<()>>,
}

impl Lane {
    fn new(key: &str) -> Self {
        Self {
            key: Arc::from(key),
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Claim the next place in this lane without waiting for it.
    ///
    /// Resolves on its first poll: the ticket either holds the idle lane or
    /// is registered behind every ticket issued before it.
    pub async fn ticket(&self) -> Ticket {
        let mut acquire: Acquire = Box::pin(self.gate.clone().lock_owned());
        let held = poll_fn(|cx| {
            Poll::Ready(match acquire.as_mut().poll(cx) {
                Poll::Ready(guard) => Some(guard),
                Poll::Pending => None,
            })
        })
        .await;
        let place = match held {
            Some(guard) => Place::Held(guard),
            None => Place::Queued(acquire),
        };
        Ticket {
            key: Some(self.key.clone()),
            place,
        }
    }

    /// Run `op` after every operation enqueued before it on this lane.
    ///
    /// Resolves with whatever `op` resolves with, success or error.
    pub async fn enqueue<F, Fut, T>(&self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.ticket().await.run(op).await
    }

    /// True while an operation holds the lane.
    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }
}

/// Map from key to lane, shared by every source of an adapter.
#[derive(Debug, Default)]
pub struct KeyQueue {
    lanes: DashMap<String, Lane>,
}

impl KeyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lane for `key`, created if this is its first use.
    pub fn lane(&self, key: &str) -> Lane {
        if let Some(lane) = self.lanes.get(key) {
            return lane.clone();
        }
        self.lanes
            .entry(key.to_string())
            .or_insert_with(|| Lane::new(key))
            .clone()
    }

    /// Shorthand for `lane(key).enqueue(op)`.
    pub async fn enqueue<F, Fut, T>(&self, key: &str, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.lane(key).enqueue(op).await
    }

    /// Claim a place in the lane for `key`. Without a key the ticket is free.
    pub async fn ticket(&self, key: Option<&str>) -> Ticket {
        match key {
            Some(key) => self.lane(key).ticket().await,
            None => Ticket::free(),
        }
    }

    /// Run `op` through the lane for `key`, or directly when there is no key.
    pub async fn run<F, Fut, T>(&self, key: Option<&str>, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.ticket(key).await.run(op).await
    }

    /// Number of lanes created so far.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn has_lane(&self, key: &str) -> bool {
        self.lanes.contains_key(key)
    }
}
