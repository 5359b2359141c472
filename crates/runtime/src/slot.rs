//! Snapshot slot - latest published game snapshot plus change notification
//!
//! The game thread swaps in a new `Arc<GameSnapshot>` after each tick that
//! changed something. Readers clone the `Arc` under a short lock and never see a
//! half-updated game.
//!
//! Ticks that lock a piece are also pushed to every lock feed, so a follower
//! sees each lock exactly once even when it reads slower than the game ticks.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tetris_engine_core::GameSnapshot;

#[derive(Debug)]
struct SlotState {
    version: u64,
    snapshot: Arc<GameSnapshot>,
    closed: bool,
    lock_feeds: Vec<Sender<Arc<GameSnapshot>>>,
}

#[derive(Debug)]
pub struct SnapshotSlot {
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl SnapshotSlot {
    pub fn new(initial: GameSnapshot) -> Self {
        Self {
            state: Mutex::new(SlotState {
                version: 0,
                snapshot: Arc::new(initial),
                closed: false,
                lock_feeds: Vec::new(),
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the snapshot, returns the new version
    pub fn publish(&self, snapshot: GameSnapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let mut state = self.lock();
        state.version += 1;
        state.snapshot = snapshot;
        self.changed.notify_all();
        state.version
    }

    /// Publish the snapshot of a tick that locked a piece and hand it to every lock feed
    pub fn publish_lock(&self, snapshot: GameSnapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let mut state = self.lock();
        state.version += 1;
        state.snapshot = Arc::clone(&snapshot);
        state
            .lock_feeds
            .retain(|feed| feed.send(Arc::clone(&snapshot)).is_ok());
        self.changed.notify_all();
        state.version
    }

    /// One snapshot per lock published from now on.
    ///
    /// The receiver disconnects once the slot is closed and its backlog is read.
    pub fn subscribe_locks(&self) -> Receiver<Arc<GameSnapshot>> {
        let (tx, rx) = unbounded();
        let mut state = self.lock();
        if !state.closed {
            state.lock_feeds.push(tx);
        }
        rx
    }

    pub fn latest(&self) -> Arc<GameSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    pub fn latest_versioned(&self) -> (u64, Arc<GameSnapshot>) {
        let state = self.lock();
        (state.version, Arc::clone(&state.snapshot))
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Wait until a snapshot newer than `seen` is published.
    ///
    /// Returns `None` on timeout, or once the slot is closed with nothing newer.
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> Option<(u64, Arc<GameSnapshot>)> {
        let state = self.lock();
        let (state, _) = self
            .changed
            .wait_timeout_while(state, timeout, |s| s.version <= seen && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        if state.version > seen {
            Some((state.version, Arc::clone(&state.snapshot)))
        } else {
            None
        }
    }

    /// No more snapshots will come; wakes every waiter
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.lock_feeds.clear();
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
