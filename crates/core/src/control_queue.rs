//! ControlQueue - multi-producer FIFO of control events
//!
//! Producers (keyboard, bots, tests) hold a cloneable [`ControlSender`]; the game
//! loop owns the [`ControlQueue`] and drains it once per tick. The channel is
//! unbounded, so pushing never blocks.
//!
//! Events travel in batches. A batch pushed with [`ControlSender::push_all`] is
//! one channel message, so the consumer sees either none or all of it.

use arrayvec::ArrayVec;
use crossbeam_channel::{unbounded, Receiver, Sender};

use tetris_engine_types::ControlEvent;

/// Largest plan delivered as a single batch
pub const MAX_BATCH: usize = 16;

pub type Batch = ArrayVec<ControlEvent, MAX_BATCH>;

/// Producer side. Cheap to clone, usable from any thread.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: Sender<Batch>,
}

impl ControlSender {
    /// Append one event. Silently ignored once the queue is gone.
    pub fn push(&self, event: ControlEvent) {
        let mut batch = Batch::new();
        batch.push(event);
        let _ = self.tx.send(batch);
    }

    /// Append a plan so it is drained in one piece.
    ///
    /// Plans longer than [`MAX_BATCH`] are split into consecutive batches.
    pub fn push_all(&self, events: &[ControlEvent]) {
        for chunk in events.chunks(MAX_BATCH) {
            let batch: Batch = chunk.iter().copied().collect();
            let _ = self.tx.send(batch);
        }
    }
}

/// Consumer side, owned by the game
#[derive(Debug)]
pub struct ControlQueue {
    tx: Sender<Batch>,
    rx: Receiver<Batch>,
}

impl ControlQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> ControlSender {
        ControlSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: ControlEvent) {
        self.sender().push(event);
    }

    /// Everything queued at the time of the call, in arrival order. Never blocks.
    ///
    /// Batches that arrive while the iterator is consumed wait for the next drain.
    pub fn drain(&self) -> impl Iterator<Item = ControlEvent> + '_ {
        let queued = self.rx.len();
        self.rx.try_iter().take(queued).flatten()
    }

    /// Drop every queued event, returns how many were dropped
    pub fn clear(&self) -> usize {
        self.drain().count()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use ControlEvent::*;

    #[test]
    fn drain_preserves_order() {
        let queue = ControlQueue::new();
        queue.push(MoveLeft);
        queue.push(RotateRight);
        queue.sender().push_all(&[MoveRight, HardDown]);
        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events, vec![MoveLeft, RotateRight, MoveRight, HardDown]);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_drain_yields_nothing() {
        let queue = ControlQueue::new();
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn long_plans_are_split_but_ordered() {
        let queue = ControlQueue::new();
        let plan: Vec<_> = (0..40)
            .map(|i| if i % 2 == 0 { MoveLeft } else { MoveRight })
            .collect();
        queue.sender().push_all(&plan);
        assert_eq!(queue.drain().collect::<Vec<_>>(), plan);
    }

    #[test]
    fn push_after_queue_dropped_is_ignored() {
        let queue = ControlQueue::new();
        let sender = queue.sender();
        drop(queue);
        sender.push(HardDown);
        sender.push_all(&[MoveLeft, MoveLeft]);
    }

    #[test]
    fn concurrent_producers_keep_their_own_order() {
        let queue = ControlQueue::new();
        let handles: Vec<_> = [MoveLeft, MoveRight, SoftDown]
            .into_iter()
            .map(|event| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for _ in 0..100 {
                        sender.push_all(&[event, RotateLeft]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 600);
        // plans are never interleaved: every producer event is followed by its rotate
        for pair in events.chunks(2) {
            assert_ne!(pair[0], RotateLeft);
            assert_eq!(pair[1], RotateLeft);
        }
    }
}
