//! Game loop thread and the handle other threads use to talk to it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Receiver;
use tracing::{debug, info, trace};

use tetris_engine_core::{ControlSender, GameSnapshot, MatrixSnapshot, TetrisGame, TickReport};
use tetris_engine_types::{ControlEvent, PieceKind, Phase, NEXT_PREVIEW_LEN};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::slot::SnapshotSlot;

/// Cloneable access to a running game from any thread.
///
/// Reads go through the latest published snapshot; writes only ever enqueue
/// control events.
#[derive(Debug, Clone)]
pub struct GameHandle {
    slot: Arc<SnapshotSlot>,
    controls: ControlSender,
    running: Arc<AtomicBool>,
}

impl GameHandle {
    pub fn phase(&self) -> Phase {
        self.slot.latest().phase
    }

    /// Cell colors of the whole matrix, active piece as foreground
    pub fn matrix(&self) -> MatrixSnapshot {
        self.slot.latest().matrix_view()
    }

    /// Upcoming kinds, next one first
    pub fn next_queue(&self) -> [PieceKind; NEXT_PREVIEW_LEN] {
        self.slot.latest().next
    }

    /// Enqueue one event. Never blocks.
    pub fn control_queue_add(&self, event: ControlEvent) {
        trace!(event = event.as_str(), "control event queued");
        self.controls.push(event);
    }

    /// Enqueue a plan that is drained as a whole
    pub fn push_all(&self, events: &[ControlEvent]) {
        self.controls.push_all(events);
    }

    pub fn controls(&self) -> ControlSender {
        self.controls.clone()
    }

    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        self.slot.latest()
    }

    pub fn version(&self) -> u64 {
        self.slot.version()
    }

    /// Block until a snapshot newer than `seen` appears, the loop ends, or `timeout` passes
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> Option<(u64, Arc<GameSnapshot>)> {
        self.slot.wait_newer(seen, timeout)
    }

    /// Snapshot of every tick that locks a piece from now on, see [`SnapshotSlot::subscribe_locks`]
    pub fn lock_feed(&self) -> Receiver<Arc<GameSnapshot>> {
        self.slot.subscribe_locks()
    }

    /// Whether the game thread is still ticking
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Owner of the game thread. Dropping it stops and joins the thread.
#[derive(Debug)]
pub struct GameLoop {
    handle: GameHandle,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Arc<GameSnapshot>>>,
}

impl GameLoop {
    /// Start a new game on a dedicated thread with the system clock
    pub fn spawn(config: EngineConfig) -> Result<Self> {
        let game = TetrisGame::new(config.game.clone());
        Self::spawn_game(game, config.tick, Arc::new(SystemClock::new()))
    }

    /// Run an already built game with the given tick and clock
    pub fn spawn_game(game: TetrisGame, tick: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if tick.is_zero() {
            return Err(anyhow!("tick length must be positive"));
        }
        let slot = Arc::new(SnapshotSlot::new(game.snapshot()));
        let running = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(AtomicBool::new(false));
        let handle = GameHandle {
            slot: Arc::clone(&slot),
            controls: game.control_sender(),
            running: Arc::clone(&running),
        };

        let worker = Worker {
            game,
            tick,
            started_at: clock.now(),
            clock,
            slot,
            running,
            stop: Arc::clone(&stop),
        };
        let thread = thread::Builder::new()
            .name("tetris-game".to_string())
            .spawn(move || worker.run())
            .context("failed to spawn game thread")?;

        Ok(Self {
            handle,
            stop,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> GameHandle {
        self.handle.clone()
    }

    /// Block until the game ends on its own
    pub fn join(mut self) -> Result<Arc<GameSnapshot>> {
        self.join_thread()
    }

    /// Stop ticking and join the thread. Returns the final snapshot.
    pub fn stop(mut self) -> Result<Arc<GameSnapshot>> {
        self.stop.store(true, Ordering::Release);
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<Arc<GameSnapshot>> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| anyhow!("game thread panicked")),
            None => Ok(self.handle.snapshot()),
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct Worker {
    game: TetrisGame,
    tick: Duration,
    /// Clock reading when the loop was created, the first tick is one `tick` later
    started_at: Duration,
    clock: Arc<dyn Clock>,
    slot: Arc<SnapshotSlot>,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn run(mut self) -> Arc<GameSnapshot> {
        info!(
            seed = self.game.config().seed,
            level = self.game.level(),
            tick_ms = self.tick.as_millis() as u64,
            "game started"
        );

        let mut last = self.started_at;
        let mut next_tick = last + self.tick;

        while !self.stop.load(Ordering::Acquire) {
            let now = self.clock.now();
            if now < next_tick {
                self.clock.sleep(next_tick - now);
                continue;
            }

            let report = self.game.tick(now - last);
            last = now;
            next_tick += self.tick;
            if next_tick < now {
                next_tick = now + self.tick;
            }

            self.log_report(&report);
            if report.lock.is_some() {
                self.slot.publish_lock(self.game.snapshot());
            } else if report.changed() {
                self.slot.publish(self.game.snapshot());
            }
            if report.phase == Phase::GameOver {
                info!(
                    score = self.game.score(),
                    lines = self.game.lines(),
                    level = self.game.level(),
                    pieces = self.game.pieces_locked(),
                    "game over"
                );
                break;
            }
        }

        self.running.store(false, Ordering::Release);
        let final_snapshot = self.slot.latest();
        self.slot.close();
        debug!(ticks = self.game.ticks(), "game thread exiting");
        final_snapshot
    }

    fn log_report(&self, report: &TickReport) {
        if let Some(lock) = report.lock {
            debug!(
                piece_id = lock.piece_id,
                kind = lock.kind.as_str(),
                lines = lock.lines_cleared,
                gained = lock.score_gained,
                score = self.game.score(),
                "piece locked"
            );
        }
        if report.events_discarded > 0 {
            debug!(
                count = report.events_discarded,
                phase = report.phase.as_str(),
                "control events discarded, no piece in play"
            );
        }
        if report.phase != report.phase_before {
            trace!(
                from = report.phase_before.as_str(),
                to = report.phase.as_str(),
                "phase changed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetris_engine_core::{GameConfig, Matrix, NextQueue};

    use crate::clock::ManualClock;

    fn manual_loop(kinds: &[PieceKind]) -> (GameLoop, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let game = TetrisGame::with_parts(
            GameConfig::default(),
            Matrix::new(),
            NextQueue::with_prefix(3, kinds),
        );
        let game_loop = GameLoop::spawn_game(game, Duration::from_millis(16), clock.clone()).unwrap();
        (game_loop, clock)
    }

    #[test]
    fn first_tick_publishes_the_spawned_piece() {
        let (game_loop, clock) = manual_loop(&[PieceKind::L]);
        let handle = game_loop.handle();
        assert_eq!(handle.phase(), Phase::Spawn);

        clock.advance(Duration::from_millis(16));
        let (_, snap) = handle.wait_newer(0, Duration::from_secs(2)).unwrap();
        assert_eq!(snap.phase, Phase::Falling);
        assert_eq!(snap.active.map(|p| p.kind), Some(PieceKind::L));
        game_loop.stop().unwrap();
    }

    #[test]
    fn events_from_the_handle_reach_the_game() {
        let (game_loop, clock) = manual_loop(&[PieceKind::I, PieceKind::O]);
        let handle = game_loop.handle();
        clock.advance(Duration::from_millis(16));
        let (seen, _) = handle.wait_newer(0, Duration::from_secs(2)).unwrap();

        handle.push_all(&[ControlEvent::MoveLeft, ControlEvent::HardDown]);
        clock.advance(Duration::from_millis(16));
        let (_, snap) = handle.wait_newer(seen, Duration::from_secs(2)).unwrap();
        assert_eq!(snap.phase, Phase::Spawn);
        assert_eq!(snap.pieces_locked, 1);
        assert_eq!(snap.matrix.row_text(0), "..IIII....");

        let final_snapshot = game_loop.stop().unwrap();
        assert!(!handle.is_running());
        assert_eq!(final_snapshot.pieces_locked, 1);
    }

    #[test]
    fn zero_tick_is_rejected() {
        let game = TetrisGame::default();
        let err = GameLoop::spawn_game(game, Duration::ZERO, Arc::new(ManualClock::new()));
        assert!(err.is_err());
    }

    #[test]
    fn drop_stops_the_thread() {
        let (game_loop, _clock) = manual_loop(&[PieceKind::T]);
        let handle = game_loop.handle();
        drop(game_loop);
        assert!(!handle.is_running());
        // pushing into a finished game is harmless
        handle.control_queue_add(ControlEvent::HardDown);
    }
}
