//! Headless mode: one JSON line per locked piece on any writer.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{GameSnapshot, LockEvent};
use crate::runtime::GameHandle;
use crate::types::{Phase, PieceKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub piece_id: u32,
    pub pieces_locked: u32,
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub last_lock: Option<LockEvent>,
    pub next: Vec<PieceKind>,
    /// Visible rows, top row first
    pub rows: Vec<String>,
}

impl Observation {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            piece_id: snapshot.piece_id,
            pieces_locked: snapshot.pieces_locked,
            phase: snapshot.phase,
            score: snapshot.score,
            level: snapshot.level,
            lines: snapshot.lines,
            last_lock: snapshot.last_lock,
            next: snapshot.next.to_vec(),
            rows: snapshot.visible_rows(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub observations: u32,
    pub pieces_locked: u32,
    pub score: u32,
    pub lines: u32,
    pub game_over: bool,
}

/// Follow `game` and write one [`Observation`] for every piece that locks from now on.
///
/// Returns after `max_pieces` locks, or once the game thread has stopped (game
/// over included) and every lock has been written.
pub fn run_headless<W: Write>(
    game: &GameHandle,
    max_pieces: Option<u32>,
    poll: Duration,
    out: &mut W,
) -> Result<HeadlessSummary> {
    follow_locks(&game.lock_feed(), game, max_pieces, poll, out)
}

/// [`run_headless`] over a lock feed taken earlier.
///
/// Every buffered lock gets its own line, so none are merged even when this
/// thread falls behind the game.
pub fn follow_locks<W: Write>(
    locks: &Receiver<Arc<GameSnapshot>>,
    game: &GameHandle,
    max_pieces: Option<u32>,
    poll: Duration,
    out: &mut W,
) -> Result<HeadlessSummary> {
    let mut summary = HeadlessSummary::default();

    loop {
        let snapshot = match locks.recv_timeout(poll) {
            Ok(snapshot) => snapshot,
            Err(RecvTimeoutError::Timeout) if game.is_running() => continue,
            Err(_) => {
                // game over can follow the last lock, a blocked spawn is not a lock
                record(&mut summary, &game.snapshot());
                break;
            }
        };

        write_observation(out, &snapshot)?;
        summary.observations += 1;
        record(&mut summary, &snapshot);

        if max_pieces.is_some_and(|max| snapshot.pieces_locked >= max) {
            break;
        }
    }

    out.flush().context("failed to flush observations")?;
    info!(
        observations = summary.observations,
        pieces = summary.pieces_locked,
        score = summary.score,
        lines = summary.lines,
        game_over = summary.game_over,
        "headless run finished"
    );
    Ok(summary)
}

fn write_observation<W: Write>(out: &mut W, snapshot: &GameSnapshot) -> Result<()> {
    let line = serde_json::to_string(&Observation::from_snapshot(snapshot))
        .context("failed to encode observation")?;
    writeln!(out, "{}", line).context("failed to write observation")?;
    debug!(pieces = snapshot.pieces_locked, score = snapshot.score, "observation written");
    Ok(())
}

fn record(summary: &mut HeadlessSummary, snapshot: &GameSnapshot) {
    summary.pieces_locked = snapshot.pieces_locked;
    summary.score = snapshot.score;
    summary.lines = snapshot.lines;
    summary.game_over = snapshot.phase == Phase::GameOver;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, Matrix, NextQueue, TetrisGame};
    use crate::runtime::{GameLoop, ManualClock};
    use crate::types::ControlEvent;

    const TICK: Duration = Duration::from_millis(16);

    #[test]
    fn observation_serializes_rows_and_lock() {
        let mut game = TetrisGame::with_parts(
            GameConfig::default(),
            Matrix::new(),
            NextQueue::with_prefix(3, &[PieceKind::I]),
        );
        game.tick(Duration::ZERO);
        game.push(ControlEvent::HardDown);
        game.tick(Duration::ZERO);

        let obs = Observation::from_snapshot(&game.snapshot());
        assert_eq!(obs.pieces_locked, 1);
        assert_eq!(obs.rows.len(), 22);
        assert_eq!(obs.rows[21], "...IIII...");

        let json: serde_json::Value = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["piecesLocked"], 1);
        assert_eq!(json["lastLock"]["lines_cleared"], 0);
        assert_eq!(json["rows"].as_array().map(|r| r.len()), Some(22));
    }

    #[test]
    fn locks_made_while_not_reading_each_get_a_line() {
        let clock = Arc::new(ManualClock::new());
        let game = TetrisGame::with_parts(
            GameConfig::default(),
            Matrix::new(),
            NextQueue::with_prefix(3, &[PieceKind::I, PieceKind::O, PieceKind::T]),
        );
        let game_loop = GameLoop::spawn_game(game, TICK, clock.clone()).unwrap();
        let handle = game_loop.handle();
        let locks = handle.lock_feed();

        let mut seen = 0;
        let step = |seen: &mut u64| {
            clock.advance(TICK);
            let (version, snapshot) = handle.wait_newer(*seen, Duration::from_secs(2)).unwrap();
            *seen = version;
            snapshot
        };
        step(&mut seen);
        for _ in 0..3 {
            handle.control_queue_add(ControlEvent::HardDown);
            step(&mut seen);
            step(&mut seen);
        }
        // only the newest lock is left in the slot
        assert_eq!(handle.snapshot().pieces_locked, 3);
        game_loop.stop().unwrap();

        let mut out = Vec::new();
        let summary = follow_locks(&locks, &handle, None, Duration::from_millis(10), &mut out).unwrap();
        assert_eq!(summary.observations, 3);
        assert_eq!(summary.pieces_locked, 3);
        assert!(!summary.game_over);

        let text = String::from_utf8(out).unwrap();
        let locked: Vec<u64> = text
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["piecesLocked"].as_u64().unwrap())
            .collect();
        assert_eq!(locked, [1, 2, 3]);
    }
}
