//! Game module - the phase state machine
//!
//! `TetrisGame` owns the matrix, the active piece, the hold slot, the next queue,
//! the control queue and the score. It has no clock: the caller passes the time
//! elapsed since the previous call to [`TetrisGame::tick`], which makes every
//! transition reproducible in tests.
//!
//! One tick runs, in order:
//!
//! 1. `GameOver`: nothing, the queue is left alone.
//! 2. `LineClear`: the delay counts down and, once expired, the phase becomes `Spawn`.
//!    `Spawn`: pop a kind and place it; a collision ends the game right here.
//! 3. Drain every queued control event and apply them in arrival order. Events
//!    drained while no piece is in play are discarded.
//! 4. Timing for the phase the drain left behind: gravity while `Falling`, lock
//!    delay while `Lock`. A tick that spawned a piece skips this step so the
//!    new piece gets a full gravity interval.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use tetris_engine_types::{ControlEvent, PieceKind, Phase, LOCK_RESET_LIMIT, SKYLINE};

use crate::config::{GameConfig, LockResetPolicy};
use crate::control_queue::{ControlQueue, ControlSender};
use crate::matrix::Matrix;
use crate::next_queue::NextQueue;
use crate::scoring::{drop_score, gravity_interval, level_for, line_clear_score};
use crate::snapshot::GameSnapshot;
use crate::tetrimino::Tetrimino;

/// What happened when a piece locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockEvent {
    pub piece_id: u32,
    pub kind: PieceKind,
    pub lines_cleared: u8,
    pub score_gained: u32,
    /// The whole piece locked above the skyline
    pub lock_out: bool,
}

/// Summary of one [`TetrisGame::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub phase_before: Phase,
    pub phase: Phase,
    pub events_applied: u32,
    pub events_rejected: u32,
    pub events_discarded: u32,
    pub gravity_steps: u32,
    pub spawned: bool,
    pub lock: Option<LockEvent>,
}

impl TickReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase_before: phase,
            phase,
            events_applied: 0,
            events_rejected: 0,
            events_discarded: 0,
            gravity_steps: 0,
            spawned: false,
            lock: None,
        }
    }

    /// Whether anything visible to readers changed
    pub fn changed(&self) -> bool {
        self.phase != self.phase_before
            || self.events_applied > 0
            || self.gravity_steps > 0
            || self.spawned
            || self.lock.is_some()
    }
}

#[derive(Debug)]
pub struct TetrisGame {
    config: GameConfig,
    matrix: Matrix,
    next_queue: NextQueue,
    controls: ControlQueue,
    phase: Phase,
    active: Option<Tetrimino>,
    hold: Option<PieceKind>,
    can_hold: bool,
    score: u32,
    level: u32,
    lines: u32,
    /// Pieces taken from the next queue
    piece_id: u32,
    /// Bumped whenever the active piece is replaced (spawn or hold)
    active_id: u32,
    pieces_locked: u32,
    last_lock: Option<LockEvent>,
    gravity_elapsed: Duration,
    lock_elapsed: Duration,
    lock_resets: u8,
    /// Lowest bottom row the active piece has reached
    lowest_y: i8,
    line_clear_remaining: Duration,
    ticks: u64,
    pending: Vec<ControlEvent>,
}

impl TetrisGame {
    pub fn new(config: GameConfig) -> Self {
        let next_queue = NextQueue::new(config.seed);
        Self::with_parts(config, Matrix::new(), next_queue)
    }

    /// A game over a prepared matrix and queue. Starts in `Spawn`.
    pub fn with_parts(config: GameConfig, matrix: Matrix, next_queue: NextQueue) -> Self {
        let level = config.start_level;
        Self {
            config,
            matrix,
            next_queue,
            controls: ControlQueue::new(),
            phase: Phase::Spawn,
            active: None,
            hold: None,
            can_hold: true,
            score: 0,
            level,
            lines: 0,
            piece_id: 0,
            active_id: 0,
            pieces_locked: 0,
            last_lock: None,
            gravity_elapsed: Duration::ZERO,
            lock_elapsed: Duration::ZERO,
            lock_resets: 0,
            lowest_y: 0,
            line_clear_remaining: Duration::ZERO,
            ticks: 0,
            pending: Vec::with_capacity(32),
        }
    }

    /// Start over with an empty matrix and the same piece sequence.
    /// Queued events are dropped; existing senders stay connected.
    pub fn restart(&mut self) {
        self.controls.clear();
        self.next_queue.restart();
        self.matrix.clear();
        self.phase = Phase::Spawn;
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.score = 0;
        self.level = self.config.start_level;
        self.lines = 0;
        self.piece_id = 0;
        self.active_id = 0;
        self.pieces_locked = 0;
        self.last_lock = None;
        self.gravity_elapsed = Duration::ZERO;
        self.lock_elapsed = Duration::ZERO;
        self.lock_resets = 0;
        self.line_clear_remaining = Duration::ZERO;
        self.ticks = 0;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn next_queue(&self) -> &NextQueue {
        &self.next_queue
    }

    pub fn active(&self) -> Option<Tetrimino> {
        self.active
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn active_id(&self) -> u32 {
        self.active_id
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    pub fn last_lock(&self) -> Option<LockEvent> {
        self.last_lock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn gravity_interval(&self) -> Duration {
        gravity_interval(self.level)
    }

    /// Row the active piece's box would land on after a hard drop
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        Some(active.y - active.drop_distance(&self.matrix))
    }

    /// A producer handle for this game's control queue
    pub fn control_sender(&self) -> ControlSender {
        self.controls.sender()
    }

    /// Queue an event; it is applied on the next tick
    pub fn push(&self, event: ControlEvent) {
        self.controls.push(event);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            matrix: self.matrix.clone(),
            active: self.active,
            ghost_y: self.ghost_y(),
            hold: self.hold,
            can_hold: self.can_hold,
            next: self.next_queue.preview(),
            score: self.score,
            level: self.level,
            lines: self.lines,
            piece_id: self.piece_id,
            active_id: self.active_id,
            pieces_locked: self.pieces_locked,
            last_lock: self.last_lock,
            tick: self.ticks,
        }
    }

    /// Advance the game by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) -> TickReport {
        let mut report = TickReport::new(self.phase);
        if self.phase == Phase::GameOver {
            return report;
        }
        self.ticks += 1;
        let locked_before = self.pieces_locked;

        if self.phase == Phase::LineClear {
            if elapsed >= self.line_clear_remaining {
                self.line_clear_remaining = Duration::ZERO;
                self.phase = Phase::Spawn;
            } else {
                self.line_clear_remaining -= elapsed;
            }
        }

        if self.phase == Phase::Spawn {
            report.spawned = self.spawn();
            if !report.spawned {
                report.phase = self.phase;
                return report;
            }
        }

        self.drain_controls(&mut report);

        if !report.spawned {
            match self.phase {
                Phase::Falling => self.apply_gravity(elapsed, &mut report),
                Phase::Lock => self.advance_lock_delay(elapsed),
                _ => {}
            }
        }

        if self.pieces_locked != locked_before {
            report.lock = self.last_lock;
        }
        report.phase = self.phase;
        report
    }

    fn drain_controls(&mut self, report: &mut TickReport) {
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        pending.extend(self.controls.drain());

        for &event in &pending {
            if self.active.is_none() || !self.phase.accepts_control() {
                report.events_discarded += 1;
                continue;
            }
            if self.apply(event) {
                report.events_applied += 1;
            } else {
                report.events_rejected += 1;
            }
        }

        self.pending = pending;
    }

    fn apply_gravity(&mut self, elapsed: Duration, report: &mut TickReport) {
        let interval = self.gravity_interval();
        self.gravity_elapsed += elapsed;
        while self.gravity_elapsed >= interval {
            self.gravity_elapsed -= interval;
            if self.shift(0, -1) {
                report.gravity_steps += 1;
            } else {
                self.enter_lock();
                break;
            }
        }
    }

    fn advance_lock_delay(&mut self, elapsed: Duration) {
        let Some(active) = self.active else {
            return;
        };
        if !active.is_grounded(&self.matrix) {
            self.phase = Phase::Falling;
            self.gravity_elapsed = Duration::ZERO;
            return;
        }
        self.lock_elapsed += elapsed;
        if self.lock_elapsed >= self.config.lock_delay {
            self.lock_active();
        }
    }

    /// Landing never restarts the lock timer on its own. It is cleared by a new
    /// lowest row or a counted reset in `after_motion`, so stepping off a ledge
    /// and back keeps the time already spent there.
    fn enter_lock(&mut self) {
        self.phase = Phase::Lock;
        self.gravity_elapsed = Duration::ZERO;
    }

    /// Apply one control event to the active piece.
    ///
    /// Returns false when the event had no effect (blocked move, failed rotation,
    /// hold already used, no piece in play). Rejection is never an error.
    pub fn apply(&mut self, event: ControlEvent) -> bool {
        if self.active.is_none() || !self.phase.accepts_control() {
            return false;
        }
        match event {
            ControlEvent::MoveLeft => self.shift(-1, 0),
            ControlEvent::MoveRight => self.shift(1, 0),
            ControlEvent::SoftDown => {
                let moved = self.shift(0, -1);
                if moved && self.config.award_drop_points {
                    self.score += drop_score(1, false);
                }
                moved
            }
            ControlEvent::HardDown => self.hard_drop(),
            ControlEvent::RotateLeft => self.rotate(false),
            ControlEvent::RotateRight => self.rotate(true),
            ControlEvent::Hold => self.hold(),
        }
    }

    fn shift(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let moved = active.shifted(dx, dy);
        if !self.matrix.can_place_piece(&moved) {
            return false;
        }
        self.active = Some(moved);
        self.after_motion();
        true
    }

    fn rotate(&mut self, clockwise: bool) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        match active.rotated(&self.matrix, clockwise) {
            Some(rotated) => {
                self.active = Some(rotated);
                self.after_motion();
                true
            }
            None => false,
        }
    }

    /// Lock delay bookkeeping after a successful move or rotation
    fn after_motion(&mut self) {
        let Some(active) = self.active else {
            return;
        };
        let bottom = active.bottom();
        let descended = bottom < self.lowest_y;
        if descended {
            self.lowest_y = bottom;
        }

        match self.config.lock_reset {
            LockResetPolicy::OnMove => {
                if descended {
                    self.lock_resets = 0;
                    self.lock_elapsed = Duration::ZERO;
                } else if self.phase == Phase::Lock && self.lock_resets < LOCK_RESET_LIMIT {
                    self.lock_resets += 1;
                    self.lock_elapsed = Duration::ZERO;
                }
            }
            LockResetPolicy::OnDescent => {
                if descended {
                    self.lock_elapsed = Duration::ZERO;
                }
            }
            LockResetPolicy::Never => {}
        }

        if self.phase == Phase::Lock && !active.is_grounded(&self.matrix) {
            self.phase = Phase::Falling;
            self.gravity_elapsed = Duration::ZERO;
        }
    }

    fn hard_drop(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let distance = active.drop_distance(&self.matrix);
        self.active = Some(active.shifted(0, -distance));
        if self.config.award_drop_points {
            self.score += drop_score(distance as u32, true);
        }
        self.lock_active();
        true
    }

    fn hold(&mut self) -> bool {
        if !self.can_hold {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        match self.hold.replace(active.kind) {
            Some(held) => {
                self.place_new_piece(held);
            }
            None => {
                self.spawn();
            }
        }
        self.can_hold = false;
        true
    }

    /// Take the next kind from the queue and put it in play
    fn spawn(&mut self) -> bool {
        let kind = self.next_queue.pop();
        self.piece_id = self.piece_id.wrapping_add(1);
        self.can_hold = true;
        self.place_new_piece(kind)
    }

    /// Place a fresh piece at its spawn position. A collision ends the game.
    fn place_new_piece(&mut self, kind: PieceKind) -> bool {
        let piece = Tetrimino::spawn(kind);
        self.active_id = self.active_id.wrapping_add(1);
        self.gravity_elapsed = Duration::ZERO;
        self.lock_elapsed = Duration::ZERO;
        self.lock_resets = 0;
        self.lowest_y = piece.bottom();

        if !self.matrix.can_place_piece(&piece) {
            self.active = None;
            self.phase = Phase::GameOver;
            return false;
        }
        self.active = Some(piece);
        self.phase = Phase::Falling;
        true
    }

    /// Merge the active piece, clear lines, score, and pick the next phase
    fn lock_active(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        let lock_out = piece.cells().iter().all(|&(_, y)| y >= SKYLINE as i8);
        let stored = self.matrix.merge(&piece);
        if stored < 4 {
            warn!(
                kind = piece.kind.as_str(),
                stored, "piece locked partly above the matrix, cells dropped"
            );
        }

        let cleared = self.matrix.clear_full_lines().len();
        let gained = line_clear_score(cleared, self.level);
        self.score += gained;
        self.lines += cleared as u32;
        self.level = level_for(self.config.start_level, self.lines);
        self.pieces_locked += 1;
        self.last_lock = Some(LockEvent {
            piece_id: self.piece_id,
            kind: piece.kind,
            lines_cleared: cleared as u8,
            score_gained: gained,
            lock_out,
        });

        self.phase = if lock_out {
            Phase::GameOver
        } else if cleared > 0 && !self.config.line_clear_delay.is_zero() {
            self.line_clear_remaining = self.config.line_clear_delay;
            Phase::LineClear
        } else {
            Phase::Spawn
        };
    }
}

impl Default for TetrisGame {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ControlEvent::*;

    const MS: Duration = Duration::from_millis(1);

    fn game_with(kinds: &[PieceKind], matrix: Matrix) -> TetrisGame {
        TetrisGame::with_parts(
            GameConfig::default(),
            matrix,
            NextQueue::with_prefix(1, kinds),
        )
    }

    fn started(kinds: &[PieceKind]) -> TetrisGame {
        let mut game = game_with(kinds, Matrix::new());
        let report = game.tick(Duration::ZERO);
        assert!(report.spawned);
        game
    }

    #[test]
    fn new_game_waits_in_spawn() {
        let game = TetrisGame::default();
        assert_eq!(game.phase(), Phase::Spawn);
        assert!(game.active().is_none());
        assert_eq!(game.score(), 0);
        assert_eq!(game.piece_id(), 0);
    }

    #[test]
    fn first_tick_spawns_from_the_queue() {
        let game = started(&[PieceKind::T]);
        assert_eq!(game.phase(), Phase::Falling);
        assert_eq!(game.active().map(|p| p.kind), Some(PieceKind::T));
        assert_eq!(game.piece_id(), 1);
        assert_eq!(game.active_id(), 1);
    }

    #[test]
    fn spawn_tick_skips_gravity() {
        let mut game = game_with(&[PieceKind::T], Matrix::new());
        game.tick(Duration::from_secs(5));
        assert_eq!(game.active(), Some(Tetrimino::spawn(PieceKind::T)));
    }

    #[test]
    fn moves_and_rejections() {
        let mut game = started(&[PieceKind::O]);
        game.push(MoveLeft);
        game.push(MoveLeft);
        game.push(MoveLeft);
        game.push(MoveLeft);
        game.push(MoveLeft);
        let report = game.tick(Duration::ZERO);
        // O spans columns 4-5, so four moves reach the wall
        assert_eq!(report.events_applied, 4);
        assert_eq!(report.events_rejected, 1);
        assert!(game
            .active()
            .unwrap()
            .cells()
            .iter()
            .any(|&(x, _)| x == 0));
    }

    #[test]
    fn gravity_moves_one_row_per_interval() {
        let mut game = started(&[PieceKind::T]);
        let interval = game.gravity_interval();
        let y0 = game.active().unwrap().y;
        let report = game.tick(interval);
        assert_eq!(report.gravity_steps, 1);
        assert_eq!(game.active().unwrap().y, y0 - 1);
        game.tick(interval - MS);
        assert_eq!(game.active().unwrap().y, y0 - 1);
        game.tick(MS);
        assert_eq!(game.active().unwrap().y, y0 - 2);
    }

    #[test]
    fn blocked_gravity_enters_lock_then_locks_after_delay() {
        let mut game = started(&[PieceKind::T, PieceKind::O]);
        let interval = game.gravity_interval();
        let distance = game.active().unwrap().drop_distance(game.matrix());
        for _ in 0..distance {
            assert_eq!(game.tick(interval).gravity_steps, 1);
            assert_eq!(game.phase(), Phase::Falling);
        }
        let report = game.tick(interval);
        assert_eq!(report.gravity_steps, 0);
        assert_eq!(game.phase(), Phase::Lock);

        game.tick(Duration::from_millis(499));
        assert_eq!(game.phase(), Phase::Lock);
        let report = game.tick(MS);
        assert_eq!(game.phase(), Phase::Spawn);
        assert_eq!(report.lock.map(|l| l.kind), Some(PieceKind::T));
        assert_eq!(game.matrix().filled_count(), 4);
    }

    #[test]
    fn hard_down_locks_immediately() {
        let mut game = started(&[PieceKind::I]);
        game.push(HardDown);
        let report = game.tick(Duration::ZERO);
        assert_eq!(report.events_applied, 1);
        assert_eq!(game.phase(), Phase::Spawn);
        assert!(game.active().is_none());
        assert_eq!(game.matrix().filled_count(), 4);
        assert_eq!(game.matrix().row_text(0), "...IIII...");
    }

    #[test]
    fn events_after_lock_in_same_drain_are_discarded() {
        let mut game = started(&[PieceKind::I, PieceKind::O]);
        game.push(HardDown);
        game.push(MoveLeft);
        game.push(RotateRight);
        let report = game.tick(Duration::ZERO);
        assert_eq!(report.events_applied, 1);
        assert_eq!(report.events_discarded, 2);
        game.tick(Duration::ZERO);
        assert_eq!(game.active(), Some(Tetrimino::spawn(PieceKind::O)));
    }

    #[test]
    fn move_off_a_ledge_returns_to_falling() {
        let matrix = Matrix::from_rows(&["....##...."]);
        let mut game = game_with(&[PieceKind::O], matrix);
        game.tick(Duration::ZERO);
        let interval = game.gravity_interval();
        while game.phase() == Phase::Falling {
            game.tick(interval);
        }
        assert_eq!(game.phase(), Phase::Lock);
        assert_eq!(game.active().unwrap().bottom(), 1);

        game.push(MoveRight);
        game.push(MoveRight);
        game.tick(Duration::ZERO);
        assert_eq!(game.phase(), Phase::Falling);
    }

    #[test]
    fn lock_reset_limit_under_move_policy() {
        let mut game = started(&[PieceKind::T, PieceKind::O]);
        game.push(HardDown);
        game.tick(Duration::ZERO);
        game.tick(Duration::ZERO);
        // second piece rests on the first one
        let interval = game.gravity_interval();
        while game.phase() == Phase::Falling {
            game.tick(interval);
        }
        assert_eq!(game.phase(), Phase::Lock);

        for i in 0..LOCK_RESET_LIMIT {
            game.tick(Duration::from_millis(400));
            let event = if i % 2 == 0 { RotateRight } else { RotateLeft };
            game.push(event);
            game.tick(Duration::ZERO);
            assert_eq!(game.phase(), Phase::Lock, "reset {}", i);
        }
        // resets exhausted: the timer keeps running
        game.tick(Duration::from_millis(400));
        game.push(RotateRight);
        game.tick(Duration::ZERO);
        assert_eq!(game.phase(), Phase::Lock);
        game.tick(Duration::from_millis(100));
        assert_eq!(game.phase(), Phase::Spawn);
        assert_eq!(game.pieces_locked(), 2);
    }

    #[test]
    fn never_policy_ignores_moves() {
        let config = GameConfig {
            lock_reset: LockResetPolicy::Never,
            ..GameConfig::default()
        };
        let mut game =
            TetrisGame::with_parts(config, Matrix::new(), NextQueue::with_prefix(1, &[PieceKind::T]));
        game.tick(Duration::ZERO);
        let interval = game.gravity_interval();
        while game.phase() == Phase::Falling {
            game.tick(interval);
        }
        game.tick(Duration::from_millis(300));
        game.push(MoveLeft);
        game.tick(Duration::ZERO);
        assert_eq!(game.phase(), Phase::Lock);
        game.tick(Duration::from_millis(200));
        assert_eq!(game.pieces_locked(), 1);
    }

    fn on_ledge(policy: LockResetPolicy) -> TetrisGame {
        let config = GameConfig {
            lock_reset: policy,
            ..GameConfig::default()
        };
        let mut game = TetrisGame::with_parts(
            config,
            Matrix::from_rows(&["....##...."]),
            NextQueue::with_prefix(1, &[PieceKind::O]),
        );
        game.tick(Duration::ZERO);
        let interval = game.gravity_interval();
        while game.phase() == Phase::Falling {
            game.tick(interval);
        }
        assert_eq!(game.phase(), Phase::Lock);
        assert_eq!(game.active().unwrap().bottom(), 1);
        game
    }

    /// Off the ledge and back again without falling, then let gravity land it
    fn step_off_and_back(game: &mut TetrisGame) {
        for event in [MoveRight, MoveRight, MoveLeft, MoveLeft] {
            game.push(event);
        }
        game.tick(Duration::ZERO);
        assert_eq!(game.phase(), Phase::Falling);
        let interval = game.gravity_interval();
        game.tick(interval);
        assert_eq!(game.phase(), Phase::Lock);
        assert_eq!(game.active().unwrap().bottom(), 1);
    }

    #[test]
    fn descent_policy_keeps_the_timer_when_relanding_on_the_same_row() {
        let mut game = on_ledge(LockResetPolicy::OnDescent);
        game.tick(Duration::from_millis(400));
        step_off_and_back(&mut game);
        assert_eq!(game.pieces_locked(), 0);

        game.tick(Duration::from_millis(100));
        assert_eq!(game.phase(), Phase::Spawn);
        assert_eq!(game.pieces_locked(), 1);
    }

    #[test]
    fn descent_policy_resets_on_a_new_lowest_row() {
        let config = GameConfig {
            lock_reset: LockResetPolicy::OnDescent,
            ..GameConfig::default()
        };
        let mut game = TetrisGame::with_parts(
            config,
            Matrix::from_rows(&["....##...."]),
            NextQueue::with_prefix(1, &[PieceKind::O]),
        );
        game.tick(Duration::ZERO);
        let interval = game.gravity_interval();
        while game.phase() == Phase::Falling {
            game.tick(interval);
        }
        game.tick(Duration::from_millis(400));
        // past the ledge edge, the O drops to the floor
        game.push(MoveRight);
        game.push(MoveRight);
        game.tick(Duration::ZERO);
        game.tick(interval);
        assert_eq!(game.active().unwrap().bottom(), 0);
        game.tick(interval);
        assert_eq!(game.phase(), Phase::Lock);

        game.tick(Duration::from_millis(400));
        assert_eq!(game.phase(), Phase::Lock);
        game.tick(Duration::from_millis(100));
        assert_eq!(game.pieces_locked(), 1);
    }

    #[test]
    fn stepping_off_a_ledge_cannot_stall_the_lock_forever() {
        for policy in [LockResetPolicy::OnMove, LockResetPolicy::OnDescent, LockResetPolicy::Never] {
            let mut game = on_ledge(policy);
            let mut cycles = 0;
            while game.pieces_locked() == 0 {
                game.tick(Duration::from_millis(400));
                if game.pieces_locked() > 0 {
                    break;
                }
                step_off_and_back(&mut game);
                cycles += 1;
                assert!(cycles <= LOCK_RESET_LIMIT as u32 + 1, "{:?} never locked", policy);
            }
        }
    }

    #[test]
    fn hold_stashes_then_swaps_once_per_piece() {
        let mut game = started(&[PieceKind::T, PieceKind::I, PieceKind::O]);
        game.push(Hold);
        game.push(Hold);
        let report = game.tick(Duration::ZERO);
        assert_eq!(report.events_applied, 1);
        assert_eq!(report.events_rejected, 1);
        assert_eq!(game.hold_piece(), Some(PieceKind::T));
        assert_eq!(game.active().map(|p| p.kind), Some(PieceKind::I));
        assert_eq!(game.piece_id(), 2);
        assert_eq!(game.active_id(), 2);

        game.push(HardDown);
        game.tick(Duration::ZERO);
        game.tick(Duration::ZERO);
        assert_eq!(game.active().map(|p| p.kind), Some(PieceKind::O));
        game.push(Hold);
        game.tick(Duration::ZERO);
        assert_eq!(game.hold_piece(), Some(PieceKind::O));
        assert_eq!(game.active(), Some(Tetrimino::spawn(PieceKind::T)));
    }

    #[test]
    fn single_line_clear_scores_and_shifts() {
        let matrix = Matrix::from_rows(&["#.........", "########.."]);
        let mut game = game_with(&[PieceKind::O], matrix);
        game.tick(Duration::ZERO);
        for _ in 0..4 {
            game.push(MoveRight);
        }
        game.push(HardDown);
        let report = game.tick(Duration::ZERO);
        let lock = report.lock.unwrap();
        assert_eq!(lock.lines_cleared, 1);
        assert_eq!(lock.score_gained, 40);
        assert_eq!(game.score(), 40);
        assert_eq!(game.lines(), 1);
        // the upper half of the O and the stray block fell one row
        assert_eq!(game.matrix().get(0, 0), Some(Some(PieceKind::I)));
        assert_eq!(game.matrix().get(8, 0), Some(Some(PieceKind::O)));
        assert_eq!(game.matrix().get(9, 0), Some(Some(PieceKind::O)));
        assert_eq!(game.matrix().filled_count(), 3);
    }

    #[test]
    fn level_rises_every_ten_lines() {
        let mut game = started(&[PieceKind::I]);
        game.lines = 9;
        game.matrix = Matrix::from_rows(&["....######"]);
        game.push(MoveLeft);
        game.push(MoveLeft);
        game.push(MoveLeft);
        game.push(HardDown);
        game.tick(Duration::ZERO);
        assert_eq!(game.lines(), 10);
        assert_eq!(game.level(), 1);
        assert_eq!(game.gravity_interval(), Duration::from_millis(800));
    }

    #[test]
    fn line_clear_delay_gets_its_own_phase() {
        let config = GameConfig {
            line_clear_delay: Duration::from_millis(100),
            ..GameConfig::default()
        };
        let matrix = Matrix::from_rows(&["....######"]);
        let mut game = TetrisGame::with_parts(
            config,
            matrix,
            NextQueue::with_prefix(1, &[PieceKind::I, PieceKind::T]),
        );
        game.tick(Duration::ZERO);
        for _ in 0..3 {
            game.push(MoveLeft);
        }
        game.push(HardDown);
        game.tick(Duration::ZERO);
        assert_eq!(game.phase(), Phase::LineClear);
        assert_eq!(game.score(), 40);

        game.push(MoveLeft);
        let report = game.tick(Duration::from_millis(60));
        assert_eq!(report.events_discarded, 1);
        assert_eq!(game.phase(), Phase::LineClear);

        let report = game.tick(Duration::from_millis(40));
        assert!(report.spawned);
        assert_eq!(game.phase(), Phase::Falling);
        assert_eq!(game.active().map(|p| p.kind), Some(PieceKind::T));
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let mut matrix = Matrix::new();
        for x in 3..7 {
            matrix.set(x, SKYLINE as i8 - 1, Some(PieceKind::Z));
        }
        let mut game = game_with(&[PieceKind::T], matrix);
        game.push(MoveLeft);
        let report = game.tick(Duration::ZERO);
        assert!(!report.spawned);
        assert_eq!(report.phase, Phase::GameOver);
        assert_eq!(report.events_discarded, 0);
        assert!(game.active().is_none());

        let report = game.tick(Duration::from_secs(1));
        assert!(!report.changed());
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn locking_entirely_above_the_skyline_is_game_over() {
        let mut game = started(&[PieceKind::I]);
        let mut matrix = Matrix::new();
        for y in 0..SKYLINE as i8 {
            for x in 0..10 {
                if x != 9 {
                    matrix.set(x, y, Some(PieceKind::J));
                }
            }
        }
        game.matrix = matrix;
        game.active = Some(Tetrimino {
            kind: PieceKind::I,
            facing: tetris_engine_types::Facing::North,
            x: 3,
            y: SKYLINE as i8 + 1,
        });
        game.push(HardDown);
        let report = game.tick(Duration::ZERO);
        assert!(report.lock.unwrap().lock_out);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn drop_points_are_opt_in() {
        let config = GameConfig {
            award_drop_points: true,
            ..GameConfig::default()
        };
        let mut game =
            TetrisGame::with_parts(config, Matrix::new(), NextQueue::with_prefix(1, &[PieceKind::O]));
        game.tick(Duration::ZERO);
        game.push(SoftDown);
        game.push(HardDown);
        game.tick(Duration::ZERO);
        // spawn bottom row 20: one soft step, then 19 rows hard
        assert_eq!(game.score(), 1 + 19 * 2);
    }

    #[test]
    fn restart_replays_the_same_pieces() {
        let mut game = TetrisGame::new(GameConfig {
            seed: 11,
            ..GameConfig::default()
        });
        game.tick(Duration::ZERO);
        let first = game.active().unwrap().kind;
        game.push(HardDown);
        game.tick(Duration::ZERO);
        game.restart();
        assert_eq!(game.phase(), Phase::Spawn);
        assert_eq!(game.matrix().filled_count(), 0);
        game.tick(Duration::ZERO);
        assert_eq!(game.active().unwrap().kind, first);
    }

    #[test]
    fn snapshot_reflects_state() {
        let game = started(&[PieceKind::S, PieceKind::Z]);
        let snap = game.snapshot();
        assert_eq!(snap.phase, Phase::Falling);
        assert_eq!(snap.active, game.active());
        assert_eq!(snap.next[0], PieceKind::Z);
        assert_eq!(snap.ghost_y, game.ghost_y());
        assert_eq!(snap.tick, 1);
    }
}
