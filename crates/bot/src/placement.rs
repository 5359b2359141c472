//! Placement bot - picks a rotation and shift by simulating every hard drop
//!
//! Candidates are `turns` right rotations (0..4) followed by a horizontal shift
//! in `-5..=5`, then a hard drop: the same vocabulary a human has. Each one is
//! played out on a copy of the matrix with the engine's own movement rules and
//! the result is scored with a linear combination of [board features](crate::features).

use tetris_engine_core::{GameSnapshot, Matrix, Tetrimino};
use tetris_engine_types::{ControlEvent, SKYLINE};

use crate::contract::{Bot, Plan};
use crate::features::{board_features, BoardFeatures};

/// Largest horizontal shift tried in either direction
pub const MAX_SHIFT: i8 = 5;

/// A decision: rotate right `turns` times, move `shift` columns, hard drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub turns: u8,
    pub shift: i8,
}

impl Placement {
    pub fn events(&self) -> Plan {
        let mut plan = Plan::new();
        for _ in 0..self.turns {
            plan.push(ControlEvent::RotateRight);
        }
        let step = if self.shift < 0 {
            ControlEvent::MoveLeft
        } else {
            ControlEvent::MoveRight
        };
        for _ in 0..self.shift.unsigned_abs() {
            plan.push(step);
        }
        plan.push(ControlEvent::HardDown);
        plan
    }
}

/// Feature weights. Positive weights reward, negative ones penalize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub aggregate_height: f64,
    pub lines: f64,
    pub holes: f64,
    pub bumpiness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            aggregate_height: -0.510066,
            lines: 0.760666,
            holes: -0.35663,
            bumpiness: -0.184483,
        }
    }
}

impl Weights {
    fn score(&self, features: &BoardFeatures, lines: usize) -> f64 {
        self.aggregate_height * features.aggregate_height as f64
            + self.lines * lines as f64
            + self.holes * features.holes as f64
            + self.bumpiness * features.bumpiness as f64
    }
}

/// Result of playing one placement out
#[derive(Debug, Clone)]
pub struct Outcome {
    pub placement: Placement,
    pub matrix: Matrix,
    pub lines: usize,
    pub piece: Tetrimino,
}

/// Play `placement` for `piece` on a copy of `matrix`.
///
/// Returns `None` if any step would be rejected by the game, since the game
/// would then land the piece somewhere else.
pub fn simulate(matrix: &Matrix, piece: Tetrimino, placement: Placement) -> Option<Outcome> {
    let mut current = piece;
    for _ in 0..placement.turns {
        current = current.rotated(matrix, true)?;
    }
    let dx = placement.shift.signum();
    for _ in 0..placement.shift.unsigned_abs() {
        let moved = current.shifted(dx, 0);
        if !matrix.can_place_piece(&moved) {
            return None;
        }
        current = moved;
    }
    let landed = current.shifted(0, -current.drop_distance(matrix));

    let mut after = matrix.clone();
    after.merge(&landed);
    let lines = after.clear_full_lines().len();
    Some(Outcome {
        placement,
        matrix: after,
        lines,
        piece: landed,
    })
}

#[derive(Debug, Clone, Default)]
pub struct PlacementBot {
    weights: Weights,
}

impl PlacementBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: Weights) -> Self {
        Self { weights }
    }

    /// Best placement for `piece`, `None` if nothing can be played
    pub fn best_placement(&self, matrix: &Matrix, piece: Tetrimino) -> Option<Placement> {
        let mut best: Option<(f64, Placement)> = None;

        for turns in 0..4u8 {
            for shift in -MAX_SHIFT..=MAX_SHIFT {
                let Some(outcome) = simulate(matrix, piece, Placement { turns, shift }) else {
                    continue;
                };
                let features = board_features(&outcome.matrix);
                let mut score = self.weights.score(&features, outcome.lines);
                if outcome.piece.cells().iter().all(|&(_, y)| y >= SKYLINE as i8) {
                    score = f64::NEG_INFINITY;
                }
                if best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, outcome.placement));
                }
            }
        }

        best.map(|(_, placement)| placement)
    }
}

impl Bot for PlacementBot {
    fn name(&self) -> &str {
        "placement"
    }

    fn plan(&mut self, snapshot: &GameSnapshot) -> Plan {
        let Some(piece) = snapshot.active else {
            return Plan::new();
        };
        self.best_placement(&snapshot.matrix, piece)
            .map(|p| p.events())
            .unwrap_or_default()
    }
}
