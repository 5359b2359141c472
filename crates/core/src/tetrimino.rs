//! Tetrimino - the falling piece: kind, facing and bounding box position

use serde::Serialize;

use tetris_engine_types::{Facing, PieceKind};

use crate::matrix::Matrix;
use crate::pieces::{get_shape, kicks, spawn_position, PieceShape};

/// A piece in play.
///
/// `(x, y)` is the top-left corner of the bounding box in matrix coordinates.
/// Values are copied freely; every movement helper returns a new piece and the
/// caller commits it only after checking it against the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tetrimino {
    pub kind: PieceKind,
    pub facing: Facing,
    pub x: i8,
    pub y: i8,
}

impl Tetrimino {
    /// A fresh piece at its spawn position, facing North
    pub fn spawn(kind: PieceKind) -> Self {
        let (x, y) = spawn_position(kind);
        Self {
            kind,
            facing: Facing::North,
            x,
            y,
        }
    }

    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.facing)
    }

    /// Absolute matrix cells covered by the piece
    pub fn cells(&self) -> [(i8, i8); 4] {
        self.shape().map(|(dx, dy)| (self.x + dx, self.y - dy))
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Lowest row covered by the piece
    pub fn bottom(&self) -> i8 {
        self.cells().iter().map(|&(_, y)| y).min().unwrap_or(self.y)
    }

    /// How many rows the piece can fall before resting
    pub fn drop_distance(&self, matrix: &Matrix) -> i8 {
        let mut distance = 0;
        while matrix.can_place_piece(&self.shifted(0, -(distance + 1))) {
            distance += 1;
        }
        distance
    }

    /// Whether the piece rests on the floor or on a block
    pub fn is_grounded(&self, matrix: &Matrix) -> bool {
        !matrix.can_place_piece(&self.shifted(0, -1))
    }

    /// Rotate with SRS wall kicks.
    ///
    /// Tries each kick offset in order and returns the first placement that fits,
    /// or `None` when every candidate collides.
    pub fn rotated(&self, matrix: &Matrix, clockwise: bool) -> Option<Self> {
        let facing = if clockwise {
            self.facing.rotate_right()
        } else {
            self.facing.rotate_left()
        };
        kicks(self.kind, self.facing, clockwise)
            .iter()
            .map(|&(kx, ky)| Self {
                kind: self.kind,
                facing,
                x: self.x + kx,
                y: self.y + ky,
            })
            .find(|candidate| matrix.can_place_piece(candidate))
    }
}
