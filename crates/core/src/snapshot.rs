//! Snapshots - immutable views of the game for readers on other threads
//!
//! A [`GameSnapshot`] is a complete copy: renderers, bots and observers read it
//! without ever touching the live game. [`MatrixSnapshot`] flattens it further
//! into per-cell colors, with the active piece drawn as foreground.

use serde::Serialize;
use tracing::warn;

use tetris_engine_types::{
    PieceKind, Phase, TetrisColor, MATRIX_HEIGHT, NEXT_PREVIEW_LEN, PLAYFIELD_WIDTH, SKYLINE,
};

use crate::game::LockEvent;
use crate::matrix::{cell_char, Matrix};
use crate::tetrimino::Tetrimino;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    /// Locked blocks only
    pub matrix: Matrix,
    pub active: Option<Tetrimino>,
    /// Box row of the active piece after a hard drop
    pub ghost_y: Option<i8>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub next: [PieceKind; NEXT_PREVIEW_LEN],
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub piece_id: u32,
    pub active_id: u32,
    pub pieces_locked: u32,
    pub last_lock: Option<LockEvent>,
    /// Game tick this snapshot was taken on
    pub tick: u64,
}

impl GameSnapshot {
    /// Per-cell view with the active piece as foreground
    pub fn matrix_view(&self) -> MatrixSnapshot {
        MatrixSnapshot::new(&self.matrix, self.active.as_ref())
    }

    /// Whether the active piece can still be steered
    pub fn accepts_control(&self) -> bool {
        self.active.is_some() && self.phase.accepts_control()
    }

    /// Visible rows as text, top row first, active piece included
    pub fn visible_rows(&self) -> Vec<String> {
        let view = self.matrix_view();
        (0..SKYLINE as usize)
            .rev()
            .map(|y| view.row_text(y))
            .collect()
    }
}

/// Colors of one rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CellView {
    /// Locked block
    pub background: TetrisColor,
    /// Active piece
    pub foreground: TetrisColor,
}

impl CellView {
    /// Both layers set means the active piece overlaps a locked block
    pub fn is_conflicting(&self) -> bool {
        !self.background.is_empty() && !self.foreground.is_empty()
    }

    /// Color to draw. On conflict the foreground wins and a warning is logged.
    pub fn resolve(&self) -> TetrisColor {
        if self.is_conflicting() {
            warn!(
                background = ?self.background,
                foreground = ?self.foreground,
                "active piece overlaps a locked cell"
            );
        }
        if self.foreground.is_empty() {
            self.background
        } else {
            self.foreground
        }
    }
}

/// Width x height grid of [`CellView`], row 0 at the bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSnapshot {
    cells: Vec<CellView>,
    kinds: Vec<Option<PieceKind>>,
}

impl MatrixSnapshot {
    const WIDTH: usize = PLAYFIELD_WIDTH as usize;
    const HEIGHT: usize = MATRIX_HEIGHT as usize;

    pub fn new(matrix: &Matrix, active: Option<&Tetrimino>) -> Self {
        let mut cells: Vec<CellView> = matrix
            .cells()
            .iter()
            .map(|cell| CellView {
                background: cell.map(|k| k.color()).unwrap_or_default(),
                foreground: TetrisColor::Empty,
            })
            .collect();
        let mut kinds = matrix.cells().to_vec();

        if let Some(piece) = active {
            for (x, y) in piece.cells() {
                if x < 0 || y < 0 || x as usize >= Self::WIDTH || y as usize >= Self::HEIGHT {
                    continue;
                }
                let idx = y as usize * Self::WIDTH + x as usize;
                cells[idx].foreground = piece.kind.color();
                kinds[idx] = Some(piece.kind);
            }
        }

        Self { cells, kinds }
    }

    pub fn width(&self) -> u8 {
        PLAYFIELD_WIDTH
    }

    pub fn height(&self) -> u8 {
        MATRIX_HEIGHT
    }

    pub fn cell(&self, x: u8, y: u8) -> Option<CellView> {
        if x as usize >= Self::WIDTH || y as usize >= Self::HEIGHT {
            return None;
        }
        Some(self.cells[y as usize * Self::WIDTH + x as usize])
    }

    pub fn cells(&self) -> &[CellView] {
        &self.cells
    }

    /// Number of cells where the active piece overlaps a locked block
    pub fn conflicts(&self) -> usize {
        self.cells.iter().filter(|c| c.is_conflicting()).count()
    }

    fn row_text(&self, y: usize) -> String {
        let start = y * Self::WIDTH;
        self.kinds[start..start + Self::WIDTH]
            .iter()
            .map(|kind| cell_char(*kind))
            .collect()
    }
}
