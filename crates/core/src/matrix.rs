//! Matrix module - the playfield grid of locked blocks
//!
//! The matrix is 10 columns wide and `SKYLINE + BUFFER_ROWS` rows high, stored in a
//! flat array (`y * WIDTH + x`). Row 0 is the **bottom** row. Cells outside the
//! side walls and below the floor count as occupied; rows above the top are empty
//! air so pieces may poke out of the buffer while rotating.

use arrayvec::ArrayVec;
use serde::{Serialize, Serializer};

use tetris_engine_types::{Cell, Facing, PieceKind, TetrisColor, MATRIX_HEIGHT, PLAYFIELD_WIDTH};

use crate::pieces::get_shape;
use crate::tetrimino::Tetrimino;

const WIDTH: usize = PLAYFIELD_WIDTH as usize;
const HEIGHT: usize = MATRIX_HEIGHT as usize;
const MATRIX_SIZE: usize = WIDTH * HEIGHT;

/// Indices of rows removed by one clear, bottom to top (pre-clear numbering)
pub type ClearedRows = ArrayVec<u8, HEIGHT>;

/// The playfield - locked blocks only, the active piece is never stored here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    cells: [Cell; MATRIX_SIZE],
}

impl Matrix {
    pub fn new() -> Self {
        Self {
            cells: [None; MATRIX_SIZE],
        }
    }

    /// Build a matrix from text rows, for fixtures and tests.
    ///
    /// The **last** string is row 0. `.` or space is empty; `#` fills the cell
    /// with an `I` block and a piece letter (`IOTSZJL`) fills it with that kind.
    /// Missing rows and columns stay empty; extra ones are ignored.
    ///
    /// ```
    /// use tetris_engine_core::Matrix;
    ///
    /// let m = Matrix::from_rows(&["..#.......", "#########."]);
    /// assert!(m.is_occupied(2, 1));
    /// assert!(!m.is_occupied(9, 0));
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut matrix = Self::new();
        for (y, row) in rows.iter().rev().enumerate().take(HEIGHT) {
            for (x, ch) in row.chars().enumerate().take(WIDTH) {
                let cell = match ch {
                    '.' | ' ' => None,
                    '#' => Some(PieceKind::I),
                    other => PieceKind::from_str(&other.to_string()),
                };
                matrix.set(x as i8, y as i8, cell);
            }
        }
        matrix
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= WIDTH as i8 || y < 0 || y >= HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        PLAYFIELD_WIDTH
    }

    pub fn height(&self) -> u8 {
        MATRIX_HEIGHT
    }

    /// Cell at `(x, y)`, `None` when out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Store a cell. Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Whether a block may not be placed at `(x, y)`.
    ///
    /// Walls and floor are solid, anything above the stored rows is open.
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= WIDTH as i8 || y < 0 {
            return true;
        }
        if y >= HEIGHT as i8 {
            return false;
        }
        self.cells[(y as usize) * WIDTH + (x as usize)].is_some()
    }

    /// Whether a piece of `kind` facing `facing` with its box corner at `(x, y)` fits
    pub fn can_place(&self, kind: PieceKind, facing: Facing, x: i8, y: i8) -> bool {
        get_shape(kind, facing)
            .iter()
            .all(|&(dx, dy)| !self.is_occupied(x + dx, y - dy))
    }

    pub fn can_place_piece(&self, piece: &Tetrimino) -> bool {
        self.can_place(piece.kind, piece.facing, piece.x, piece.y)
    }

    /// Copy a piece's blocks into the matrix.
    ///
    /// Returns how many of the four blocks were stored; blocks above the top row
    /// are lost. The caller decides what a partial merge means.
    pub fn merge(&mut self, piece: &Tetrimino) -> usize {
        piece
            .cells()
            .iter()
            .filter(|&&(x, y)| self.set(x, y, Some(piece.kind)))
            .count()
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return false;
        }
        let start = y * WIDTH;
        self.cells[start..start + WIDTH].iter().all(|c| c.is_some())
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return true;
        }
        let start = y * WIDTH;
        self.cells[start..start + WIDTH].iter().all(|c| c.is_none())
    }

    /// Remove every full row and let the rows above fall into the gaps.
    ///
    /// Two-pointer scan from the bottom up, rows never move by more than the
    /// number of cleared rows beneath them. Returns the removed row indices.
    pub fn clear_full_lines(&mut self) -> ClearedRows {
        let mut cleared = ClearedRows::new();
        let mut write_y = 0usize;

        for read_y in 0..HEIGHT {
            if self.is_row_full(read_y) {
                cleared.push(read_y as u8);
                continue;
            }
            if write_y != read_y {
                let src = read_y * WIDTH;
                self.cells.copy_within(src..src + WIDTH, write_y * WIDTH);
            }
            write_y += 1;
        }

        for cell in &mut self.cells[write_y * WIDTH..] {
            *cell = None;
        }

        cleared
    }

    /// Background color of a cell, `Empty` for free or out-of-range cells
    pub fn background(&self, x: i8, y: i8) -> TetrisColor {
        match self.get(x, y) {
            Some(Some(kind)) => kind.color(),
            _ => TetrisColor::Empty,
        }
    }

    /// Height of each column: one above its highest block, 0 for empty columns
    pub fn column_heights(&self) -> [u8; WIDTH] {
        let mut heights = [0u8; WIDTH];
        for (x, h) in heights.iter_mut().enumerate() {
            for y in (0..HEIGHT).rev() {
                if self.cells[y * WIDTH + x].is_some() {
                    *h = y as u8 + 1;
                    break;
                }
            }
        }
        heights
    }

    /// Cells of row `y`, left to right; `None` above the top row
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        let start = y.checked_mul(WIDTH)?;
        self.cells.get(start..start + WIDTH)
    }

    /// Row-major cells, bottom row first
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row as text: `.` for empty, the kind's uppercase letter otherwise.
    /// Empty string for rows above the top.
    pub fn row_text(&self, y: usize) -> String {
        self.row(y)
            .map(|row| row.iter().map(|cell| cell_char(*cell)).collect())
            .unwrap_or_default()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.cells = [None; MATRIX_SIZE];
    }
}

pub(crate) fn cell_char(cell: Cell) -> char {
    match cell {
        Some(kind) => kind.as_str().chars().next().unwrap_or('#').to_ascii_uppercase(),
        None => '.',
    }
}

/// Serialized as text rows, top row first
impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq((0..HEIGHT).rev().map(|y| self.row_text(y)))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}
