//! Pieces module - tetrimino shapes and SRS kick tables
//!
//! Shapes are given as four `(col, row)` offsets inside the piece's bounding box,
//! measured right and **down** from the box's top-left corner. The matrix itself
//! grows upward, so a cell `(col, row)` of a piece whose box corner sits at `(x, y)`
//! lands on matrix cell `(x + col, y - row)`.
//!
//! Kick offsets follow the Super Rotation System (<https://tetris.wiki/SRS>) and are
//! expressed in matrix coordinates (`dy > 0` moves the piece up).

use tetris_engine_types::{Facing, PieceKind, SKYLINE};

/// Offset of a single mino relative to the box's top-left corner
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets
pub type PieceShape = [MinoOffset; 4];

/// Get the shape for a piece kind and facing
pub fn get_shape(kind: PieceKind, facing: Facing) -> PieceShape {
    match kind {
        PieceKind::I => i_shape(facing),
        PieceKind::O => [(1, 0), (2, 0), (1, 1), (2, 1)],
        PieceKind::T => t_shape(facing),
        PieceKind::S => s_shape(facing),
        PieceKind::Z => z_shape(facing),
        PieceKind::J => j_shape(facing),
        PieceKind::L => l_shape(facing),
    }
}

fn i_shape(facing: Facing) -> PieceShape {
    match facing {
        Facing::North => [(0, 1), (1, 1), (2, 1), (3, 1)],
        Facing::East => [(2, 0), (2, 1), (2, 2), (2, 3)],
        Facing::South => [(0, 2), (1, 2), (2, 2), (3, 2)],
        Facing::West => [(1, 0), (1, 1), (1, 2), (1, 3)],
    }
}

fn t_shape(facing: Facing) -> PieceShape {
    match facing {
        Facing::North => [(1, 0), (0, 1), (1, 1), (2, 1)],
        Facing::East => [(1, 0), (1, 1), (2, 1), (1, 2)],
        Facing::South => [(0, 1), (1, 1), (2, 1), (1, 2)],
        Facing::West => [(1, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn s_shape(facing: Facing) -> PieceShape {
    match facing {
        Facing::North => [(1, 0), (2, 0), (0, 1), (1, 1)],
        Facing::East => [(1, 0), (1, 1), (2, 1), (2, 2)],
        Facing::South => [(1, 1), (2, 1), (0, 2), (1, 2)],
        Facing::West => [(0, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn z_shape(facing: Facing) -> PieceShape {
    match facing {
        Facing::North => [(0, 0), (1, 0), (1, 1), (2, 1)],
        Facing::East => [(2, 0), (1, 1), (2, 1), (1, 2)],
        Facing::South => [(0, 1), (1, 1), (1, 2), (2, 2)],
        Facing::West => [(1, 0), (0, 1), (1, 1), (0, 2)],
    }
}

fn j_shape(facing: Facing) -> PieceShape {
    match facing {
        Facing::North => [(0, 0), (0, 1), (1, 1), (2, 1)],
        Facing::East => [(1, 0), (2, 0), (1, 1), (1, 2)],
        Facing::South => [(0, 1), (1, 1), (2, 1), (2, 2)],
        Facing::West => [(1, 0), (1, 1), (0, 2), (1, 2)],
    }
}

fn l_shape(facing: Facing) -> PieceShape {
    match facing {
        Facing::North => [(2, 0), (0, 1), (1, 1), (2, 1)],
        Facing::East => [(1, 0), (1, 1), (1, 2), (2, 2)],
        Facing::South => [(0, 1), (1, 1), (2, 1), (0, 2)],
        Facing::West => [(0, 0), (1, 0), (1, 1), (1, 2)],
    }
}

/// Kick candidates for one facing transition, tried in order.
/// The first entry is always `(0, 0)`: the unkicked rotation.
pub type KickList = [(i8, i8); 5];

/// Kick lists for all 8 transitions, indexed by [`kick_index`]
pub type KickTable = [KickList; 8];

/// O pieces never need a kick, every facing has the same cells
const O_KICKS: KickTable = [[(0, 0); 5]; 8];

/// Shared by J, L, S, T and Z
const JLSTZ_KICKS: KickTable = [
    // N->E
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // N->W
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // E->N
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // E->S
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // S->E
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // S->W
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // W->S
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // W->N
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

const I_KICKS: KickTable = [
    // N->E
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // N->W
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // E->N
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // E->S
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // S->E
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // S->W
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // W->S
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // W->N
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

/// Table index of the transition leaving `from` in the given direction
pub fn kick_index(from: Facing, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Facing::North, true) => 0,
        (Facing::North, false) => 1,
        (Facing::East, false) => 2,
        (Facing::East, true) => 3,
        (Facing::South, false) => 4,
        (Facing::South, true) => 5,
        (Facing::West, false) => 6,
        (Facing::West, true) => 7,
    }
}

/// Kick candidates for rotating `kind` out of `from`
pub fn kicks(kind: PieceKind, from: Facing, clockwise: bool) -> &'static KickList {
    &get_kick_table(kind)[kick_index(from, clockwise)]
}

/// Spawn position (top-left corner of the bounding box) for a kind.
///
/// Every kind spawns facing North in the two rows right below the skyline; the
/// I piece's bar sits on row 1 of its box, so its box starts one row higher.
pub fn spawn_position(kind: PieceKind) -> (i8, i8) {
    let top = SKYLINE as i8 - 1;
    match kind {
        PieceKind::I => (3, top + 1),
        _ => (3, top),
    }
}
