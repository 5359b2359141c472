//! Shared types module - piece kinds, facings, colors, control events and constants
//!
//! Everything here is plain data with no behavior beyond small conversions, so it
//! can be used by the engine core, the game loop thread, bots and the renderer alike.
//!
//! # Playfield Dimensions
//!
//! The matrix is 10 columns wide. The visible part ("skyline") is 22 rows high and
//! four buffer rows sit above it so pieces can spawn and rotate partially off-screen.
//!
//! Coordinates are `(x, y)` with `x` growing to the right and `y` growing **up**:
//! row 0 is the bottom row of the playfield.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_TICK_MS` | 16 | Game loop tick (~60 Hz) |
//! | `DEFAULT_LOCK_DELAY_MS` | 500 | Grace window once a piece rests |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock delay resets per piece |
//!
//! # Gravity by Level
//!
//! | Level | Interval |
//! |-------|----------|
//! | 0 | 1000ms |
//! | 1 | 800ms |
//! | 2 | 650ms |
//! | 3 | 500ms |
//! | 4 | 400ms |
//! | 5 | 320ms |
//! | 6 | 250ms |
//! | 7 | 200ms |
//! | 8 | 160ms |
//! | 9+ | 120ms |
//!
//! # Examples
//!
//! ```
//! use tetris_engine_types::{ControlEvent, Facing, PieceKind, PLAYFIELD_WIDTH, SKYLINE};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(Facing::North.rotate_right(), Facing::East);
//! assert_eq!(ControlEvent::from_str("hardDown"), Some(ControlEvent::HardDown));
//! assert_eq!(PLAYFIELD_WIDTH, 10);
//! assert_eq!(SKYLINE, 22);
//! ```

use serde::Serialize;

/// Playfield width in cells (10 columns)
pub const PLAYFIELD_WIDTH: u8 = 10;

/// Visible playfield height in rows
pub const SKYLINE: u8 = 22;

/// Hidden rows above the skyline
pub const BUFFER_ROWS: u8 = 4;

/// Total number of stored rows (skyline plus buffer)
pub const MATRIX_HEIGHT: u8 = SKYLINE + BUFFER_ROWS;

/// Default game loop tick in milliseconds
pub const DEFAULT_TICK_MS: u32 = 16;

/// Default lock delay in milliseconds
pub const DEFAULT_LOCK_DELAY_MS: u32 = 500;

/// Maximum number of lock delay resets per piece under the move reset policy
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Gravity interval per level in milliseconds.
///
/// Index = level. Levels past the end use the last entry.
pub const GRAVITY_TABLE_MS: [u32; 10] = [1000, 800, 650, 500, 400, 320, 250, 200, 160, 120];

/// Line clear points at level 0, indexed by number of lines cleared in one lock.
///
/// Multiplied by `level + 1`.
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Number of upcoming kinds published in snapshots
pub const NEXT_PREVIEW_LEN: usize = 5;

/// The seven tetrimino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in canonical order (the order a fresh bag is filled in)
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Index into [`PieceKind::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Color used for this kind's cells
    pub fn color(&self) -> TetrisColor {
        match self {
            PieceKind::I => TetrisColor::Cyan,
            PieceKind::O => TetrisColor::Yellow,
            PieceKind::T => TetrisColor::Purple,
            PieceKind::S => TetrisColor::Green,
            PieceKind::Z => TetrisColor::Red,
            PieceKind::J => TetrisColor::Blue,
            PieceKind::L => TetrisColor::Orange,
        }
    }
}

/// Rotation state of a piece
///
/// Rotating right (clockwise) cycles North → East → South → West → North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    pub fn rotate_right(&self) -> Self {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    pub fn rotate_left(&self) -> Self {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    /// Number of right turns from North
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::North => "north",
            Facing::East => "east",
            Facing::South => "south",
            Facing::West => "west",
        }
    }
}

/// Control events that producers push into the control queue
///
/// Human input and bots speak the same closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlEvent {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down
    SoftDown,
    /// Drop piece to the lowest valid position and lock it
    HardDown,
    /// Rotate piece 90° counter-clockwise
    RotateLeft,
    /// Rotate piece 90° clockwise
    RotateRight,
    /// Swap the active piece with the hold slot (once per piece)
    Hold,
}

impl ControlEvent {
    /// Parse event from its camelCase name (case-insensitive)
    ///
    /// ```
    /// use tetris_engine_types::ControlEvent;
    ///
    /// assert_eq!(ControlEvent::from_str("moveLeft"), Some(ControlEvent::MoveLeft));
    /// assert_eq!(ControlEvent::from_str("ROTATERIGHT"), Some(ControlEvent::RotateRight));
    /// assert_eq!(ControlEvent::from_str("teleport"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(ControlEvent::MoveLeft),
            "moveright" => Some(ControlEvent::MoveRight),
            "softdown" => Some(ControlEvent::SoftDown),
            "harddown" => Some(ControlEvent::HardDown),
            "rotateleft" => Some(ControlEvent::RotateLeft),
            "rotateright" => Some(ControlEvent::RotateRight),
            "hold" => Some(ControlEvent::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlEvent::MoveLeft => "moveLeft",
            ControlEvent::MoveRight => "moveRight",
            ControlEvent::SoftDown => "softDown",
            ControlEvent::HardDown => "hardDown",
            ControlEvent::RotateLeft => "rotateLeft",
            ControlEvent::RotateRight => "rotateRight",
            ControlEvent::Hold => "hold",
        }
    }
}

/// Phase of the game state machine
///
/// Exactly one phase is active at a time. `LineClear` is only entered when a
/// line clear delay is configured; otherwise clearing happens inside the
/// lock → spawn transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Spawn,
    Falling,
    Lock,
    LineClear,
    GameOver,
}

impl Phase {
    /// Whether the active piece accepts control events in this phase
    pub fn accepts_control(&self) -> bool {
        matches!(self, Phase::Falling | Phase::Lock)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Spawn => "spawn",
            Phase::Falling => "falling",
            Phase::Lock => "lock",
            Phase::LineClear => "lineClear",
            Phase::GameOver => "gameOver",
        }
    }
}

/// Cell colors
///
/// `Empty` is the absence of a block. Every other variant belongs to exactly
/// one [`PieceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TetrisColor {
    #[default]
    Empty,
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

impl TetrisColor {
    pub fn is_empty(&self) -> bool {
        matches!(self, TetrisColor::Empty)
    }

    /// 24-bit RGB value used by renderers
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            TetrisColor::Empty => (0, 0, 0),
            TetrisColor::Cyan => (0, 240, 240),
            TetrisColor::Yellow => (240, 240, 0),
            TetrisColor::Purple => (160, 0, 240),
            TetrisColor::Green => (0, 240, 0),
            TetrisColor::Red => (240, 0, 0),
            TetrisColor::Blue => (0, 0, 240),
            TetrisColor::Orange => (240, 160, 0),
        }
    }
}

/// A stored matrix cell
///
/// - `None`: empty cell
/// - `Some(PieceKind)`: a merged block of that kind
pub type Cell = Option<PieceKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_table_is_monotone() {
        for pair in GRAVITY_TABLE_MS.windows(2) {
            assert!(pair[0] >= pair[1], "{:?} is not non-increasing", pair);
        }
    }

    #[test]
    fn facing_rotations_are_inverse() {
        for facing in Facing::ALL {
            assert_eq!(facing.rotate_right().rotate_left(), facing);
            assert_eq!(
                facing.rotate_right().rotate_right().rotate_right().rotate_right(),
                facing
            );
        }
    }

    #[test]
    fn every_kind_has_a_distinct_color() {
        let mut seen = Vec::new();
        for kind in PieceKind::ALL {
            let color = kind.color();
            assert!(!color.is_empty());
            assert!(!seen.contains(&color), "duplicate color for {:?}", kind);
            seen.push(color);
        }
    }

    #[test]
    fn control_event_names_round_trip() {
        for event in [
            ControlEvent::MoveLeft,
            ControlEvent::MoveRight,
            ControlEvent::SoftDown,
            ControlEvent::HardDown,
            ControlEvent::RotateLeft,
            ControlEvent::RotateRight,
            ControlEvent::Hold,
        ] {
            assert_eq!(ControlEvent::from_str(event.as_str()), Some(event));
        }
    }

    #[test]
    fn only_piece_phases_accept_control() {
        assert!(Phase::Falling.accepts_control());
        assert!(Phase::Lock.accepts_control());
        assert!(!Phase::Spawn.accepts_control());
        assert!(!Phase::LineClear.accepts_control());
        assert!(!Phase::GameOver.accepts_control());
    }
}
