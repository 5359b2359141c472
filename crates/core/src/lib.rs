//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the rules: the matrix, the pieces, the 7-bag queue, the
//! control queue and the phase state machine. It has no clock and no terminal:
//! time comes in through [`TetrisGame::tick`], input through the [`ControlQueue`].
//!
//! - **Deterministic**: the same seed and the same event/tick sequence always
//!   produce the same game
//! - **Testable**: every phase transition can be driven with virtual time
//!
//! # Module Structure
//!
//! - [`matrix`]: 10x26 playfield with collision checks and line clearing
//! - [`pieces`]: shape tables and SRS kick tables
//! - [`tetrimino`]: the falling piece, movement and kicked rotation
//! - [`next_queue`]: seeded 7-bag generator with lookahead
//! - [`control_queue`]: multi-producer FIFO of control events
//! - [`game`]: phase state machine, gravity, lock delay, hold, scoring hooks
//! - [`scoring`]: line clear points, levels and gravity intervals
//! - [`snapshot`]: immutable views for readers on other threads
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use tetris_engine_core::{GameConfig, TetrisGame};
//! use tetris_engine_types::{ControlEvent, Phase};
//!
//! let mut game = TetrisGame::new(GameConfig::default());
//! game.tick(Duration::ZERO); // spawns the first piece
//! assert_eq!(game.phase(), Phase::Falling);
//!
//! game.push(ControlEvent::MoveLeft);
//! game.push(ControlEvent::HardDown);
//! game.tick(Duration::from_millis(16));
//!
//! assert_eq!(game.phase(), Phase::Spawn);
//! assert_eq!(game.matrix().filled_count(), 4);
//! assert_eq!(game.score(), 0); // no lines, no drop points by default
//! ```

pub mod config;
pub mod control_queue;
pub mod game;
pub mod matrix;
pub mod next_queue;
pub mod pieces;
pub mod scoring;
pub mod snapshot;
pub mod tetrimino;

pub use tetris_engine_types as types;

pub use config::{GameConfig, LockResetPolicy};
pub use control_queue::{ControlQueue, ControlSender};
pub use game::{LockEvent, TetrisGame, TickReport};
pub use matrix::Matrix;
pub use next_queue::{NextQueue, LOOKAHEAD};
pub use snapshot::{CellView, GameSnapshot, MatrixSnapshot};
pub use tetrimino::Tetrimino;
