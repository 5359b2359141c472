//! Terminal rendering for game snapshots.
//!
//! A small game-oriented layer: [`GameView`] draws a [`GameSnapshot`](core::GameSnapshot)
//! into a [`FrameBuffer`], and [`TerminalRenderer`] diffs successive frames and
//! writes only the changed runs. No widget toolkit involved.

pub mod fb;
pub mod renderer;
pub mod view;

pub use tetris_engine_core as core;
pub use tetris_engine_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use view::{AnchorY, GameView, Viewport};
