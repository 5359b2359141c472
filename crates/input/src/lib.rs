//! Terminal input - keyboard to [`ControlEvent`](types::ControlEvent) mapping.
//!
//! Kept free of any game state: a key press either names a control event or it
//! doesn't, and the caller pushes the event into the game's control queue like
//! any other producer.

pub mod map;

pub use tetris_engine_types as types;

pub use map::{handle_key_event, should_quit};
