//! Tetris engine (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them under one name and adds the pieces the binary needs
//! (flag parsing and headless observation output).

pub mod cli;
pub mod headless;

pub use tetris_engine_bot as bot;
pub use tetris_engine_core as core;
pub use tetris_engine_input as input;
pub use tetris_engine_runtime as runtime;
pub use tetris_engine_term as term;
pub use tetris_engine_types as types;
