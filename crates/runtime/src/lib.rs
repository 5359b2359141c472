//! Runtime - runs a [`TetrisGame`](tetris_engine_core::TetrisGame) on its own thread
//!
//! The game thread is the only writer of game state. It ticks on a fixed
//! interval, drains the control queue, and after every tick that changed
//! something publishes an `Arc<GameSnapshot>` that any thread can read through a
//! [`GameHandle`].
//!
//! ```no_run
//! use tetris_engine_runtime::{EngineConfig, GameLoop};
//! use tetris_engine_types::ControlEvent;
//!
//! let game_loop = GameLoop::spawn(EngineConfig::from_env()?)?;
//! let handle = game_loop.handle();
//! handle.control_queue_add(ControlEvent::HardDown);
//! println!("{:?}", handle.phase());
//! game_loop.stop()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod clock;
pub mod config;
pub mod game_loop;
pub mod slot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use game_loop::{GameHandle, GameLoop};
pub use slot::SnapshotSlot;
