//! Bots - automated producers of control events
//!
//! - [`contract`]: the [`Bot`] trait and the thread that runs a bot
//! - [`features`]: board evaluation features (heights, holes, bumpiness)
//! - [`placement`]: a heuristic bot that simulates every rotation and shift
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use tetris_engine_bot::{BotRunner, PlacementBot};
//! use tetris_engine_runtime::{EngineConfig, GameLoop};
//!
//! let game_loop = GameLoop::spawn(EngineConfig::default())?;
//! let bot = BotRunner::spawn(PlacementBot::new(), game_loop.handle(), Duration::from_millis(50))?;
//! let stats = bot.join()?; // returns at game over
//! println!("{} pieces", stats.pieces_planned);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod contract;
pub mod features;
pub mod placement;

pub use contract::{Bot, BotHandle, BotRunner, BotStats, Plan};
pub use features::{board_features, BoardFeatures};
pub use placement::{Placement, PlacementBot, Weights};
