//! Engine configuration from environment variables
//!
//! Every variable is optional. Unparseable values are errors that name the
//! variable, so a typo never silently falls back to a default.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TETRIS_SEED` | 1 |
//! | `TETRIS_START_LEVEL` | 0 |
//! | `TETRIS_LOCK_DELAY_MS` | 500 |
//! | `TETRIS_LOCK_RESET` | `move` (`move`, `descent`, `never`) |
//! | `TETRIS_LINE_CLEAR_DELAY_MS` | 0 |
//! | `TETRIS_TICK_MS` | 16 |
//! | `TETRIS_DROP_POINTS` | false |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use tetris_engine_core::{GameConfig, LockResetPolicy};
use tetris_engine_types::DEFAULT_TICK_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub game: GameConfig,
    /// Game loop tick length
    pub tick: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            tick: Duration::from_millis(DEFAULT_TICK_MS as u64),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup (the environment, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed) = parse_var(&lookup, "TETRIS_SEED")? {
            config.game.seed = seed;
        }
        if let Some(level) = parse_var(&lookup, "TETRIS_START_LEVEL")? {
            config.game.start_level = level;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TETRIS_LOCK_DELAY_MS")? {
            config.game.lock_delay = Duration::from_millis(ms);
        }
        if let Some(raw) = non_empty(&lookup, "TETRIS_LOCK_RESET") {
            config.game.lock_reset = LockResetPolicy::from_str(&raw).ok_or_else(|| {
                anyhow!("TETRIS_LOCK_RESET: expected move, descent or never, got {raw:?}")
            })?;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TETRIS_LINE_CLEAR_DELAY_MS")? {
            config.game.line_clear_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TETRIS_TICK_MS")? {
            if ms == 0 {
                bail!("TETRIS_TICK_MS must be at least 1");
            }
            config.tick = Duration::from_millis(ms);
        }
        if let Some(raw) = non_empty(&lookup, "TETRIS_DROP_POINTS") {
            config.game.award_drop_points = parse_flag(&raw)
                .ok_or_else(|| anyhow!("TETRIS_DROP_POINTS: expected a boolean, got {raw:?}"))?;
        }

        Ok(config)
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("{name}: cannot parse {raw:?}"))
        })
        .transpose()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
