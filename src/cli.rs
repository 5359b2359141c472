//! Command-line flags for the `tetris-engine` binary.
//!
//! Flags are layered on top of [`EngineConfig::from_env`]: anything given on the
//! command line wins over the environment.

use anyhow::{anyhow, Result};

use crate::runtime::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotChoice {
    /// Human at the keyboard (interactive) or gravity only (headless)
    None,
    Placement,
}

impl BotChoice {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" | "off" => Some(BotChoice::None),
            "placement" => Some(BotChoice::Placement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub seed: Option<u64>,
    pub level: Option<u32>,
    /// `None` means the mode's default: no bot interactively, placement headless
    pub bot: Option<BotChoice>,
    pub headless: bool,
    pub max_pieces: Option<u32>,
}

impl CliArgs {
    /// Bot to run once the mode is known
    pub fn bot(&self) -> BotChoice {
        match (self.bot, self.headless) {
            (Some(bot), _) => bot,
            (None, true) => BotChoice::Placement,
            (None, false) => BotChoice::None,
        }
    }

    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(seed) = self.seed {
            config.game.seed = seed;
        }
        if let Some(level) = self.level {
            config.game.start_level = level;
        }
    }
}

/// Parse flags, program name already stripped.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                cli.seed = Some(parse_value(args, i, "--seed")?);
            }
            "--level" => {
                i += 1;
                cli.level = Some(parse_value(args, i, "--level")?);
            }
            "--max-pieces" => {
                i += 1;
                cli.max_pieces = Some(parse_value(args, i, "--max-pieces")?);
            }
            "--bot" => {
                i += 1;
                let v = value(args, i, "--bot")?;
                cli.bot = Some(
                    BotChoice::from_str(v)
                        .ok_or_else(|| anyhow!("invalid --bot value: {} (expected placement|none)", v))?,
                );
            }
            "--headless" => cli.headless = true,
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(cli)
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing value for {}", flag))
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    let v = value(args, i, flag)?;
    v.parse::<T>()
        .map_err(|_| anyhow!("invalid {} value: {}", flag, v))
}
