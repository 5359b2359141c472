//! Terminal Tetris runner (default binary).
//!
//! Interactive by default: crossterm input feeds the game's control queue and
//! snapshots are drawn with the framebuffer renderer. `--headless` skips the
//! terminal and prints one JSON observation per locked piece to stdout.

use std::env;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use tetris_engine::bot::{BotHandle, BotRunner, PlacementBot};
use tetris_engine::cli::{parse_args, BotChoice, CliArgs};
use tetris_engine::headless::follow_locks;
use tetris_engine::input::{handle_key_event, should_quit};
use tetris_engine::runtime::{EngineConfig, GameHandle, GameLoop};
use tetris_engine::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};

const BOT_POLL: Duration = Duration::from_millis(20);
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    init_tracing(cli.headless)?;

    let mut config = EngineConfig::from_env()?;
    cli.apply(&mut config);
    info!(
        seed = config.game.seed,
        level = config.game.start_level,
        lock_reset = config.game.lock_reset.as_str(),
        headless = cli.headless,
        "starting game"
    );

    let game_loop = GameLoop::spawn(config)?;
    // subscribed before the bot can lock anything
    let locks = cli.headless.then(|| game_loop.handle().lock_feed());
    let bot = spawn_bot(&cli, game_loop.handle())?;

    let result = if let Some(locks) = &locks {
        let stdout = io::stdout();
        follow_locks(locks, &game_loop.handle(), cli.max_pieces, BOT_POLL, &mut stdout.lock())
            .map(|_| ())
    } else {
        run_interactive(&game_loop.handle())
    };

    if let Some(bot) = bot {
        bot.stop()?;
    }
    let last = game_loop.stop()?;
    info!(score = last.score, lines = last.lines, pieces = last.pieces_locked, "game finished");
    result
}

/// Logs go to stderr; `TETRIS_LOG` picks the level.
fn init_tracing(headless: bool) -> Result<()> {
    let level = match env::var("TETRIS_LOG") {
        Ok(v) if !v.trim().is_empty() => LevelFilter::from_str(v.trim())
            .with_context(|| format!("invalid TETRIS_LOG value: {}", v))?,
        // a terminal UI owns the screen
        _ if headless => LevelFilter::INFO,
        _ => LevelFilter::OFF,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(level)
        .init();
    Ok(())
}

fn spawn_bot(cli: &CliArgs, game: GameHandle) -> Result<Option<BotHandle>> {
    match cli.bot() {
        BotChoice::None => Ok(None),
        BotChoice::Placement => BotRunner::spawn(PlacementBot::new(), game, BOT_POLL).map(Some),
    }
}

fn run_interactive(game: &GameHandle) -> Result<()> {
    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = draw_loop(&mut term, game);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn draw_loop(term: &mut TerminalRenderer, game: &GameHandle) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut drawn: Option<(u64, Viewport)> = None;

    loop {
        // a snapshot newer than `version` just costs one extra redraw
        let version = game.version();
        let snapshot = game.snapshot();
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        if drawn != Some((version, viewport)) {
            view.render_into(&snapshot, viewport, &mut fb);
            term.draw_swap(&mut fb)?;
            drawn = Some((version, viewport));
        }

        if !event::poll(FRAME)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(control) = handle_key_event(key) {
                    game.control_queue_add(control);
                }
            }
            Event::Resize(_, _) => term.invalidate(),
            _ => {}
        }
    }
}
