//! Bot contract - how automated players plug into a running game
//!
//! A [`Bot`] only decides. [`BotRunner`] gives it a thread, feeds it snapshots,
//! and pushes its plans into the control queue. A bot never touches game state
//! directly and is asked at most once per active piece.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use arrayvec::ArrayVec;
use tracing::{info, trace};

use tetris_engine_core::control_queue::MAX_BATCH;
use tetris_engine_core::GameSnapshot;
use tetris_engine_runtime::GameHandle;
use tetris_engine_types::{ControlEvent, Phase};

/// Events for one piece, delivered to the game in one batch
pub type Plan = ArrayVec<ControlEvent, MAX_BATCH>;

pub trait Bot: Send + 'static {
    fn name(&self) -> &str;

    /// Decide what to do with the active piece in `snapshot`.
    ///
    /// Called once per piece, only while the piece accepts control. An empty
    /// plan leaves the piece to gravity.
    fn plan(&mut self, snapshot: &GameSnapshot) -> Plan;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotStats {
    pub pieces_planned: u32,
    pub events_sent: u64,
}

pub struct BotRunner;

impl BotRunner {
    /// Run `bot` against `game` on its own thread.
    ///
    /// The thread waits for new snapshots in slices of `poll` and checks its stop
    /// flag between slices. It ends on its own when the game is over.
    pub fn spawn<B: Bot>(bot: B, game: GameHandle, poll: Duration) -> Result<BotHandle> {
        let name = bot.name().to_string();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name(format!("bot-{name}"))
            .spawn(move || run(bot, game, poll, flag))
            .with_context(|| format!("failed to spawn bot thread for {name}"))?;

        Ok(BotHandle {
            name,
            stop,
            thread: Some(thread),
        })
    }
}

fn run<B: Bot>(mut bot: B, game: GameHandle, poll: Duration, stop: Arc<AtomicBool>) -> BotStats {
    info!(bot = bot.name(), "bot started");
    let mut stats = BotStats::default();
    let mut seen = 0u64;
    let mut last_active = None;

    while !stop.load(Ordering::Acquire) {
        let Some((version, snapshot)) = game.wait_newer(seen, poll) else {
            if !game.is_running() {
                break;
            }
            continue;
        };
        seen = version;

        if snapshot.phase == Phase::GameOver {
            break;
        }
        if !snapshot.accepts_control() || last_active == Some(snapshot.active_id) {
            continue;
        }
        last_active = Some(snapshot.active_id);

        let plan = bot.plan(&snapshot);
        stats.pieces_planned += 1;
        if plan.is_empty() {
            continue;
        }
        trace!(bot = bot.name(), active_id = snapshot.active_id, events = plan.len(), "plan sent");
        game.push_all(&plan);
        stats.events_sent += plan.len() as u64;
    }

    info!(
        bot = bot.name(),
        pieces = stats.pieces_planned,
        events = stats.events_sent,
        "bot stopped"
    );
    stats
}

/// Owner of a bot thread. Dropping it stops and joins the thread.
#[derive(Debug)]
pub struct BotHandle {
    name: String,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<BotStats>>,
}

impl BotHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Ask the bot to stop and wait for it
    pub fn stop(mut self) -> Result<BotStats> {
        self.stop.store(true, Ordering::Release);
        self.join_thread()
    }

    /// Wait for the bot to finish on its own (game over)
    pub fn join(mut self) -> Result<BotStats> {
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<BotStats> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| anyhow!("bot thread {} panicked", self.name)),
            None => Ok(BotStats::default()),
        }
    }
}

impl Drop for BotHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
