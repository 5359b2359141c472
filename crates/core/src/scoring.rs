//! Scoring module - line clear points, levels and gravity
//!
//! Classic rules: a clear of `n` lines is worth `LINE_SCORES[n] * (level + 1)`
//! points, the level goes up every 10 lines, and each level has its own
//! gravity interval.

use std::time::Duration;

use tetris_engine_types::{GRAVITY_TABLE_MS, LINES_PER_LEVEL, LINE_SCORES};

/// Points for clearing `lines` rows at once at `level`.
/// More than four lines (impossible with tetriminos) scores as four.
pub fn line_clear_score(lines: usize, level: u32) -> u32 {
    let base = LINE_SCORES[lines.min(LINE_SCORES.len() - 1)];
    base.saturating_mul(level.saturating_add(1))
}

/// Level reached after clearing `total_lines` when starting at `start_level`
pub fn level_for(start_level: u32, total_lines: u32) -> u32 {
    start_level.saturating_add(total_lines / LINES_PER_LEVEL)
}

/// Time between two gravity steps, clamped at the fastest entry
pub fn gravity_interval(level: u32) -> Duration {
    let idx = (level as usize).min(GRAVITY_TABLE_MS.len() - 1);
    Duration::from_millis(GRAVITY_TABLE_MS[idx] as u64)
}

/// Drop points: soft drop 1 per cell, hard drop 2 per cell
pub fn drop_score(cells: u32, hard: bool) -> u32 {
    if hard {
        cells * 2
    } else {
        cells
    }
}
