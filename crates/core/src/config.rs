//! Game configuration - rules that vary between games
//!
//! Parsing from the environment lives in the runtime crate; this is plain data.

use std::time::Duration;

use tetris_engine_types::DEFAULT_LOCK_DELAY_MS;

/// When a resting piece gets its lock delay back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockResetPolicy {
    /// Any successful move or rotation resets the timer, up to `LOCK_RESET_LIMIT` times
    #[default]
    OnMove,
    /// Only reaching a new lowest row resets the timer
    OnDescent,
    /// The timer runs out no matter what
    Never,
}

impl LockResetPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "move" | "onmove" => Some(LockResetPolicy::OnMove),
            "descent" | "ondescent" => Some(LockResetPolicy::OnDescent),
            "never" | "off" => Some(LockResetPolicy::Never),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LockResetPolicy::OnMove => "move",
            LockResetPolicy::OnDescent => "descent",
            LockResetPolicy::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// NextQueue seed
    pub seed: u64,
    pub start_level: u32,
    pub lock_delay: Duration,
    pub lock_reset: LockResetPolicy,
    /// Length of the LineClear phase. Zero folds clearing into the lock.
    pub line_clear_delay: Duration,
    /// Award 1 point per soft-dropped cell and 2 per hard-dropped cell
    pub award_drop_points: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            start_level: 0,
            lock_delay: Duration::from_millis(DEFAULT_LOCK_DELAY_MS as u64),
            lock_reset: LockResetPolicy::OnMove,
            line_clear_delay: Duration::ZERO,
            award_drop_points: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_parse() {
        assert_eq!(LockResetPolicy::from_str("move"), Some(LockResetPolicy::OnMove));
        assert_eq!(
            LockResetPolicy::from_str(" Descent "),
            Some(LockResetPolicy::OnDescent)
        );
        assert_eq!(LockResetPolicy::from_str("never"), Some(LockResetPolicy::Never));
        assert_eq!(LockResetPolicy::from_str("sometimes"), None);
        for policy in [
            LockResetPolicy::OnMove,
            LockResetPolicy::OnDescent,
            LockResetPolicy::Never,
        ] {
            assert_eq!(LockResetPolicy::from_str(policy.as_str()), Some(policy));
        }
    }

    #[test]
    fn defaults_fold_line_clear() {
        let config = GameConfig::default();
        assert_eq!(config.line_clear_delay, Duration::ZERO);
        assert_eq!(config.lock_delay, Duration::from_millis(500));
        assert!(!config.award_drop_points);
    }
}
