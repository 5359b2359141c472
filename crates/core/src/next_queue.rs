//! NextQueue - seeded 7-bag piece generation
//!
//! Each bag holds one of every kind, shuffled. The queue refills lazily one bag
//! at a time, so every aligned run of 7 pops is a permutation of all kinds.
//!
//! The generator is `ChaCha8Rng` seeded from a `u64`: the same seed always
//! yields the same sequence, and [`NextQueue::restart`] rewinds to it.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tetris_engine_types::PieceKind;

/// Upper bound for [`NextQueue::peek`]: two full bags
pub const LOOKAHEAD: usize = 14;

#[derive(Debug, Clone)]
pub struct NextQueue {
    seed: u64,
    /// Fixed kinds served before the first bag (fixtures, replays)
    prefix: Vec<PieceKind>,
    rng: ChaCha8Rng,
    upcoming: VecDeque<PieceKind>,
}

impl NextQueue {
    pub fn new(seed: u64) -> Self {
        Self::with_prefix(seed, &[])
    }

    /// A queue that hands out `prefix` first and then continues with seeded bags
    pub fn with_prefix(seed: u64, prefix: &[PieceKind]) -> Self {
        let mut queue = Self {
            seed,
            prefix: prefix.to_vec(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            upcoming: VecDeque::with_capacity(LOOKAHEAD + 7),
        };
        queue.upcoming.extend(prefix.iter().copied());
        queue.fill(LOOKAHEAD);
        queue
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the state right after construction
    pub fn restart(&mut self) {
        *self = Self::with_prefix(self.seed, &self.prefix);
    }

    fn refill_bag(&mut self) {
        let mut bag = PieceKind::ALL;
        bag.shuffle(&mut self.rng);
        self.upcoming.extend(bag);
    }

    fn fill(&mut self, len: usize) {
        while self.upcoming.len() < len {
            self.refill_bag();
        }
    }

    /// Take the next kind
    pub fn pop(&mut self) -> PieceKind {
        self.fill(LOOKAHEAD + 1);
        // fill guarantees at least one element
        let kind = self.upcoming.pop_front().unwrap_or(PieceKind::I);
        self.fill(LOOKAHEAD);
        kind
    }

    /// Up to `n` upcoming kinds without consuming them (`n` is capped at [`LOOKAHEAD`])
    pub fn peek(&self, n: usize) -> impl Iterator<Item = PieceKind> + '_ {
        self.upcoming.iter().copied().take(n.min(LOOKAHEAD))
    }

    /// The next `N` kinds as an array
    pub fn preview<const N: usize>(&self) -> [PieceKind; N] {
        let mut out = [PieceKind::I; N];
        for (slot, kind) in out.iter_mut().zip(self.peek(N)) {
            *slot = kind;
        }
        out
    }
}
