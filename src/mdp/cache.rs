use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use super::composition::CompositionKey;
use super::{DealerDistribution, OutcomeProbs};

/// Memo table that counts its own hits and misses.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K: Hash + Eq, V: Copy> Memo<K, V> {
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(&value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Drops entries; counters survive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DealerKey {
    pub total: u8,
    pub soft: bool,
    pub composition: CompositionKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutcomeKey {
    pub player_total: u8,
    pub upcard: u8,
    pub composition: CompositionKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub total: u8,
    pub soft: bool,
    pub cards: u8,
    pub upcard: u8,
    pub composition: CompositionKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub dealer: MemoStats,
    pub outcome: MemoStats,
    pub state: MemoStats,
}

/// The three memo levels of the solver, owned by one agent.
#[derive(Debug, Clone, Default)]
pub struct SolverCaches {
    pub dealer: Memo<DealerKey, DealerDistribution>,
    pub outcome: Memo<OutcomeKey, OutcomeProbs>,
    pub state: Memo<StateKey, f64>,
}

impl SolverCaches {
    /// Every level is keyed by composition, so a new shoe invalidates all.
    pub fn clear_on_reshuffle(&mut self) {
        self.dealer.clear();
        self.outcome.clear();
        self.state.clear();
    }

    /// Dealer distributions do not depend on rewards.
    pub fn clear_reward_dependent(&mut self) {
        self.outcome.clear();
        self.state.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            dealer: self.dealer.stats(),
            outcome: self.outcome.stats(),
            state: self.state.stats(),
        }
    }
}
