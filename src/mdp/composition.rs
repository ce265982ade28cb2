use serde::{Deserialize, Serialize};

use crate::Card;

/// Number of rank groups tracked: Ace, 2..9, ten-valued.
pub const BUCKETS: usize = 10;

/// Largest bucket precision; digest shares are stored as `u16`.
pub const MAX_PRECISION: u32 = u16::MAX as u32;

/// Remaining cards by value index.
/// Index 0=Ace, 1=Two, 2=Three, ..., 8=Nine, 9=Ten/J/Q/K.
/// Single deck: [4,4,4,4,4,4,4,4,4,16].
///
/// A `Composition` is a plain value. Recursive search branches with
/// [`Composition::without`], which returns a decremented copy and leaves
/// the parent untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Composition {
    counts: [u16; BUCKETS],
}

/// How a composition is reduced to a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositionKeying {
    /// Full remaining-count vector
    Exact,
    /// Share of {Ace, 2-6, 7-9, ten-valued}, each floored to `1/precision`.
    /// `precision` lies in `1..=MAX_PRECISION`.
    Bucketed { precision: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositionKey {
    Exact([u16; BUCKETS]),
    Bucketed([u16; 4]),
}

impl Composition {
    pub fn full(num_decks: u8) -> Self {
        let n = num_decks as u16;
        let mut counts = [4 * n; BUCKETS];
        counts[9] = 16 * n;
        Self { counts }
    }

    pub const fn from_counts(counts: [u16; BUCKETS]) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u16; BUCKETS] {
        &self.counts
    }

    pub fn count(&self, bucket: usize) -> u16 {
        self.counts[bucket]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Copy with one card of `bucket` removed.
    pub fn without(&self, bucket: usize) -> Self {
        let mut next = *self;
        debug_assert!(next.counts[bucket] > 0);
        next.counts[bucket] = next.counts[bucket].saturating_sub(1);
        next
    }

    /// Remove an observed card in place. A bucket already at zero is left
    /// alone and `false` returned.
    pub fn remove(&mut self, card: Card) -> bool {
        let slot = &mut self.counts[card.bucket()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Every drawable bucket with its probability and the composition left
    /// after drawing it.
    pub fn draws(&self) -> impl Iterator<Item = (usize, f64, Composition)> + '_ {
        let total = self.total() as f64;
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(move |(bucket, &count)| (bucket, count as f64 / total, self.without(bucket)))
    }

    /// Discretized share of aces, lows (2-6), mids (7-9) and tens.
    pub fn digest(&self, precision: u32) -> [u16; 4] {
        let total = self.total();
        if total == 0 {
            return [0; 4];
        }
        let total = total as u64;
        let precision = precision.min(MAX_PRECISION) as u64;
        let aces = self.counts[0] as u64;
        let lows: u64 = self.counts[1..6].iter().map(|&c| c as u64).sum();
        let mids: u64 = self.counts[6..9].iter().map(|&c| c as u64).sum();
        let tens = self.counts[9] as u64;
        // group <= total, so each share stays within precision
        [aces, lows, mids, tens].map(|group| ((group * precision) / total) as u16)
    }

    pub fn key(&self, keying: CompositionKeying) -> CompositionKey {
        match keying {
            CompositionKeying::Exact => CompositionKey::Exact(self.counts),
            CompositionKeying::Bucketed { precision } => {
                CompositionKey::Bucketed(self.digest(precision))
            }
        }
    }
}

/// Blackjack value for a card at the given value index.
/// Ace returns 1 (callers promote to 11 via `add_to_hand`).
pub fn bucket_value(bucket: usize) -> u8 {
    if bucket == 0 {
        1
    } else {
        (bucket + 1) as u8
    }
}

/// Add a card to a (total, soft) hand summary, returning the new summary.
pub fn add_to_hand(total: u8, is_soft: bool, bucket: usize) -> (u8, bool) {
    let card = bucket_value(bucket);
    let (value, soft) = if card == 1 && total + 11 <= 21 {
        (total + 11, true)
    } else {
        (total + card, is_soft)
    };
    if value > 21 && soft {
        (value - 10, false)
    } else {
        (value, soft)
    }
}
