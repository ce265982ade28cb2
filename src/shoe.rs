use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Card, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoeKind {
    /// Shuffled multi-deck shoe with a randomized cut card
    Shuffled,
    /// Fixed order, never asks for a reshuffle
    Stacked,
}

/// Multi-deck card source.
///
/// The cut card position (`reshuffle_threshold`) is drawn once per shoe,
/// uniformly between 60% and 100% of the cards left unplayed by the
/// configured penetration. A new shoe is the only way to move it.
#[derive(Debug, Clone)]
pub struct Shoe {
    /// Undealt cards, next card last.
    cards: Vec<Card>,
    reshuffle_threshold: usize,
    kind: ShoeKind,
}

impl Shoe {
    pub fn new<R: Rng + ?Sized>(
        num_decks: u8,
        penetration: f64,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        if num_decks < 1 {
            return Err(SimError::InvalidDeckCount(num_decks));
        }
        if !(penetration > 0.0 && penetration <= 1.0) {
            return Err(SimError::InvalidPenetration(penetration));
        }

        let mut cards: Vec<Card> = (0..num_decks).flat_map(|_| Card::deck()).collect();
        cards.shuffle(rng);

        let unplayed = unplayed(num_decks, penetration);
        let lower = Self::lowest_threshold(num_decks, penetration);
        let reshuffle_threshold = rng.gen_range(lower..=unplayed);

        Ok(Self {
            cards,
            reshuffle_threshold,
            kind: ShoeKind::Shuffled,
        })
    }

    /// Smallest cut card position a shuffled shoe with these settings can
    /// draw. Every round starts with at least this many cards left.
    pub fn lowest_threshold(num_decks: u8, penetration: f64) -> usize {
        (unplayed(num_decks, penetration) as f64 * 0.6) as usize
    }

    /// Shoe that deals `cards` in the given order.
    pub fn stacked(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self {
            cards,
            reshuffle_threshold: 0,
            kind: ShoeKind::Stacked,
        }
    }

    pub fn draw(&mut self) -> Result<Card, SimError> {
        self.cards.pop().ok_or(SimError::EmptyShoe)
    }

    pub fn needs_reshuffle(&self) -> bool {
        match self.kind {
            ShoeKind::Shuffled => self.cards.len() <= self.reshuffle_threshold,
            ShoeKind::Stacked => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn reshuffle_threshold(&self) -> usize {
        self.reshuffle_threshold
    }

    pub fn kind(&self) -> ShoeKind {
        self.kind
    }
}

fn unplayed(num_decks: u8, penetration: f64) -> usize {
    ((num_decks as usize * 52) as f64 * (1.0 - penetration)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    #[test]
    fn test_shuffled_shoe_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let shoe = Shoe::new(4, 0.75, &mut rng).unwrap();
        assert_eq!(shoe.remaining(), 208);
        assert_eq!(shoe.kind(), ShoeKind::Shuffled);
    }

    #[test]
    fn test_threshold_within_unplayed_window() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let shoe = Shoe::new(4, 0.75, &mut rng).unwrap();
            // 208 * 0.25 = 52 unplayed, window [31, 52]
            assert!(shoe.reshuffle_threshold() >= 31);
            assert!(shoe.reshuffle_threshold() <= 52);
        }
    }

    #[test]
    fn test_lowest_threshold() {
        assert_eq!(Shoe::lowest_threshold(4, 0.75), 31);
        assert_eq!(Shoe::lowest_threshold(1, 0.5), 15);
        assert_eq!(Shoe::lowest_threshold(6, 0.75), 46);
        assert_eq!(Shoe::lowest_threshold(2, 1.0), 0);
    }

    #[test]
    fn test_full_penetration_threshold_is_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let shoe = Shoe::new(1, 1.0, &mut rng).unwrap();
        assert_eq!(shoe.reshuffle_threshold(), 0);
    }

    #[test]
    fn test_needs_reshuffle_at_threshold() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut shoe = Shoe::new(1, 0.5, &mut rng).unwrap();
        let threshold = shoe.reshuffle_threshold();
        while shoe.remaining() > threshold {
            assert!(!shoe.needs_reshuffle());
            shoe.draw().unwrap();
        }
        assert!(shoe.needs_reshuffle());
    }

    #[test]
    fn test_shuffled_shoe_composition() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut shoe = Shoe::new(2, 0.75, &mut rng).unwrap();
        let mut counts = [0u16; 10];
        while let Ok(card) = shoe.draw() {
            counts[card.bucket()] += 1;
        }
        assert_eq!(counts, [8, 8, 8, 8, 8, 8, 8, 8, 8, 32]);
    }

    #[test]
    fn test_invalid_configuration() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            Shoe::new(0, 0.75, &mut rng).unwrap_err(),
            SimError::InvalidDeckCount(0)
        );
        assert!(matches!(
            Shoe::new(1, 0.0, &mut rng),
            Err(SimError::InvalidPenetration(_))
        ));
        assert!(matches!(
            Shoe::new(1, 1.5, &mut rng),
            Err(SimError::InvalidPenetration(_))
        ));
    }

    #[test]
    fn test_stacked_shoe_deals_in_order() {
        let cards = vec![
            Card::new(Rank::Five, Suit::Spades),
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Ace, Suit::Clubs),
        ];
        let mut shoe = Shoe::stacked(cards.clone());
        for expected in cards {
            assert!(!shoe.needs_reshuffle());
            assert_eq!(shoe.draw().unwrap(), expected);
        }
        assert!(!shoe.needs_reshuffle());
    }

    #[test]
    fn test_empty_shoe_is_an_error() {
        let mut shoe = Shoe::stacked(vec![Card::new(Rank::Two, Suit::Clubs)]);
        assert!(shoe.draw().is_ok());
        assert_eq!(shoe.draw(), Err(SimError::EmptyShoe));
    }
}
