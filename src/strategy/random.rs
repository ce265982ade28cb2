use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use crate::{Action, Card, Hand, Strategy};

/// Uniformly random play, bets between `min_bet` and 10% of capital.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    name: String,
    min_bet: u64,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>, min_bet: u64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            name: name.into(),
            min_bet: min_bet.max(1),
            rng,
        }
    }
}

impl Strategy for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide_bet(&mut self, capital: u64) -> u64 {
        if capital < self.min_bet {
            return 0;
        }
        let max_bet = capital / 10;
        if max_bet <= self.min_bet {
            return self.min_bet;
        }
        self.rng.gen_range(self.min_bet..=max_bet)
    }

    fn decide_action(&mut self, _hand: &Hand, _dealer_upcard: Card) -> Action {
        *Action::ALL.choose(&mut self.rng).unwrap_or(&Action::Stand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};

    #[test]
    fn test_bet_range() {
        let mut agent = RandomAgent::new("random", 5, Some(42));
        for _ in 0..100 {
            let bet = agent.decide_bet(1000);
            assert!((5..=100).contains(&bet));
        }
        assert_eq!(agent.decide_bet(30), 5);
        assert_eq!(agent.decide_bet(4), 0);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let hand = Hand::from_cards([
            Card::new(Rank::Ten, Suit::Clubs),
            Card::new(Rank::Six, Suit::Hearts),
        ]);
        let upcard = Card::new(Rank::Nine, Suit::Spades);
        let mut a = RandomAgent::new("a", 5, Some(9));
        let mut b = RandomAgent::new("b", 5, Some(9));
        for _ in 0..20 {
            assert_eq!(a.decide_action(&hand, upcard), b.decide_action(&hand, upcard));
        }
    }
}
