use serde::{Deserialize, Serialize};

use crate::SimError;

/// Blackjack payout multiplier as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    pub const SIX_TO_FIVE: Self = Self {
        numerator: 6,
        denominator: 5,
    };
    pub const ONE_TO_ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, SimError> {
        if denominator == 0 {
            return Err(SimError::InvalidPayout);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Profit on a winning blackjack, rounded down.
    pub fn calculate_payout(&self, bet: u64) -> u64 {
        (bet * self.numerator as u64) / self.denominator as u64
    }
}

/// Table configuration for the round engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRules {
    /// Number of 52-card decks in the shoe
    pub num_decks: u8,

    /// Fraction of the shoe dealt before the cut card, in (0, 1]
    pub penetration: f64,

    /// Dealer draws on soft 17
    pub dealer_hits_soft_17: bool,

    /// Blackjack payout multiplier (commonly 3:2 or 6:5)
    pub blackjack_payout: PayoutRatio,

    /// Decisions a single hand may receive before it is stood
    pub max_hand_decisions: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            num_decks: 4,
            penetration: 0.75,
            dealer_hits_soft_17: false,
            blackjack_payout: PayoutRatio::THREE_TO_TWO,
            max_hand_decisions: 21,
        }
    }
}

impl TableRules {
    /// Single deck dealt deep, 6:5 blackjack
    pub fn single_deck() -> Self {
        Self {
            num_decks: 1,
            penetration: 0.5,
            blackjack_payout: PayoutRatio::SIX_TO_FIVE,
            ..Self::default()
        }
    }

    /// Six-deck shoe, dealer hits soft 17
    pub fn six_deck_h17() -> Self {
        Self {
            num_decks: 6,
            dealer_hits_soft_17: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_decks < 1 {
            return Err(SimError::InvalidDeckCount(self.num_decks));
        }
        if !(self.penetration > 0.0 && self.penetration <= 1.0) {
            return Err(SimError::InvalidPenetration(self.penetration));
        }
        if self.blackjack_payout.denominator == 0 {
            return Err(SimError::InvalidPayout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_ratio_three_to_two() {
        let ratio = PayoutRatio::THREE_TO_TWO;
        assert_eq!(ratio.calculate_payout(100), 150);
        assert_eq!(ratio.calculate_payout(10), 15);
        assert_eq!(ratio.calculate_payout(5), 7);
    }

    #[test]
    fn test_payout_ratio_six_to_five() {
        let ratio = PayoutRatio::SIX_TO_FIVE;
        assert_eq!(ratio.calculate_payout(100), 120);
        assert_eq!(ratio.calculate_payout(50), 60);
    }

    #[test]
    fn test_payout_ratio_zero_denominator() {
        assert_eq!(PayoutRatio::new(3, 0), Err(SimError::InvalidPayout));
        assert_eq!(PayoutRatio::new(2, 1).unwrap().calculate_payout(40), 80);
    }

    #[test]
    fn test_default_rules_validate() {
        assert!(TableRules::default().validate().is_ok());
        assert!(TableRules::single_deck().validate().is_ok());
        assert!(TableRules::six_deck_h17().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_decks() {
        let rules = TableRules {
            num_decks: 0,
            ..TableRules::default()
        };
        assert_eq!(rules.validate(), Err(SimError::InvalidDeckCount(0)));
    }

    #[test]
    fn test_rejects_penetration_out_of_range() {
        for penetration in [0.0, -0.2, 1.01, f64::NAN] {
            let rules = TableRules {
                penetration,
                ..TableRules::default()
            };
            assert!(matches!(
                rules.validate(),
                Err(SimError::InvalidPenetration(_))
            ));
        }
        let full = TableRules {
            penetration: 1.0,
            ..TableRules::default()
        };
        assert!(full.validate().is_ok());
    }
}
