use crate::{Action, BetSizing, Card, Hand, Rank, Strategy};

/// Composition-independent basic strategy for a dealer standing on soft 17.
pub fn basic_move(hand: &Hand, dealer_up_card: Card) -> Action {
    let player_value = hand.value();
    let dealer_value = dealer_up_card.value();
    let is_soft = hand.is_soft();
    let two_cards = hand.len() == 2;

    // Surrender before split/double
    if two_cards && !is_soft {
        if player_value == 16 && (dealer_value == 9 || dealer_value == 10 || dealer_value == 11) {
            return Action::Surrender;
        }
        if player_value == 15 && dealer_value == 10 {
            return Action::Surrender;
        }
    }

    if hand.can_split() {
        match hand.cards[0].rank {
            // Always split Aces and 8s
            Rank::Ace | Rank::Eight => return Action::Split,
            // Split 9s except against 7, 10, or Ace
            Rank::Nine => {
                if dealer_value != 7 && dealer_value != 10 && dealer_value != 11 {
                    return Action::Split;
                }
            }
            Rank::Seven | Rank::Six | Rank::Three | Rank::Two => {
                if (2..=7).contains(&dealer_value) {
                    return Action::Split;
                }
            }
            // Never split 10s, 5s, 4s
            _ => {}
        }
    }

    if two_cards {
        if is_soft {
            let double = match player_value {
                19 => dealer_value == 6,
                18 => (2..=6).contains(&dealer_value),
                17 => (3..=6).contains(&dealer_value),
                15 | 16 => (4..=6).contains(&dealer_value),
                13 | 14 => (5..=6).contains(&dealer_value),
                _ => false,
            };
            if double {
                return Action::Double;
            }
        } else {
            let double = match player_value {
                11 => true,
                10 => dealer_value <= 9,
                9 => (3..=6).contains(&dealer_value),
                _ => false,
            };
            if double {
                return Action::Double;
            }
        }
    }

    if is_soft {
        if player_value >= 19 {
            Action::Stand
        } else if player_value == 18 {
            if dealer_value >= 9 {
                Action::Hit
            } else {
                Action::Stand
            }
        } else {
            Action::Hit
        }
    } else if player_value >= 17 {
        Action::Stand
    } else if (13..=16).contains(&player_value) {
        if (2..=6).contains(&dealer_value) {
            Action::Stand
        } else {
            Action::Hit
        }
    } else if player_value == 12 {
        if (4..=6).contains(&dealer_value) {
            Action::Stand
        } else {
            Action::Hit
        }
    } else {
        Action::Hit
    }
}

/// Plays the chart, never counts.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    name: String,
    sizing: BetSizing,
}

impl BasicStrategy {
    pub fn new(name: impl Into<String>, sizing: BetSizing) -> Self {
        Self {
            name: name.into(),
            sizing,
        }
    }
}

impl Strategy for BasicStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide_bet(&mut self, capital: u64) -> u64 {
        self.sizing.bet(capital, 1)
    }

    fn decide_action(&mut self, hand: &Hand, dealer_upcard: Card) -> Action {
        basic_move(hand, dealer_upcard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Suit;

    fn hand(ranks: &[Rank]) -> Hand {
        Hand::from_cards(ranks.iter().map(|&r| Card::new(r, Suit::Clubs)))
    }

    fn up(rank: Rank) -> Card {
        Card::new(rank, Suit::Diamonds)
    }

    #[test]
    fn test_always_split_aces_and_eights() {
        assert_eq!(basic_move(&hand(&[Rank::Ace, Rank::Ace]), up(Rank::Ten)), Action::Split);
        assert_eq!(basic_move(&hand(&[Rank::Eight, Rank::Eight]), up(Rank::Six)), Action::Split);
    }

    #[test]
    fn test_never_split_tens() {
        assert_eq!(basic_move(&hand(&[Rank::Ten, Rank::Ten]), up(Rank::Six)), Action::Stand);
    }

    #[test]
    fn test_double_eleven() {
        assert_eq!(basic_move(&hand(&[Rank::Six, Rank::Five]), up(Rank::Ten)), Action::Double);
    }

    #[test]
    fn test_surrender_sixteen_against_ten() {
        assert_eq!(basic_move(&hand(&[Rank::Ten, Rank::Six]), up(Rank::King)), Action::Surrender);
        // three-card sixteen can no longer surrender
        assert_eq!(
            basic_move(&hand(&[Rank::Ten, Rank::Four, Rank::Two]), up(Rank::King)),
            Action::Hit
        );
    }

    #[test]
    fn test_hard_totals() {
        assert_eq!(basic_move(&hand(&[Rank::Ten, Rank::Two]), up(Rank::Four)), Action::Stand);
        assert_eq!(basic_move(&hand(&[Rank::Ten, Rank::Two]), up(Rank::Two)), Action::Hit);
        assert_eq!(basic_move(&hand(&[Rank::Ten, Rank::Seven]), up(Rank::Ace)), Action::Stand);
    }

    #[test]
    fn test_soft_totals() {
        assert_eq!(basic_move(&hand(&[Rank::Ace, Rank::Seven]), up(Rank::Nine)), Action::Hit);
        assert_eq!(
            basic_move(&hand(&[Rank::Ace, Rank::Four, Rank::Three]), up(Rank::Seven)),
            Action::Stand
        );
        assert_eq!(basic_move(&hand(&[Rank::Ace, Rank::Six]), up(Rank::Four)), Action::Double);
    }

    #[test]
    fn test_bets_base_unit() {
        let mut agent = BasicStrategy::new("basic", BetSizing::default());
        assert_eq!(agent.decide_bet(1000), 5);
        assert_eq!(agent.decide_bet(0), 0);
    }
}
