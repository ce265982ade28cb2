use std::fmt;

use crate::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Win,
    Loss,
    Push,
    Surrender,
    Blackjack,
}

/// Calculate the value of a blackjack hand
pub fn calculate_hand_value(cards: &[Card]) -> u8 {
    let (total, _) = value_and_soft(cards);
    total
}

/// Total plus whether an ace is still counted as 11.
fn value_and_soft(cards: &[Card]) -> (u8, bool) {
    let mut total: u16 = 0;
    let mut aces = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        total += card.value() as u16;
    }

    // Count aces as 1 one at a time
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    (total.min(u8::MAX as u16) as u8, aces > 0)
}

/// Check if a hand is soft (has an ace counted as 11).
///
/// With several aces this is looser than "every ace as 11 stays at or under
/// 21": {A, A} is soft 12 here, matching the soft flag `add_to_hand` carries.
pub fn is_soft_hand(cards: &[Card]) -> bool {
    let (_, soft) = value_and_soft(cards);
    soft
}

/// Check if a hand is busted
pub fn is_busted(cards: &[Card]) -> bool {
    calculate_hand_value(cards) > 21
}

/// Check if a hand is blackjack (21 with 2 cards)
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && calculate_hand_value(cards) == 21
}

/// Check if two cards can be split (same rank symbol)
pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card1.rank == card2.rank
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub wager: u64,
    pub doubled: bool,
    pub stood: bool,
    pub surrendered: bool,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wager(wager: u64) -> Self {
        Self {
            wager,
            ..Self::default()
        }
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn value(&self) -> u8 {
        calculate_hand_value(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft_hand(&self.cards)
    }

    pub fn is_busted(&self) -> bool {
        is_busted(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    /// No further decisions are taken on a finished hand.
    pub fn is_finished(&self) -> bool {
        self.stood || self.surrendered || self.is_busted()
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{card}")?;
        }
        write!(f, "] ({}", self.value())?;
        if self.is_soft() {
            write!(f, ", soft")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};

    fn c(rank: Rank) -> Card {
        Card::new(rank, Suit::Spades)
    }

    #[test]
    fn test_calculate_hand_value_simple() {
        let cards = vec![c(Rank::Two), c(Rank::Three)];
        assert_eq!(calculate_hand_value(&cards), 5);
    }

    #[test]
    fn test_calculate_hand_value_with_face_cards() {
        let cards = vec![c(Rank::King), c(Rank::Queen)];
        assert_eq!(calculate_hand_value(&cards), 20);
    }

    #[test]
    fn test_calculate_hand_value_soft_ace() {
        let cards = vec![c(Rank::Ace), c(Rank::Six)];
        assert_eq!(calculate_hand_value(&cards), 17);
    }

    #[test]
    fn test_calculate_hand_value_hard_ace() {
        let cards = vec![c(Rank::Ace), c(Rank::Six), c(Rank::Nine)];
        assert_eq!(calculate_hand_value(&cards), 16);
    }

    #[test]
    fn test_two_aces_and_nine() {
        let cards = vec![c(Rank::Ace), c(Rank::Ace), c(Rank::Nine)];
        assert_eq!(calculate_hand_value(&cards), 21);
        assert!(is_soft_hand(&cards));
    }

    #[test]
    fn test_ace_ace_nine_demotes_to_eleven_after_ten() {
        // {A, A, 9} counts one ace high; a further ten demotes it
        let cards = vec![c(Rank::Ace), c(Rank::Ace), c(Rank::Nine), c(Rank::Ten)];
        assert_eq!(calculate_hand_value(&cards), 21);
        assert!(!is_soft_hand(&cards));
    }

    #[test]
    fn test_total_never_busts_while_an_ace_can_be_demoted() {
        let ranks = [Rank::Ace, Rank::Five, Rank::Ace, Rank::Ace, Rank::Nine, Rank::Two];
        let mut cards = Vec::new();
        for rank in ranks {
            cards.push(c(rank));
            let hard: u16 = cards
                .iter()
                .map(|card| if card.is_ace() { 1 } else { card.value() as u16 })
                .sum();
            if hard <= 21 {
                assert!(calculate_hand_value(&cards) <= 21);
            }
        }
    }

    #[test]
    fn test_is_busted() {
        let cards = vec![c(Rank::King), c(Rank::Queen), c(Rank::Five)];
        assert!(is_busted(&cards));
    }

    #[test]
    fn test_is_blackjack() {
        assert!(is_blackjack(&[c(Rank::Ace), c(Rank::King)]));
        assert!(!is_blackjack(&[c(Rank::Seven), c(Rank::Seven), c(Rank::Seven)]));
        assert!(!is_blackjack(&[c(Rank::King), c(Rank::Queen)]));
    }

    #[test]
    fn test_soft_hands() {
        assert!(is_soft_hand(&[c(Rank::Ace), c(Rank::Six)]));
        assert!(is_soft_hand(&[c(Rank::Ace), c(Rank::Ace)]));
        assert!(is_soft_hand(&[c(Rank::Ace), c(Rank::Five), c(Rank::Ace)]));
        assert!(!is_soft_hand(&[c(Rank::Ace), c(Rank::Six), c(Rank::Nine)]));
        assert!(!is_soft_hand(&[c(Rank::King), c(Rank::Queen)]));
    }

    #[test]
    fn test_soft_flag_agrees_with_add_to_hand() {
        use crate::mdp::add_to_hand;

        let ranks = [Rank::Ace, Rank::Ace, Rank::Ace, Rank::Five, Rank::Ace, Rank::Two];
        let (mut total, mut soft) = (0, false);
        for n in 1..=ranks.len() {
            let card = c(ranks[n - 1]);
            (total, soft) = add_to_hand(total, soft, card.bucket());
            let cards: Vec<Card> = ranks[..n].iter().map(|&r| c(r)).collect();
            assert_eq!(calculate_hand_value(&cards), total);
            assert_eq!(is_soft_hand(&cards), soft);
        }
    }

    #[test]
    fn test_can_split_cards_by_rank_symbol() {
        assert!(can_split_cards(&c(Rank::Eight), &Card::new(Rank::Eight, Suit::Hearts)));
        assert!(!can_split_cards(&c(Rank::Eight), &c(Rank::Nine)));
        assert!(!can_split_cards(&c(Rank::King), &c(Rank::Queen)));
    }

    #[test]
    fn test_hand_finishes_on_bust() {
        let mut hand = Hand::with_wager(10);
        hand.add_card(c(Rank::King));
        hand.add_card(c(Rank::Six));
        assert!(!hand.is_finished());
        hand.add_card(c(Rank::Nine));
        assert!(hand.is_finished());
    }

    #[test]
    fn test_hand_struct_can_split() {
        let mut hand = Hand::from_cards([c(Rank::Eight), c(Rank::Eight)]);
        assert!(hand.can_split());
        hand.add_card(c(Rank::Two));
        assert!(!hand.can_split());
    }

    #[test]
    fn test_display() {
        let hand = Hand::from_cards([c(Rank::Ace), c(Rank::Six)]);
        assert_eq!(hand.to_string(), "[A♠, 6♠] (17, soft)");
    }
}
