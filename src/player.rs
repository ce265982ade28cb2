use serde::{Deserialize, Serialize};

use crate::{Card, Hand};

/// A seat's bankroll and the hands it holds during a round.
///
/// Every mutator returns `false` and leaves the account untouched when its
/// preconditions fail; capital never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub capital: u64,
    pub hands: Vec<Hand>,
}

impl Player {
    pub fn new(name: impl Into<String>, capital: u64) -> Self {
        Self {
            name: name.into(),
            capital,
            hands: Vec::new(),
        }
    }

    /// Debit `amount` and open a hand carrying it.
    pub fn place_bet(&mut self, amount: u64) -> bool {
        if amount == 0 || amount > self.capital {
            return false;
        }
        self.capital -= amount;
        self.hands.push(Hand::with_wager(amount));
        true
    }

    pub fn draw_into(&mut self, index: usize, card: Card) -> bool {
        match self.hands.get_mut(index) {
            Some(hand) => {
                hand.add_card(card);
                true
            }
            None => false,
        }
    }

    pub fn can_split(&self, index: usize) -> bool {
        self.hands
            .get(index)
            .is_some_and(|hand| hand.can_split() && self.capital >= hand.wager)
    }

    /// Move the second card into a new hand (appended last) with an equal
    /// wager. Both hands are left with one card.
    pub fn split(&mut self, index: usize) -> bool {
        if !self.can_split(index) {
            return false;
        }
        let hand = &mut self.hands[index];
        let wager = hand.wager;
        let Some(second_card) = hand.cards.pop() else {
            return false;
        };
        self.capital -= wager;

        let mut new_hand = Hand::with_wager(wager);
        new_hand.add_card(second_card);
        self.hands.push(new_hand);
        true
    }

    pub fn can_double(&self, index: usize) -> bool {
        self.hands
            .get(index)
            .is_some_and(|hand| hand.len() == 2 && !hand.doubled && self.capital >= hand.wager)
    }

    pub fn double(&mut self, index: usize) -> bool {
        if !self.can_double(index) {
            return false;
        }
        let hand = &mut self.hands[index];
        self.capital -= hand.wager;
        hand.wager *= 2;
        hand.doubled = true;
        true
    }

    /// Give up the hand and recover half the wager, rounded down.
    pub fn surrender(&mut self, index: usize) -> bool {
        match self.hands.get_mut(index) {
            Some(hand) if hand.len() == 2 && !hand.surrendered => {
                hand.surrendered = true;
                self.capital += hand.wager / 2;
                true
            }
            _ => false,
        }
    }

    pub fn reset_hands(&mut self) {
        self.hands.clear();
    }
}
