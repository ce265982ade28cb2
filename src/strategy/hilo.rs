use log::debug;

use crate::{basic_move, Action, BetSizing, Card, Hand, Strategy};

/// Hi-Lo tag: 2-6 count +1, tens and aces -1, 7-9 neutral.
pub fn hilo_tag(card: Card) -> i32 {
    match card.value() {
        2..=6 => 1,
        10 | 11 => -1,
        _ => 0,
    }
}

/// Hard-total index plays: (player total, dealer upcard value, minimum
/// running count, play).
const DEVIATIONS: [(u8, u8, i32, Action); 18] = [
    (16, 10, 0, Action::Stand),
    (15, 10, 4, Action::Stand),
    (10, 10, 4, Action::Double),
    (12, 3, 2, Action::Stand),
    (12, 2, 3, Action::Stand),
    (11, 11, 1, Action::Double),
    (9, 2, 1, Action::Double),
    (10, 11, 4, Action::Double),
    (9, 7, 3, Action::Double),
    (16, 9, 5, Action::Stand),
    (13, 2, -1, Action::Stand),
    (12, 4, 0, Action::Stand),
    (12, 5, -2, Action::Stand),
    (12, 6, -1, Action::Stand),
    (13, 3, -2, Action::Stand),
    (14, 10, 3, Action::Stand),
    (15, 9, 2, Action::Stand),
    (15, 11, 1, Action::Stand),
];

/// Card counter: basic strategy with count-driven deviations, and bets
/// that grow with the running count.
#[derive(Debug, Clone)]
pub struct HiLoAgent {
    name: String,
    sizing: BetSizing,
    running_count: i32,
}

impl HiLoAgent {
    pub fn new(name: impl Into<String>, sizing: BetSizing) -> Self {
        Self {
            name: name.into(),
            sizing,
            running_count: 0,
        }
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    fn deviation(&self, hand: &Hand, dealer_value: u8) -> Option<Action> {
        if hand.is_soft() {
            return None;
        }
        let total = hand.value();
        DEVIATIONS
            .iter()
            .find(|&&(t, d, min_count, play)| {
                t == total
                    && d == dealer_value
                    && self.running_count >= min_count
                    && (play != Action::Double || hand.len() == 2)
            })
            .map(|&(_, _, _, play)| play)
    }
}

impl Strategy for HiLoAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide_bet(&mut self, capital: u64) -> u64 {
        let multiplier = if self.running_count > 1 {
            self.running_count as u64
        } else {
            1
        };
        self.sizing.bet(capital, multiplier)
    }

    fn decide_action(&mut self, hand: &Hand, dealer_upcard: Card) -> Action {
        if let Some(play) = self.deviation(hand, dealer_upcard.value()) {
            debug!(
                "{}: count {} deviation {} on {} vs {}",
                self.name, self.running_count, play, hand, dealer_upcard
            );
            return play;
        }
        basic_move(hand, dealer_upcard)
    }

    fn observe_card(&mut self, card: Card) {
        self.running_count += hilo_tag(card);
    }

    fn reset_count(&mut self) {
        self.running_count = 0;
    }
}
