use std::collections::VecDeque;

use crate::{Action, Card, Hand, Strategy};

/// Replays a fixed script of bets and actions. Once a script runs out the
/// agent bets nothing and stands.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    name: String,
    bets: VecDeque<u64>,
    actions: VecDeque<Action>,
    observed: Vec<Card>,
    resets: usize,
}

impl ScriptedAgent {
    pub fn new(
        name: impl Into<String>,
        bets: impl IntoIterator<Item = u64>,
        actions: impl IntoIterator<Item = Action>,
    ) -> Self {
        Self {
            name: name.into(),
            bets: bets.into_iter().collect(),
            actions: actions.into_iter().collect(),
            observed: Vec::new(),
            resets: 0,
        }
    }

    /// Cards seen since the last reset, in order.
    pub fn observed(&self) -> &[Card] {
        &self.observed
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn remaining_actions(&self) -> usize {
        self.actions.len()
    }
}

impl Strategy for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide_bet(&mut self, _capital: u64) -> u64 {
        self.bets.pop_front().unwrap_or(0)
    }

    fn decide_action(&mut self, _hand: &Hand, _dealer_upcard: Card) -> Action {
        self.actions.pop_front().unwrap_or(Action::Stand)
    }

    fn observe_card(&mut self, card: Card) {
        self.observed.push(card);
    }

    fn reset_count(&mut self) {
        self.observed.clear();
        self.resets += 1;
    }
}
