use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Card, Hand};

mod basic;
mod hilo;
mod random;
mod scripted;

pub use basic::{basic_move, BasicStrategy};
pub use hilo::{hilo_tag, HiLoAgent};
pub use random::RandomAgent;
pub use scripted::ScriptedAgent;

/// Everything a seat can do with a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
    Surrender,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Stand,
        Action::Hit,
        Action::Double,
        Action::Split,
        Action::Surrender,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Stand => "stand",
            Action::Hit => "hit",
            Action::Double => "double",
            Action::Split => "split",
            Action::Surrender => "surrender",
        };
        f.write_str(name)
    }
}

/// Contract between the round engine and an agent.
///
/// The engine only ever asks for a bet, asks for an action on one of the
/// agent's hands, and tells every agent about every card as it becomes
/// visible. `reset_count` is called when the shoe is replaced.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Amount to wager this round given the current capital. Zero (or
    /// anything the account cannot cover) sits the round out.
    fn decide_bet(&mut self, capital: u64) -> u64;

    fn decide_action(&mut self, hand: &Hand, dealer_upcard: Card) -> Action;

    fn observe_card(&mut self, _card: Card) {}

    fn reset_count(&mut self) {}
}

/// Bet sizing shared by the table agents: a base unit scaled by a
/// multiplier and clamped to `[min, max(min, capital * max_fraction)]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetSizing {
    pub base: u64,
    pub min: u64,
    pub max_fraction: f64,
}

impl Default for BetSizing {
    fn default() -> Self {
        Self {
            base: 5,
            min: 1,
            max_fraction: 0.1,
        }
    }
}

impl BetSizing {
    pub fn flat(base: u64) -> Self {
        Self {
            base,
            min: base,
            max_fraction: 1.0,
        }
    }

    pub fn bet(&self, capital: u64, multiplier: u64) -> u64 {
        if capital < self.min || capital == 0 {
            return 0;
        }
        let max_bet = self.min.max((capital as f64 * self.max_fraction) as u64);
        self.base
            .saturating_mul(multiplier.max(1))
            .clamp(self.min, max_bet)
    }
}
