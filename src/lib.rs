mod card;
mod error;
mod hand;
mod player;
mod rules;
mod shoe;
mod strategy;
pub mod casino;
pub mod mdp;

pub use card::{Card, Rank, Suit};
pub use error::SimError;
pub use hand::{
    calculate_hand_value, can_split_cards, is_blackjack, is_busted, is_soft_hand, Hand,
    HandOutcome,
};
pub use player::Player;
pub use rules::{PayoutRatio, TableRules};
pub use shoe::{Shoe, ShoeKind};
pub use strategy::{
    basic_move, hilo_tag, Action, BasicStrategy, BetSizing, HiLoAgent, RandomAgent,
    ScriptedAgent, Strategy,
};

pub use casino::{
    settle_hand, Casino, DecisionRecord, HandResult, RoundReport, Seat, SeatResult,
    SeatSummary, SessionSummary,
};
pub use mdp::{
    ActionValues, Composition, CompositionKeying, DealerDistribution, MdpAgent, MdpConfig,
    OutcomeProbs, RefreshPolicy, Rewards,
};
