use log::debug;
use serde::{Deserialize, Serialize};

use crate::{hilo_tag, Action, BetSizing, Card, Hand, SimError, Strategy};

mod cache;
mod composition;

pub use cache::{CacheStats, DealerKey, Memo, MemoStats, OutcomeKey, SolverCaches, StateKey};
pub use composition::{
    add_to_hand, bucket_value, Composition, CompositionKey, CompositionKeying, BUCKETS,
    MAX_PRECISION,
};

/// Reward for each way a hand can end. Wins are split by cause so the
/// solver can be shaped to prefer outscoring the dealer over waiting for
/// a dealer bust, or the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub win_score: f64,
    pub win_dealer_bust: f64,
    pub tie: f64,
    pub loss: f64,
    pub player_bust: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            win_score: 1.0,
            win_dealer_bust: 1.0,
            tie: 0.0,
            loss: -1.0,
            player_bust: -1.0,
        }
    }
}

/// When the model composition used for EV catches up with observed cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshPolicy {
    EveryCard,
    /// Only when some bucket falls to half its starting count, or to zero.
    Thresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MdpConfig {
    pub num_decks: u8,
    pub rewards: Rewards,
    pub keying: CompositionKeying,
    pub refresh: RefreshPolicy,
    /// Weight of the Hi-Lo true count blended into decision EVs. Zero
    /// disables blending.
    pub risk_scale: f64,
    pub dealer_hits_soft_17: bool,
    pub bet: BetSizing,
}

impl Default for MdpConfig {
    fn default() -> Self {
        Self {
            num_decks: 4,
            rewards: Rewards::default(),
            keying: CompositionKeying::Exact,
            refresh: RefreshPolicy::EveryCard,
            risk_scale: 0.0,
            dealer_hits_soft_17: false,
            bet: BetSizing::flat(5),
        }
    }
}

impl MdpConfig {
    pub fn exact(num_decks: u8) -> Self {
        Self {
            num_decks,
            ..Self::default()
        }
    }

    pub fn bucketed(num_decks: u8, precision: u32) -> Self {
        Self {
            num_decks,
            keying: CompositionKeying::Bucketed { precision },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_decks == 0 {
            return Err(SimError::InvalidDeckCount(self.num_decks));
        }
        if let CompositionKeying::Bucketed { precision } = self.keying {
            if precision == 0 || precision > MAX_PRECISION {
                return Err(SimError::InvalidPrecision(precision));
            }
        }
        Ok(())
    }
}

/// Probability of each dealer final total (index = total, 0..=21) plus
/// probability of a dealer bust.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DealerDistribution {
    totals: [f64; 22],
    bust: f64,
}

impl DealerDistribution {
    pub fn standing_at(total: u8) -> Self {
        let mut dist = Self::default();
        dist.totals[total as usize] = 1.0;
        dist
    }

    pub fn busted() -> Self {
        Self {
            bust: 1.0,
            ..Self::default()
        }
    }

    pub fn final_total(&self, total: u8) -> f64 {
        self.totals.get(total as usize).copied().unwrap_or(0.0)
    }

    pub fn bust(&self) -> f64 {
        self.bust
    }

    pub fn sum(&self) -> f64 {
        self.totals.iter().sum::<f64>() + self.bust
    }

    fn accumulate(&mut self, weight: f64, other: &DealerDistribution) {
        for (mine, theirs) in self.totals.iter_mut().zip(other.totals.iter()) {
            *mine += weight * theirs;
        }
        self.bust += weight * other.bust;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OutcomeProbs {
    pub win_score: f64,
    pub win_dealer_bust: f64,
    pub lose: f64,
    pub tie: f64,
}

impl OutcomeProbs {
    pub const BUSTED: OutcomeProbs = OutcomeProbs {
        win_score: 0.0,
        win_dealer_bust: 0.0,
        lose: 1.0,
        tie: 0.0,
    };

    pub fn win(&self) -> f64 {
        self.win_score + self.win_dealer_bust
    }

    pub fn expected(&self, rewards: &Rewards) -> f64 {
        self.win_score * rewards.win_score
            + self.win_dealer_bust * rewards.win_dealer_bust
            + self.lose * rewards.loss
            + self.tie * rewards.tie
    }
}

/// EV of every candidate action at one decision. `None` marks an action
/// that is not legal for the hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionValues {
    pub stand: f64,
    pub hit: f64,
    pub double: Option<f64>,
    pub split: Option<f64>,
    pub surrender: Option<f64>,
}

impl ActionValues {
    /// Highest EV, ties going to the earlier of Stand, Hit, Double, Split.
    /// Surrender only wins when strictly better than all of them.
    pub fn best(&self) -> Action {
        let mut best = (Action::Stand, self.stand);
        let others = [
            (Action::Hit, Some(self.hit)),
            (Action::Double, self.double),
            (Action::Split, self.split),
        ];
        for (action, value) in others {
            if let Some(value) = value {
                if value > best.1 {
                    best = (action, value);
                }
            }
        }
        match self.surrender {
            Some(value) if value > best.1 => Action::Surrender,
            _ => best.0,
        }
    }
}

/// Composition-dependent expected-value player.
///
/// Every decision is solved from the current deck model: the dealer's
/// final-total distribution, the outcome probabilities at each player
/// total, and the optimal continuation value of each reachable state, all
/// memoized per shoe.
/// Uses split approximation (play one hand, multiply by 2).
#[derive(Debug, Clone)]
pub struct MdpAgent {
    name: String,
    config: MdpConfig,
    initial: Composition,
    /// Every card observed this shoe
    tracked: Composition,
    /// What the solver reasons over
    model: Composition,
    running_count: i32,
    caches: SolverCaches,
}

impl MdpAgent {
    pub fn new(name: impl Into<String>, config: MdpConfig) -> Result<Self, SimError> {
        config.validate()?;
        let initial = Composition::full(config.num_decks);
        Ok(Self {
            name: name.into(),
            config,
            initial,
            tracked: initial,
            model: initial,
            running_count: 0,
            caches: SolverCaches::default(),
        })
    }

    pub fn config(&self) -> &MdpConfig {
        &self.config
    }

    /// Composition the solver currently uses.
    pub fn composition(&self) -> &Composition {
        &self.model
    }

    pub fn tracked_composition(&self) -> &Composition {
        &self.tracked
    }

    pub fn rewards(&self) -> &Rewards {
        &self.config.rewards
    }

    /// Swap reward shaping without rebuilding the agent. Dealer
    /// distributions stay cached.
    pub fn set_rewards(&mut self, rewards: Rewards) {
        self.config.rewards = rewards;
        self.caches.clear_reward_dependent();
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn true_count(&self) -> f64 {
        let decks = (self.tracked.total() as f64 / 52.0).max(0.5);
        self.running_count as f64 / decks
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }

    // ── Dealer outcome probabilities ──

    fn dealer_stands(&self, total: u8, soft: bool) -> bool {
        total > 17 || (total == 17 && !(soft && self.config.dealer_hits_soft_17))
    }

    /// Distribution of the dealer's final total from a partial hand.
    pub fn simulate_dealer(
        &mut self,
        total: u8,
        soft: bool,
        composition: &Composition,
    ) -> DealerDistribution {
        if total > 21 {
            return DealerDistribution::busted();
        }
        if self.dealer_stands(total, soft) || composition.is_empty() {
            return DealerDistribution::standing_at(total);
        }

        let key = DealerKey {
            total,
            soft,
            composition: composition.key(self.config.keying),
        };
        if let Some(cached) = self.caches.dealer.get(&key) {
            return cached;
        }

        let mut dist = DealerDistribution::default();
        for (bucket, p, next) in composition.draws() {
            let (nt, ns) = add_to_hand(total, soft, bucket);
            if nt > 21 {
                dist.bust += p;
            } else {
                let sub = self.simulate_dealer(nt, ns, &next);
                dist.accumulate(p, &sub);
            }
        }

        self.caches.dealer.insert(key, dist);
        dist
    }

    /// Dealer probs starting from just the upcard; the hole card is still
    /// part of `composition`.
    pub fn dealer_from_upcard(
        &mut self,
        upcard: u8,
        composition: &Composition,
    ) -> DealerDistribution {
        let (total, soft) = if upcard == 11 { (11, true) } else { (upcard, false) };
        self.simulate_dealer(total, soft, composition)
    }

    // ── Player EV ──

    pub fn outcome_probs(
        &mut self,
        player_total: u8,
        upcard: u8,
        composition: &Composition,
    ) -> OutcomeProbs {
        if player_total > 21 {
            return OutcomeProbs::BUSTED;
        }
        let key = OutcomeKey {
            player_total,
            upcard,
            composition: composition.key(self.config.keying),
        };
        if let Some(cached) = self.caches.outcome.get(&key) {
            return cached;
        }

        let dist = self.dealer_from_upcard(upcard, composition);
        let mut probs = OutcomeProbs {
            win_dealer_bust: dist.bust(),
            ..OutcomeProbs::default()
        };
        for dealer_total in 0..=21u8 {
            let p = dist.final_total(dealer_total);
            if p == 0.0 {
                continue;
            }
            if player_total > dealer_total {
                probs.win_score += p;
            } else if player_total < dealer_total {
                probs.lose += p;
            } else {
                probs.tie += p;
            }
        }

        self.caches.outcome.insert(key, probs);
        probs
    }

    pub fn stand_ev(&mut self, player_total: u8, upcard: u8, composition: &Composition) -> f64 {
        let rewards = self.config.rewards;
        self.outcome_probs(player_total, upcard, composition)
            .expected(&rewards)
    }

    /// EV of taking one card then continuing optimally.
    pub fn hit_ev(
        &mut self,
        total: u8,
        soft: bool,
        cards: u8,
        upcard: u8,
        composition: &Composition,
    ) -> f64 {
        if composition.is_empty() {
            return self.stand_ev(total, upcard, composition);
        }
        let mut ev = 0.0;
        for (bucket, p, next) in composition.draws() {
            let (nt, ns) = add_to_hand(total, soft, bucket);
            ev += p * self.value_of_state(nt, ns, cards.saturating_add(1), upcard, &next);
        }
        ev
    }

    /// One card at double stakes, then stand.
    pub fn double_ev(
        &mut self,
        total: u8,
        soft: bool,
        upcard: u8,
        composition: &Composition,
    ) -> f64 {
        let rewards = self.config.rewards;
        if composition.is_empty() {
            return 2.0 * rewards.loss;
        }
        let mut ev = 0.0;
        for (bucket, p, next) in composition.draws() {
            let (nt, _) = add_to_hand(total, soft, bucket);
            let branch = if nt > 21 {
                rewards.player_bust
            } else {
                self.stand_ev(nt, upcard, &next)
            };
            ev += p * 2.0 * branch;
        }
        ev
    }

    /// Two independent one-card hands seeded with the pair card.
    pub fn split_ev(&mut self, pair_bucket: usize, upcard: u8, composition: &Composition) -> f64 {
        let (total, soft) = add_to_hand(0, false, pair_bucket);
        2.0 * self.value_of_state(total, soft, 1, upcard, composition)
    }

    pub fn surrender_ev(&self) -> f64 {
        self.config.rewards.loss / 2.0
    }

    /// Best of standing and hitting from this state.
    pub fn value_of_state(
        &mut self,
        total: u8,
        soft: bool,
        cards: u8,
        upcard: u8,
        composition: &Composition,
    ) -> f64 {
        if total > 21 {
            return self.config.rewards.player_bust;
        }
        let key = StateKey {
            total,
            soft,
            cards,
            upcard,
            composition: composition.key(self.config.keying),
        };
        if let Some(cached) = self.caches.state.get(&key) {
            return cached;
        }

        let stand = self.stand_ev(total, upcard, composition);
        let hit = self.hit_ev(total, soft, cards, upcard, composition);
        let best = stand.max(hit);

        self.caches.state.insert(key, best);
        best
    }

    // ── Decision ──

    /// EVs of every legal action for `hand` against `upcard`, risk blend
    /// applied.
    pub fn action_values(&mut self, hand: &Hand, upcard: Card) -> ActionValues {
        let composition = self.model;
        let total = hand.value();
        let soft = hand.is_soft();
        let cards = hand.len().min(u8::MAX as usize) as u8;
        let up = upcard.value();
        let two_cards = hand.len() == 2;

        let mut values = ActionValues {
            stand: self.stand_ev(total, up, &composition),
            hit: self.hit_ev(total, soft, cards, up, &composition),
            double: None,
            split: None,
            surrender: None,
        };
        if two_cards {
            values.double = Some(self.double_ev(total, soft, up, &composition));
            values.surrender = Some(self.surrender_ev());
            if hand.can_split() {
                let pair = hand.cards[0].bucket();
                values.split = Some(self.split_ev(pair, up, &composition));
            }
        }

        let true_count = self.true_count();
        if self.config.risk_scale != 0.0 && true_count.abs() >= 1.0 {
            let adj = true_count * self.config.risk_scale;
            values.stand += adj;
            values.hit -= adj;
            values.double = values.double.map(|v| v + 1.5 * adj);
            values.split = values.split.map(|v| v + 1.5 * adj);
        }
        values
    }

    fn refresh_model(&mut self, bucket: usize) {
        match self.config.refresh {
            RefreshPolicy::EveryCard => self.model = self.tracked,
            RefreshPolicy::Thresholds => {
                let left = self.tracked.count(bucket);
                if left == 0 || left == self.initial.count(bucket) / 2 {
                    debug!(
                        "{}: bucket {} at {} of {}, model refreshed",
                        self.name,
                        bucket,
                        left,
                        self.initial.count(bucket)
                    );
                    self.model = self.tracked;
                }
            }
        }
    }
}

impl Strategy for MdpAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide_bet(&mut self, capital: u64) -> u64 {
        self.config.bet.bet(capital, 1)
    }

    fn decide_action(&mut self, hand: &Hand, dealer_upcard: Card) -> Action {
        if hand.is_blackjack() || hand.is_busted() {
            return Action::Stand;
        }
        let values = self.action_values(hand, dealer_upcard);
        let action = values.best();
        debug!(
            "{}: {} vs {} -> {} (stand {:.4}, hit {:.4}, double {:?}, split {:?})",
            self.name,
            hand,
            dealer_upcard,
            action,
            values.stand,
            values.hit,
            values.double,
            values.split
        );
        action
    }

    fn observe_card(&mut self, card: Card) {
        if self.tracked.remove(card) {
            self.running_count += hilo_tag(card);
            self.refresh_model(card.bucket());
        }
    }

    fn reset_count(&mut self) {
        self.tracked = self.initial;
        self.model = self.initial;
        self.running_count = 0;
        self.caches.clear_on_reshuffle();
    }
}
