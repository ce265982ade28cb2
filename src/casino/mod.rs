use log::{debug, info, warn};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use serde::Serialize;

use crate::{
    calculate_hand_value, is_blackjack, is_soft_hand, Action, Card, Hand, HandOutcome,
    PayoutRatio, Player, Shoe, ShoeKind, SimError, Strategy, TableRules,
};

/// Most seats a table holds.
pub const MAX_SEATS: usize = 8;

/// Cards held back per seat, and for the dealer, below the lowest cut card
/// position. A round that needs more than this from a nearly spent shoe
/// fails with `EmptyShoe`.
pub const ROUND_RESERVE: usize = 5;

/// Cards a round at `seats` seats is expected to need at most.
pub fn round_reserve(seats: usize) -> usize {
    (seats + 1) * ROUND_RESERVE
}

/// One position at the table: an account and the agent playing it.
pub struct Seat {
    pub player: Player,
    pub agent: Box<dyn Strategy>,
}

impl Seat {
    pub fn new(name: impl Into<String>, capital: u64, agent: Box<dyn Strategy>) -> Self {
        Self {
            player: Player::new(name, capital),
            agent,
        }
    }
}

/// A single decision as the engine saw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub seat: usize,
    pub hand_index: usize,
    pub total: u8,
    pub soft: bool,
    pub cards: usize,
    pub pair: bool,
    pub wager: u64,
    pub dealer_upcard: Card,
    pub action: Action,
    /// False when the engine rejected the action and stood the hand
    pub legal: bool,
    /// Capital right after the action was applied
    pub capital: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandResult {
    pub cards: Vec<Card>,
    pub total: u8,
    pub wager: u64,
    pub outcome: HandOutcome,
    /// Amount credited at settlement (stake included)
    pub payout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatResult {
    pub seat: usize,
    pub name: String,
    pub capital_before: u64,
    pub capital_after: u64,
    pub net: i64,
    pub hands: Vec<HandResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    pub reshuffled: bool,
    pub dealer_cards: Vec<Card>,
    pub dealer_total: u8,
    /// Seats that placed a bet this round
    pub seats: Vec<SeatResult>,
    pub decisions: Vec<DecisionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatSummary {
    pub seat: usize,
    pub name: String,
    pub starting_capital: u64,
    pub final_capital: u64,
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub blackjacks: u64,
    pub surrenders: u64,
}

impl SeatSummary {
    fn record(&mut self, result: &SeatResult) {
        self.rounds += 1;
        self.final_capital = result.capital_after;
        for hand in &result.hands {
            match hand.outcome {
                HandOutcome::Win => self.wins += 1,
                HandOutcome::Loss => self.losses += 1,
                HandOutcome::Push => self.pushes += 1,
                HandOutcome::Blackjack => self.blackjacks += 1,
                HandOutcome::Surrender => self.surrenders += 1,
            }
        }
    }

    pub fn net(&self) -> i64 {
        self.final_capital as i64 - self.starting_capital as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub rounds_played: u64,
    pub seats: Vec<SeatSummary>,
}

/// Round engine: owns the shoe, the dealer hand and every seat.
pub struct Casino {
    rules: TableRules,
    seats: Vec<Seat>,
    shoe: Shoe,
    rng: ChaCha8Rng,
    dealer: Vec<Card>,
    round: u64,
}

impl Casino {
    /// Table with a freshly shuffled shoe. `seed` makes the whole session
    /// reproducible; `None` seeds from OS entropy.
    pub fn new(rules: TableRules, seats: Vec<Seat>, seed: Option<u64>) -> Result<Self, SimError> {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        rules.validate()?;
        let shoe = Shoe::new(rules.num_decks, rules.penetration, &mut rng)?;
        Self::build(rules, seats, shoe, rng)
    }

    /// Table dealing from a given shoe, typically [`Shoe::stacked`].
    pub fn with_shoe(rules: TableRules, seats: Vec<Seat>, shoe: Shoe) -> Result<Self, SimError> {
        rules.validate()?;
        Self::build(rules, seats, shoe, ChaCha8Rng::from_entropy())
    }

    fn build(
        rules: TableRules,
        seats: Vec<Seat>,
        shoe: Shoe,
        rng: ChaCha8Rng,
    ) -> Result<Self, SimError> {
        if seats.is_empty() || seats.len() > MAX_SEATS {
            return Err(SimError::InvalidSeatCount(seats.len()));
        }
        // Stacked shoes never reshuffle.
        if shoe.kind() == ShoeKind::Shuffled {
            let needed = round_reserve(seats.len());
            let available = Shoe::lowest_threshold(rules.num_decks, rules.penetration);
            if available < needed {
                return Err(SimError::ShoeTooShallow {
                    seats: seats.len(),
                    needed,
                    available,
                });
            }
        }
        Ok(Self {
            rules,
            seats,
            shoe,
            rng,
            dealer: Vec::new(),
            round: 0,
        })
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Rounds started so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn dealer_should_hit(&self) -> bool {
        let value = calculate_hand_value(&self.dealer);
        if value >= 17 {
            value == 17 && self.rules.dealer_hits_soft_17 && is_soft_hand(&self.dealer)
        } else {
            true
        }
    }

    /// Play one full round: reshuffle check, bets, deal, player turns,
    /// dealer turn, settlement, cleanup.
    pub fn play_round(&mut self) -> Result<RoundReport, SimError> {
        self.round += 1;

        // Preparation
        let reshuffled = self.shoe.needs_reshuffle();
        if reshuffled {
            self.shoe = Shoe::new(self.rules.num_decks, self.rules.penetration, &mut self.rng)?;
            for seat in &mut self.seats {
                seat.agent.reset_count();
            }
            info!(
                "round {}: new shoe of {} cards, reshuffle at {}",
                self.round,
                self.shoe.remaining(),
                self.shoe.reshuffle_threshold()
            );
        }

        // Betting
        let capital_before: Vec<u64> = self.seats.iter().map(|s| s.player.capital).collect();
        let mut active = Vec::new();
        for (index, seat) in self.seats.iter_mut().enumerate() {
            let bet = seat.agent.decide_bet(seat.player.capital);
            if seat.player.place_bet(bet) {
                active.push(index);
            } else {
                debug!("seat {} ({}) sits out with bet {}", index, seat.player.name, bet);
            }
        }
        if active.is_empty() {
            return Ok(RoundReport {
                round: self.round,
                reshuffled,
                dealer_cards: Vec::new(),
                dealer_total: 0,
                seats: Vec::new(),
                decisions: Vec::new(),
            });
        }

        // Dealing
        for &index in &active {
            let card = deal(&mut self.shoe, &mut self.seats)?;
            self.seats[index].player.draw_into(0, card);
        }
        let upcard = deal(&mut self.shoe, &mut self.seats)?;
        self.dealer.push(upcard);
        for &index in &active {
            let card = deal(&mut self.shoe, &mut self.seats)?;
            self.seats[index].player.draw_into(0, card);
        }
        let hole = self.shoe.draw()?;
        self.dealer.push(hole);

        // Player turns
        let mut decisions = Vec::new();
        for &index in &active {
            self.play_seat(index, upcard, &mut decisions)?;
        }

        // Dealer turn
        broadcast(&mut self.seats, hole);
        while self.dealer_should_hit() {
            let card = deal(&mut self.shoe, &mut self.seats)?;
            self.dealer.push(card);
        }

        // Settlement
        let seats = active
            .iter()
            .map(|&index| self.settle_seat(index, capital_before[index]))
            .collect();
        let report = RoundReport {
            round: self.round,
            reshuffled,
            dealer_cards: self.dealer.clone(),
            dealer_total: calculate_hand_value(&self.dealer),
            seats,
            decisions,
        };

        // Cleanup
        for seat in &mut self.seats {
            seat.player.reset_hands();
        }
        self.dealer.clear();

        Ok(report)
    }

    /// Run up to `rounds` rounds, stopping early once no seat bets.
    pub fn play_session(&mut self, rounds: u64) -> Result<SessionSummary, SimError> {
        self.play_session_with(rounds, |_| {})
    }

    /// Like [`Casino::play_session`], handing every round report to
    /// `on_round` as it completes.
    pub fn play_session_with<F>(
        &mut self,
        rounds: u64,
        mut on_round: F,
    ) -> Result<SessionSummary, SimError>
    where
        F: FnMut(&RoundReport),
    {
        let mut summaries: Vec<SeatSummary> = self
            .seats
            .iter()
            .enumerate()
            .map(|(seat, s)| SeatSummary {
                seat,
                name: s.player.name.clone(),
                starting_capital: s.player.capital,
                final_capital: s.player.capital,
                rounds: 0,
                wins: 0,
                losses: 0,
                pushes: 0,
                blackjacks: 0,
                surrenders: 0,
            })
            .collect();

        let mut rounds_played = 0;
        for _ in 0..rounds {
            let report = self.play_round()?;
            if report.seats.is_empty() {
                warn!(
                    "no seat placed a bet in round {}, ending session after {} rounds",
                    report.round, rounds_played
                );
                break;
            }
            rounds_played += 1;
            for result in &report.seats {
                summaries[result.seat].record(result);
            }
            on_round(&report);
        }

        info!("session over after {} rounds", rounds_played);
        for summary in &summaries {
            info!(
                "{}: {} -> {} ({:+})",
                summary.name,
                summary.starting_capital,
                summary.final_capital,
                summary.net()
            );
        }
        Ok(SessionSummary {
            rounds_played,
            seats: summaries,
        })
    }

    // ── Player turns ──

    /// Hands are played by cursor; a split appends a hand that the cursor
    /// reaches later in the same pass.
    fn play_seat(
        &mut self,
        index: usize,
        upcard: Card,
        decisions: &mut Vec<DecisionRecord>,
    ) -> Result<(), SimError> {
        let mut cursor = 0;
        while cursor < self.seats[index].player.hands.len() {
            self.play_hand(index, cursor, upcard, decisions)?;
            cursor += 1;
        }
        Ok(())
    }

    fn play_hand(
        &mut self,
        index: usize,
        hand_index: usize,
        upcard: Card,
        decisions: &mut Vec<DecisionRecord>,
    ) -> Result<(), SimError> {
        let mut taken = 0;
        loop {
            let seat = &mut self.seats[index];
            let hand = &seat.player.hands[hand_index];
            if hand.is_finished() {
                return Ok(());
            }
            if taken >= self.rules.max_hand_decisions {
                debug!(
                    "seat {} hand {}: {} decisions reached, standing",
                    index, hand_index, taken
                );
                seat.player.hands[hand_index].stood = true;
                return Ok(());
            }
            taken += 1;

            let action = seat.agent.decide_action(hand, upcard);
            let (total, soft, cards, pair, wager) = (
                hand.value(),
                hand.is_soft(),
                hand.len(),
                hand.can_split(),
                hand.wager,
            );
            debug!(
                "seat {} hand {}: {} on {} vs {}",
                index, hand_index, action, hand, upcard
            );

            let legal = self.apply(index, hand_index, action)?;
            let player = &mut self.seats[index].player;
            if !legal {
                debug!(
                    "seat {} hand {}: {} not allowed, standing",
                    index, hand_index, action
                );
                player.hands[hand_index].stood = true;
            }
            decisions.push(DecisionRecord {
                seat: index,
                hand_index,
                total,
                soft,
                cards,
                pair,
                wager,
                dealer_upcard: upcard,
                action,
                legal,
                capital: player.capital,
            });
        }
    }

    /// Apply `action` to one hand. Returns false when the player account
    /// rejects it.
    fn apply(
        &mut self,
        index: usize,
        hand_index: usize,
        action: Action,
    ) -> Result<bool, SimError> {
        match action {
            Action::Stand => {
                self.seats[index].player.hands[hand_index].stood = true;
                Ok(true)
            }
            Action::Hit => {
                let card = deal(&mut self.shoe, &mut self.seats)?;
                self.seats[index].player.draw_into(hand_index, card);
                Ok(true)
            }
            Action::Double => {
                if !self.seats[index].player.double(hand_index) {
                    return Ok(false);
                }
                let card = deal(&mut self.shoe, &mut self.seats)?;
                let player = &mut self.seats[index].player;
                player.draw_into(hand_index, card);
                player.hands[hand_index].stood = true;
                Ok(true)
            }
            Action::Split => {
                if !self.seats[index].player.split(hand_index) {
                    return Ok(false);
                }
                let card = deal(&mut self.shoe, &mut self.seats)?;
                self.seats[index].player.draw_into(hand_index, card);
                let card = deal(&mut self.shoe, &mut self.seats)?;
                let player = &mut self.seats[index].player;
                let last = player.hands.len() - 1;
                player.draw_into(last, card);
                Ok(true)
            }
            Action::Surrender => Ok(self.seats[index].player.surrender(hand_index)),
        }
    }

    // ── Settlement ──

    fn settle_seat(&mut self, index: usize, capital_before: u64) -> SeatResult {
        let dealer_total = calculate_hand_value(&self.dealer);
        let dealer_blackjack = is_blackjack(&self.dealer);
        let ratio = self.rules.blackjack_payout;

        let player = &mut self.seats[index].player;
        let mut hands = Vec::with_capacity(player.hands.len());
        for (hand_index, hand) in player.hands.iter().enumerate() {
            let (outcome, payout) = settle_hand(hand, dealer_total, dealer_blackjack, ratio);
            player.capital += payout;
            debug!(
                "seat {} hand {}: {} against dealer {} -> {:?}, paid {}",
                index, hand_index, hand, dealer_total, outcome, payout
            );
            hands.push(HandResult {
                cards: hand.cards.clone(),
                total: hand.value(),
                wager: hand.wager,
                outcome,
                payout,
            });
        }

        SeatResult {
            seat: index,
            name: player.name.clone(),
            capital_before,
            capital_after: player.capital,
            net: player.capital as i64 - capital_before as i64,
            hands,
        }
    }
}

/// Outcome of one hand and the amount credited back, stake included. A
/// surrendered hand was refunded when it surrendered and gets nothing more.
pub fn settle_hand(
    hand: &Hand,
    dealer_total: u8,
    dealer_blackjack: bool,
    blackjack_payout: PayoutRatio,
) -> (HandOutcome, u64) {
    let wager = hand.wager;
    if hand.surrendered {
        return (HandOutcome::Surrender, 0);
    }
    if hand.is_blackjack() {
        return if dealer_blackjack {
            (HandOutcome::Push, wager)
        } else {
            (
                HandOutcome::Blackjack,
                wager + blackjack_payout.calculate_payout(wager),
            )
        };
    }

    let total = hand.value();
    if total > 21 {
        (HandOutcome::Loss, 0)
    } else if dealer_total > 21 || total > dealer_total {
        (HandOutcome::Win, wager * 2)
    } else if total == dealer_total {
        (HandOutcome::Push, wager)
    } else {
        (HandOutcome::Loss, 0)
    }
}

// ── Shoe helpers ──

fn broadcast(seats: &mut [Seat], card: Card) {
    for seat in seats {
        seat.agent.observe_card(card);
    }
}

/// Draw a visible card and show it to every agent.
fn deal(shoe: &mut Shoe, seats: &mut [Seat]) -> Result<Card, SimError> {
    let card = shoe.draw()?;
    broadcast(seats, card);
    Ok(card)
}
