use super::{KnownCards, Repetition, is_plausible, predict_tricks, run_repetitions, sample_hands, validate_table};
use crate::error::EngineError;
use crate::params::EngineParams;
use crate::search::{RootState, ScoreObjective, TableConfig, build_tree, margin, resolve};
use rand::Rng;
use rand::seq::SliceRandom;
use rikiki_core::model::card::Card;
use rikiki_core::model::card_set::CardSet;
use rikiki_core::model::hand::Hand;
use rikiki_core::model::suit::Suit;
use rikiki_core::model::trick::Trick;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inputs for a card decision.
#[derive(Debug, Clone, Copy)]
pub struct PlayRequest<'a> {
    /// Cards the advised seat still holds.
    pub hand: &'a Hand,
    pub trump: Option<Suit>,
    pub seat: usize,
    /// Every seat's committed bid, in round order.
    pub bids: &'a [u8],
    pub tricks_won: &'a [u8],
    pub completed: &'a [Trick],
    pub current: &'a Trick,
    /// Cards the game loop allows; suit-following is already applied.
    pub legal: &'a [Card],
}

/// Accumulated score margin of the advised seat for each candidate card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayEstimate {
    pub advantages: BTreeMap<Card, i64>,
    pub repetitions: usize,
    pub accepted: usize,
}

impl PlayEstimate {
    pub fn is_empty(&self) -> bool {
        self.advantages.is_empty()
    }

    /// Card with the largest accumulated advantage, ties broken uniformly.
    pub fn best<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Card> {
        let top = self.advantages.values().copied().max()?;
        let leaders: Vec<Card> = self
            .advantages
            .iter()
            .filter(|&(_, &advantage)| advantage == top)
            .map(|(&card, _)| card)
            .collect();
        if leaders.len() > 1 {
            tracing::debug!(target: "rikiki_bot::play", tied = leaders.len(), "card advantages tied");
        }
        leaders.choose(rng).copied()
    }
}

/// Monte Carlo estimate of how much each legal card is worth to the advised
/// seat.
///
/// A sample is kept when selfish play over the whole round, starting from the
/// sampled deal, reproduces the committed bids (literally or after
/// perturbation). Kept samples are then solved from the current position with
/// every seat maximizing its score margin, and the advised seat's margin under
/// each root card is summed.
pub fn estimate_play<R: Rng + ?Sized>(
    request: &PlayRequest<'_>,
    params: &EngineParams,
    rng: &mut R,
) -> Result<PlayEstimate, EngineError> {
    params.validate()?;
    let players = request.bids.len();
    if request.tricks_won.len() != players {
        return Err(EngineError::InvalidRequest(format!(
            "expected {players} trick counts, got {}",
            request.tricks_won.len()
        )));
    }
    if request.legal.is_empty() {
        return Err(EngineError::InvalidRequest("no legal card supplied".to_string()));
    }
    if let Some(card) = request.legal.iter().find(|card| !request.hand.contains(**card)) {
        return Err(EngineError::InvalidRequest(format!(
            "legal card {card} is not in hand"
        )));
    }
    if request.current.expected_seat() != request.seat {
        return Err(EngineError::InvalidRequest(format!(
            "seat {} is not next to play",
            request.seat
        )));
    }

    let known = KnownCards::from_history(
        players,
        request.seat,
        request.hand,
        request.completed,
        request.current,
    )?;
    let known = if params.respect_voids {
        known
    } else {
        known.without_voids()
    };
    let hand_size = known.own_hand().len();
    validate_table(players, request.seat, hand_size)?;

    let config = TableConfig {
        players,
        trump: request.trump,
    };
    let committed: Vec<Option<u8>> = request.bids.iter().copied().map(Some).collect();
    let played: CardSet = known.seen().iter().filter(|card| !request.hand.contains(*card)).collect();
    let root = RootState::mid_round(
        players,
        request.seat,
        request.current.cards(),
        played,
        request.tricks_won.to_vec(),
    )?;
    let max_depth = players * hand_size;
    let objective = ScoreObjective::new(request.bids);

    let batch = run_repetitions(params, rng, |rep_rng| {
        let hands = sample_hands(&known, hand_size, rep_rng, params.max_sample_attempts)?;
        let predicted = predict_tricks(&config, &hands, rep_rng)?;
        if !is_plausible(&committed, &predicted, params.perturb_probability, rep_rng) {
            return Ok(Repetition::Rejected);
        }

        let mut tree = build_tree(&config, &hands, &root, max_depth)?;
        resolve(&mut tree, &objective, rep_rng);
        let actions: Vec<(Card, i64)> = tree
            .root_actions()
            .into_iter()
            .filter(|(card, _)| request.legal.contains(card))
            .map(|(card, value)| (card, margin(&value, request.seat)))
            .collect();
        Ok(Repetition::Accepted(actions))
    })?;

    let mut estimate = PlayEstimate {
        repetitions: batch.completed,
        accepted: batch.accepted.len(),
        ..PlayEstimate::default()
    };
    for actions in batch.accepted {
        for (card, advantage) in actions {
            *estimate.advantages.entry(card).or_default() += advantage;
        }
    }
    Ok(estimate)
}
