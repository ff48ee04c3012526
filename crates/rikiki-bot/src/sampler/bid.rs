use super::{KnownCards, Repetition, is_plausible, predict_tricks, run_repetitions, sample_hands, validate_table};
use crate::error::EngineError;
use crate::params::EngineParams;
use crate::search::TableConfig;
use rand::Rng;
use rand::seq::SliceRandom;
use rikiki_core::model::hand::Hand;
use rikiki_core::model::suit::Suit;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inputs for a bid decision.
#[derive(Debug, Clone, Copy)]
pub struct BidRequest<'a> {
    pub hand: &'a Hand,
    pub trump: Option<Suit>,
    pub seat: usize,
    /// One slot per seat in round order; `None` for seats yet to bid.
    pub bids: &'a [Option<u8>],
}

/// How often each trick count came out for the advised seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BidEstimate {
    pub frequencies: BTreeMap<u8, usize>,
    /// Repetitions actually run.
    pub repetitions: usize,
    /// Repetitions that passed the plausibility filter.
    pub accepted: usize,
}

impl BidEstimate {
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Most frequent bid among `allowed`, ties broken uniformly.
    ///
    /// `None` when no allowed bid was ever observed.
    pub fn best<R: Rng + ?Sized>(&self, allowed: &[u8], rng: &mut R) -> Option<u8> {
        let candidates: Vec<(u8, usize)> = self
            .frequencies
            .iter()
            .filter(|(bid, _)| allowed.contains(*bid))
            .map(|(&bid, &count)| (bid, count))
            .collect();
        let top = candidates.iter().map(|&(_, count)| count).max()?;
        let modes: Vec<u8> = candidates
            .iter()
            .filter(|&&(_, count)| count == top)
            .map(|&(bid, _)| bid)
            .collect();
        if modes.len() > 1 {
            tracing::debug!(target: "rikiki_bot::bid", tied = modes.len(), "bid modes tied");
        }
        modes.choose(rng).copied()
    }
}

/// Monte Carlo estimate of the tricks the advised seat will take.
///
/// Each repetition deals the unseen cards at random, predicts the trick counts
/// of selfish play and keeps the sample when the prediction is consistent with
/// the bids already placed.
pub fn estimate_bid<R: Rng + ?Sized>(
    request: &BidRequest<'_>,
    params: &EngineParams,
    rng: &mut R,
) -> Result<BidEstimate, EngineError> {
    params.validate()?;
    let players = request.bids.len();
    let hand_size = request.hand.len();
    validate_table(players, request.seat, hand_size)?;

    let known = KnownCards::new(players, request.seat, request.hand)?;
    let config = TableConfig {
        players,
        trump: request.trump,
    };

    let batch = run_repetitions(params, rng, |rep_rng| {
        let hands = sample_hands(&known, hand_size, rep_rng, params.max_sample_attempts)?;
        let predicted = predict_tricks(&config, &hands, rep_rng)?;
        if !is_plausible(request.bids, &predicted, params.perturb_probability, rep_rng) {
            return Ok(Repetition::Rejected);
        }
        let tricks = predicted
            .get(request.seat)
            .and_then(|&tricks| u8::try_from(tricks).ok())
            .ok_or_else(|| {
                EngineError::InvalidRequest(format!("no prediction for seat {}", request.seat))
            })?;
        Ok(Repetition::Accepted(tricks))
    })?;

    let mut estimate = BidEstimate {
        repetitions: batch.completed,
        accepted: batch.accepted.len(),
        ..BidEstimate::default()
    };
    for tricks in batch.accepted {
        *estimate.frequencies.entry(tricks).or_default() += 1;
    }
    Ok(estimate)
}
