//! Monte Carlo estimators built on the exhaustive search.
//!
//! Every repetition samples a hidden deal, predicts the trick counts selfish
//! play would produce, keeps the sample only when that prediction agrees with
//! the bids on the table and records what the advised seat would do.

mod bid;
mod perturb;
mod play;
mod world;

pub use bid::{BidEstimate, BidRequest, estimate_bid};
pub use perturb::{is_plausible, matches_committed, perturb_bids};
pub use play::{PlayEstimate, PlayRequest, estimate_play};
pub use world::{KnownCards, SamplingError, sample_hands};

use crate::error::EngineError;
use crate::params::EngineParams;
use crate::search::{RootState, TableConfig, TrickObjective, build_tree, resolve};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rikiki_core::model::hand::Hand;
use std::time::Instant;

const DECK_SIZE: usize = 52;

/// Rejects tables the engine cannot reason about.
pub(crate) fn validate_table(players: usize, seat: usize, hand_size: usize) -> Result<(), EngineError> {
    if players < 2 {
        return Err(EngineError::InvalidRequest(format!(
            "need at least two players, got {players}"
        )));
    }
    if seat >= players {
        return Err(EngineError::InvalidRequest(format!(
            "seat {seat} is not at a {players}-player table"
        )));
    }
    if hand_size == 0 {
        return Err(EngineError::InvalidRequest("hand is empty".to_string()));
    }
    if players * hand_size > DECK_SIZE {
        return Err(EngineError::InvalidRequest(format!(
            "{players} hands of {hand_size} cards exceed the deck"
        )));
    }
    Ok(())
}

/// Trick counts selfish play produces for one fully known deal.
pub(crate) fn predict_tricks<R: Rng + ?Sized>(
    config: &TableConfig,
    hands: &[Hand],
    rng: &mut R,
) -> Result<Vec<i32>, EngineError> {
    let root = RootState::round_start(config.players);
    let max_depth = hands.iter().map(Hand::len).sum();
    let mut tree = build_tree(config, hands, &root, max_depth)?;
    resolve(&mut tree, &TrickObjective, rng);
    Ok(tree.root_value().to_vec())
}

/// What became of one repetition.
pub(crate) enum Repetition<T> {
    Accepted(T),
    Rejected,
}

/// Outcomes of a batch of repetitions, in seed order.
pub(crate) struct Batch<T> {
    pub accepted: Vec<T>,
    /// Repetitions that started before the deadline.
    pub completed: usize,
}

/// Runs `params.repetitions` independent repetitions of `body`.
///
/// Each repetition gets its own `StdRng` seeded from `rng`, so the outcome for
/// a given caller seed does not depend on how rayon schedules the work.
/// Repetitions that would start after the time budget are skipped. A sample
/// that cannot be drawn discards its repetition; any other error aborts.
pub(crate) fn run_repetitions<T, R, F>(
    params: &EngineParams,
    rng: &mut R,
    body: F,
) -> Result<Batch<T>, EngineError>
where
    T: Send,
    R: Rng + ?Sized,
    F: Fn(&mut StdRng) -> Result<Repetition<T>, EngineError> + Sync,
{
    let seeds: Vec<u64> = (0..params.repetitions).map(|_| rng.next_u64()).collect();
    let deadline = params.time_budget().map(|budget| Instant::now() + budget);

    let run = |seed: u64| -> Result<Option<Repetition<T>>, EngineError> {
        if deadline.is_some_and(|limit| Instant::now() >= limit) {
            return Ok(None);
        }
        let mut rep_rng = StdRng::seed_from_u64(seed);
        match body(&mut rep_rng) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(EngineError::Sampling(SamplingError::Exhausted { .. })) => {
                Ok(Some(Repetition::Rejected))
            }
            Err(err) => Err(err),
        }
    };

    let results: Vec<Option<Repetition<T>>> = if params.parallel {
        seeds.par_iter().map(|&seed| run(seed)).collect::<Result<_, _>>()?
    } else {
        seeds.iter().map(|&seed| run(seed)).collect::<Result<_, _>>()?
    };

    let mut batch = Batch {
        accepted: Vec::new(),
        completed: 0,
    };
    for outcome in results.into_iter().flatten() {
        batch.completed += 1;
        if let Repetition::Accepted(value) = outcome {
            batch.accepted.push(value);
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::{Repetition, run_repetitions};
    use crate::error::EngineError;
    use crate::params::EngineParams;
    use crate::sampler::SamplingError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn draw(rng: &mut StdRng) -> Result<Repetition<u32>, EngineError> {
        let value = rng.gen_range(0..1000u32);
        if value % 3 == 0 {
            Ok(Repetition::Rejected)
        } else {
            Ok(Repetition::Accepted(value))
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let params = EngineParams::default().with_repetitions(64);
        let parallel = run_repetitions(&params, &mut StdRng::seed_from_u64(3), draw).unwrap();
        let sequential = run_repetitions(
            &params.clone().with_parallel(false),
            &mut StdRng::seed_from_u64(3),
            draw,
        )
        .unwrap();
        assert_eq!(parallel.accepted, sequential.accepted);
        assert_eq!(parallel.completed, 64);
    }

    #[test]
    fn zero_repetitions_is_empty() {
        let params = EngineParams::default().with_repetitions(0);
        let batch = run_repetitions(&params, &mut StdRng::seed_from_u64(1), draw).unwrap();
        assert!(batch.accepted.is_empty());
        assert_eq!(batch.completed, 0);
    }

    #[test]
    fn exhausted_sampling_only_discards() {
        let params = EngineParams::default().with_repetitions(8);
        let batch = run_repetitions(&params, &mut StdRng::seed_from_u64(1), |_| {
            Err::<Repetition<u32>, _>(EngineError::Sampling(SamplingError::Exhausted { attempts: 1 }))
        })
        .unwrap();
        assert!(batch.accepted.is_empty());
        assert_eq!(batch.completed, 8);
    }

    #[test]
    fn malformed_state_aborts() {
        let params = EngineParams::default().with_repetitions(8);
        let result = run_repetitions(&params, &mut StdRng::seed_from_u64(1), |_| {
            Err::<Repetition<u32>, _>(EngineError::InvalidRequest("bad".to_string()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn expired_budget_skips_everything() {
        let mut params = EngineParams::default().with_repetitions(16);
        params.time_budget_ms = Some(0);
        let batch = run_repetitions(&params, &mut StdRng::seed_from_u64(1), draw).unwrap();
        assert_eq!(batch.completed, 0);
    }
}
