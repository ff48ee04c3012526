use super::{BidContext, PlayContext, Policy};
use crate::error::EngineError;
use crate::params::EngineParams;
use crate::sampler::{BidRequest, PlayRequest, estimate_bid, estimate_play};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rikiki_core::model::card::Card;
use tracing::{Level, event};

/// Bids the most frequent sampled trick count and plays the card with the
/// best sampled score margin.
pub struct NashPolicy {
    name: String,
    params: EngineParams,
    rng: StdRng,
}

impl NashPolicy {
    pub fn new(params: EngineParams, seed: u64) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self {
            name: "nash".to_string(),
            params,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }
}

impl Policy for NashPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> Result<u8, EngineError> {
        if ctx.allowed.is_empty() {
            return Err(EngineError::InvalidRequest(format!(
                "seat {} has no allowed bid",
                ctx.seat
            )));
        }
        let request = BidRequest {
            hand: ctx.hand,
            trump: ctx.trump,
            seat: ctx.seat,
            bids: ctx.bids,
        };
        let estimate = estimate_bid(&request, &self.params, &mut self.rng)?;

        let (bid, fallback) = match estimate.best(&ctx.allowed, &mut self.rng) {
            Some(bid) => (bid, false),
            None => {
                let bid = ctx.allowed.choose(&mut self.rng).copied().unwrap_or(0);
                event!(
                    target: "rikiki_bot::bid",
                    Level::WARN,
                    seat = ctx.seat,
                    repetitions = estimate.repetitions,
                    bid,
                    "no plausible sample; bidding at random"
                );
                (bid, true)
            }
        };

        if tracing::enabled!(Level::INFO) {
            event!(
                target: "rikiki_bot::bid",
                Level::INFO,
                policy = %self.name,
                seat = ctx.seat,
                hand = %format_cards(ctx.hand.cards()),
                repetitions = estimate.repetitions,
                accepted = estimate.accepted,
                frequencies = ?estimate.frequencies,
                bid,
                fallback,
                "bid decision"
            );
        }
        Ok(bid)
    }

    fn choose_play(&mut self, ctx: &PlayContext<'_>) -> Result<Card, EngineError> {
        let [only] = ctx.legal.as_slice() else {
            return self.search_play(ctx);
        };
        if tracing::enabled!(Level::INFO) {
            event!(
                target: "rikiki_bot::play",
                Level::INFO,
                policy = %self.name,
                seat = ctx.seat,
                card = %only,
                forced = true,
                "play decision"
            );
        }
        Ok(*only)
    }
}

impl NashPolicy {
    fn search_play(&mut self, ctx: &PlayContext<'_>) -> Result<Card, EngineError> {
        let request = PlayRequest {
            hand: ctx.hand,
            trump: ctx.trump,
            seat: ctx.seat,
            bids: &ctx.bids,
            tricks_won: ctx.tricks_won,
            completed: ctx.completed,
            current: ctx.current,
            legal: &ctx.legal,
        };
        let estimate = estimate_play(&request, &self.params, &mut self.rng)?;

        let (card, fallback) = match estimate.best(&mut self.rng) {
            Some(card) => (card, false),
            None => {
                let card = ctx.legal.choose(&mut self.rng).copied().ok_or_else(|| {
                    EngineError::InvalidRequest(format!("seat {} has no legal card", ctx.seat))
                })?;
                event!(
                    target: "rikiki_bot::play",
                    Level::WARN,
                    seat = ctx.seat,
                    repetitions = estimate.repetitions,
                    card = %card,
                    "no plausible sample; playing at random"
                );
                (card, true)
            }
        };

        if tracing::enabled!(Level::INFO) {
            let advantages: Vec<String> = estimate
                .advantages
                .iter()
                .map(|(card, value)| format!("{card}:{value}"))
                .collect();
            event!(
                target: "rikiki_bot::play",
                Level::INFO,
                policy = %self.name,
                seat = ctx.seat,
                legal = %format_cards(&ctx.legal),
                repetitions = estimate.repetitions,
                accepted = estimate.accepted,
                advantages = %advantages.join(" "),
                card = %card,
                fallback,
                "play decision"
            );
        }
        Ok(card)
    }
}

pub(crate) fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(" ")
}
