use super::{BidContext, PlayContext, Policy};
use crate::error::EngineError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rikiki_core::model::card::Card;

/// Baseline opponent: any allowed bid, any legal card.
pub struct RandomPolicy {
    name: String,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            name: "random".to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> Result<u8, EngineError> {
        ctx.allowed.choose(&mut self.rng).copied().ok_or_else(|| {
            EngineError::InvalidRequest(format!("seat {} has no allowed bid", ctx.seat))
        })
    }

    fn choose_play(&mut self, ctx: &PlayContext<'_>) -> Result<Card, EngineError> {
        ctx.legal.choose(&mut self.rng).copied().ok_or_else(|| {
            EngineError::InvalidRequest(format!("seat {} has no legal card", ctx.seat))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use crate::policy::{BidContext, Policy};
    use rikiki_core::game::round::RoundState;
    use rikiki_core::model::card::Card;
    use rikiki_core::model::hand::Hand;

    #[test]
    fn empty_allowed_set_is_an_error() {
        let hand = Hand::new();
        let ctx = BidContext {
            seat: 0,
            hand: &hand,
            trump: None,
            bids: &[None, None],
            allowed: Vec::new(),
        };
        assert!(RandomPolicy::new(1).choose_bid(&ctx).is_err());
    }

    #[test]
    fn plays_full_round_legally() {
        let hands: Vec<Hand> = vec![
            ["AS", "2D", "9H"].iter().map(|c| c.parse::<Card>().unwrap()).collect(),
            ["KS", "3C", "4D"].iter().map(|c| c.parse::<Card>().unwrap()).collect(),
        ];
        let mut round = RoundState::from_hands(hands, None).unwrap();
        let mut policy = RandomPolicy::new(3);
        while let Some(seat) = round.next_bidder() {
            let ctx = BidContext::from_round(&round, seat).unwrap();
            let bid = policy.choose_bid(&ctx).unwrap();
            round.place_bid(seat, bid).unwrap();
        }
        while let Some(seat) = round.next_to_play() {
            let ctx = crate::policy::PlayContext::from_round(&round, seat).unwrap();
            let card = policy.choose_play(&ctx).unwrap();
            round.play_card(seat, card).unwrap();
        }
        assert!(round.round_scores().is_some());
    }
}
