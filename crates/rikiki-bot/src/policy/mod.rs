mod nash;
mod random;

pub use nash::NashPolicy;
pub use random::RandomPolicy;

use crate::error::EngineError;
use rikiki_core::game::round::{RoundPhase, RoundState};
use rikiki_core::model::card::Card;
use rikiki_core::model::hand::Hand;
use rikiki_core::model::suit::Suit;
use rikiki_core::model::trick::Trick;

/// What a seat sees when it is asked to bid.
#[derive(Debug, Clone)]
pub struct BidContext<'a> {
    pub seat: usize,
    pub hand: &'a Hand,
    pub trump: Option<Suit>,
    /// One slot per seat; `None` for seats yet to bid.
    pub bids: &'a [Option<u8>],
    /// Bids the game loop will accept from this seat.
    pub allowed: Vec<u8>,
}

impl<'a> BidContext<'a> {
    pub fn from_round(round: &'a RoundState, seat: usize) -> Result<Self, EngineError> {
        if round.phase() != RoundPhase::Bidding || round.next_bidder() != Some(seat) {
            return Err(EngineError::InvalidRequest(format!(
                "seat {seat} is not due to bid"
            )));
        }
        Ok(Self {
            seat,
            hand: round.hand(seat),
            trump: round.trump(),
            bids: round.bids(),
            allowed: round.allowed_bids(seat),
        })
    }
}

/// What a seat sees when it is asked to play a card.
#[derive(Debug, Clone)]
pub struct PlayContext<'a> {
    pub seat: usize,
    pub hand: &'a Hand,
    pub trump: Option<Suit>,
    pub bids: Vec<u8>,
    pub tricks_won: &'a [u8],
    pub completed: &'a [Trick],
    pub current: &'a Trick,
    pub legal: Vec<Card>,
}

impl<'a> PlayContext<'a> {
    pub fn from_round(round: &'a RoundState, seat: usize) -> Result<Self, EngineError> {
        if round.phase() != RoundPhase::Playing || round.next_to_play() != Some(seat) {
            return Err(EngineError::InvalidRequest(format!(
                "seat {seat} is not due to play"
            )));
        }
        let bids = round
            .bids()
            .iter()
            .map(|bid| bid.ok_or_else(|| EngineError::InvalidRequest("bidding is unfinished".to_string())))
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Self {
            seat,
            hand: round.hand(seat),
            trump: round.trump(),
            bids,
            tricks_won: round.tricks_won(),
            completed: round.completed_tricks(),
            current: round.current_trick(),
            legal: round.legal_cards(seat),
        })
    }
}

/// A bot that can take part in a round.
pub trait Policy: Send {
    /// Short label used in logs and reports.
    fn name(&self) -> &str;

    /// Choose a bid from `ctx.allowed`.
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> Result<u8, EngineError>;

    /// Choose a card from `ctx.legal`.
    fn choose_play(&mut self, ctx: &PlayContext<'_>) -> Result<Card, EngineError>;
}
