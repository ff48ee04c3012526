use crate::model::card::Card;
use crate::model::deck::{Deal, DealError, Deck};
use crate::model::hand::Hand;
use crate::model::score::round_score;
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Bidding,
    Playing,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    WrongPhase { expected: RoundPhase, actual: RoundPhase },
    OutOfTurn { expected: usize, actual: usize },
    BidOutOfRange { bid: u8, hand_size: usize },
    ForbiddenBid(u8),
    CardNotInHand(Card),
    MustFollowSuit { lead: Suit, card: Card },
    Trick(TrickError),
    Deal(DealError),
    UnevenHands,
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::WrongPhase { expected, actual } => {
                write!(f, "expected {expected:?} phase but round is {actual:?}")
            }
            RoundError::OutOfTurn { expected, actual } => {
                write!(f, "expected seat {expected} to act but got seat {actual}")
            }
            RoundError::BidOutOfRange { bid, hand_size } => {
                write!(f, "bid {bid} outside 0..={hand_size}")
            }
            RoundError::ForbiddenBid(bid) => {
                write!(f, "last bidder may not bid {bid}: total would equal hand size")
            }
            RoundError::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            RoundError::MustFollowSuit { lead, card } => {
                write!(f, "{card} does not follow lead suit {lead}")
            }
            RoundError::Trick(err) => write!(f, "{err}"),
            RoundError::Deal(err) => write!(f, "{err}"),
            RoundError::UnevenHands => write!(f, "all hands must hold the same number of cards"),
        }
    }
}

impl std::error::Error for RoundError {}

impl From<TrickError> for RoundError {
    fn from(err: TrickError) -> Self {
        RoundError::Trick(err)
    }
}

impl From<DealError> for RoundError {
    fn from(err: DealError) -> Self {
        RoundError::Deal(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub trick_completed: bool,
    pub trick_winner: Option<usize>,
    pub round_complete: bool,
}

/// One round: seats `0..n`, seat 0 bids first and leads the first trick.
#[derive(Debug, Clone)]
pub struct RoundState {
    hand_size: usize,
    hands: Vec<Hand>,
    trump: Option<Suit>,
    bids: Vec<Option<u8>>,
    tricks_won: Vec<u8>,
    completed: Vec<Trick>,
    current: Trick,
    phase: RoundPhase,
}

impl RoundState {
    pub fn deal<R: Rng + ?Sized>(
        players: usize,
        hand_size: usize,
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        let Deal { hands, trump } = Deck::shuffled(rng).deal(players, hand_size)?;
        Self::from_hands(hands, trump)
    }

    pub fn from_hands(hands: Vec<Hand>, trump: Option<Suit>) -> Result<Self, RoundError> {
        let players = hands.len();
        if players == 0 {
            return Err(RoundError::Deal(DealError::NoPlayers));
        }
        let hand_size = hands[0].len();
        if hands.iter().any(|hand| hand.len() != hand_size) {
            return Err(RoundError::UnevenHands);
        }
        Ok(Self {
            hand_size,
            hands,
            trump,
            bids: vec![None; players],
            tricks_won: vec![0; players],
            completed: Vec::with_capacity(hand_size),
            current: Trick::new(0, players),
            phase: RoundPhase::Bidding,
        })
    }

    pub fn players(&self) -> usize {
        self.hands.len()
    }

    pub fn hand_size(&self) -> usize {
        self.hand_size
    }

    pub fn hand(&self, seat: usize) -> &Hand {
        &self.hands[seat]
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn bids(&self) -> &[Option<u8>] {
        &self.bids
    }

    pub fn tricks_won(&self) -> &[u8] {
        &self.tricks_won
    }

    pub fn completed_tricks(&self) -> &[Trick] {
        &self.completed
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current
    }

    pub fn next_bidder(&self) -> Option<usize> {
        match self.phase {
            RoundPhase::Bidding => self.bids.iter().position(Option::is_none),
            _ => None,
        }
    }

    pub fn next_to_play(&self) -> Option<usize> {
        match self.phase {
            RoundPhase::Playing => Some(self.current.expected_seat()),
            _ => None,
        }
    }

    /// The bid the last bidder may not make, if any.
    pub fn forbidden_bid(&self, seat: usize) -> Option<u8> {
        if seat + 1 != self.players() {
            return None;
        }
        let committed: usize = self
            .bids
            .iter()
            .take(seat)
            .map(|bid| usize::from(bid.unwrap_or(0)))
            .sum();
        self.hand_size
            .checked_sub(committed)
            .and_then(|rest| u8::try_from(rest).ok())
    }

    pub fn allowed_bids(&self, seat: usize) -> Vec<u8> {
        let forbidden = self.forbidden_bid(seat);
        (0..=self.hand_size as u8)
            .filter(|bid| Some(*bid) != forbidden)
            .collect()
    }

    pub fn place_bid(&mut self, seat: usize, bid: u8) -> Result<(), RoundError> {
        let expected = self.next_bidder().ok_or(RoundError::WrongPhase {
            expected: RoundPhase::Bidding,
            actual: self.phase,
        })?;
        if seat != expected {
            return Err(RoundError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        if usize::from(bid) > self.hand_size {
            return Err(RoundError::BidOutOfRange {
                bid,
                hand_size: self.hand_size,
            });
        }
        if self.forbidden_bid(seat) == Some(bid) {
            return Err(RoundError::ForbiddenBid(bid));
        }

        self.bids[seat] = Some(bid);
        if self.bids.iter().all(Option::is_some) {
            self.phase = if self.hand_size == 0 {
                RoundPhase::Complete
            } else {
                RoundPhase::Playing
            };
        }
        Ok(())
    }

    /// Cards `seat` may play: the lead suit when held, otherwise anything.
    pub fn legal_cards(&self, seat: usize) -> Vec<Card> {
        let hand = &self.hands[seat];
        match self.current.lead_suit() {
            Some(lead) if hand.has_suit(lead) => hand
                .iter()
                .copied()
                .filter(|card| card.suit == lead)
                .collect(),
            _ => hand.cards().to_vec(),
        }
    }

    pub fn play_card(&mut self, seat: usize, card: Card) -> Result<PlayOutcome, RoundError> {
        if self.phase != RoundPhase::Playing {
            return Err(RoundError::WrongPhase {
                expected: RoundPhase::Playing,
                actual: self.phase,
            });
        }

        let expected = self.current.expected_seat();
        if seat != expected {
            return Err(RoundError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        if !self.hands[seat].contains(card) {
            return Err(RoundError::CardNotInHand(card));
        }

        if let Some(lead) = self.current.lead_suit() {
            if card.suit != lead && self.hands[seat].has_suit(lead) {
                return Err(RoundError::MustFollowSuit { lead, card });
            }
        }

        self.current.play(seat, card)?;
        self.hands[seat].remove(card);

        let mut outcome = PlayOutcome {
            trick_completed: false,
            trick_winner: None,
            round_complete: false,
        };

        if let Some(winner) = self.current.winner(self.trump) {
            self.tricks_won[winner] += 1;
            let players = self.players();
            let finished = std::mem::replace(&mut self.current, Trick::new(winner, players));
            self.completed.push(finished);
            outcome.trick_completed = true;
            outcome.trick_winner = Some(winner);

            if self.completed.len() == self.hand_size {
                self.phase = RoundPhase::Complete;
                outcome.round_complete = true;
            }
        }

        Ok(outcome)
    }

    /// Per-seat round score; `None` until the round is complete.
    pub fn round_scores(&self) -> Option<Vec<i32>> {
        if self.phase != RoundPhase::Complete {
            return None;
        }
        Some(
            self.tricks_won
                .iter()
                .zip(&self.bids)
                .map(|(&tricks, bid)| round_score(tricks, bid.unwrap_or(0)))
                .collect(),
        )
    }
}
