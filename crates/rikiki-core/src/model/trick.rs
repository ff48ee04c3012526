use crate::model::card::Card;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of the winning card within `cards`.
///
/// The first card leads. A later card takes over when it follows the current
/// winner's suit with a higher rank, or when it is trump and the current
/// winner is not. Returns `None` only for an empty trick.
pub fn trick_winner(cards: &[Card], trump: Option<Suit>) -> Option<usize> {
    let (first, rest) = cards.split_first()?;
    let mut best = (0usize, *first);
    for (offset, card) in rest.iter().enumerate() {
        let (_, winner) = best;
        let follows_higher = card.suit == winner.suit && card.rank > winner.rank;
        let trumps_in = trump.is_some_and(|t| card.suit == t && winner.suit != t);
        if follows_higher || trumps_in {
            best = (offset + 1, *card);
        }
    }
    Some(best.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: usize,
    seats: usize,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: usize,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: usize, actual: usize },
    AlreadyPlayed(usize),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected seat {expected} to play next but got seat {actual}")
            }
            TrickError::AlreadyPlayed(seat) => {
                write!(f, "seat {seat} has already played this trick")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: usize, seats: usize) -> Self {
        Self {
            leader,
            seats,
            plays: Vec::with_capacity(seats),
        }
    }

    pub fn leader(&self) -> usize {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn cards(&self) -> Vec<Card> {
        self.plays.iter().map(|play| play.card).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.seats
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn play(&mut self, seat: usize, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        self.plays.push(Play { seat, card });
        Ok(())
    }

    pub fn winner(&self, trump: Option<Suit>) -> Option<usize> {
        if !self.is_complete() {
            return None;
        }
        let cards = self.cards();
        trick_winner(&cards, trump).map(|position| self.plays[position].seat)
    }

    pub fn expected_seat(&self) -> usize {
        self.plays
            .last()
            .map(|play| (play.seat + 1) % self.seats)
            .unwrap_or(self.leader)
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError, trick_winner};
    use crate::model::card::Card;
    use crate::model::suit::Suit;

    fn cards(text: &[&str]) -> Vec<Card> {
        text.iter().map(|c| c.parse().expect("valid card")).collect()
    }

    #[test]
    fn trump_beats_higher_ranks_of_lead_suit() {
        assert_eq!(trick_winner(&cards(&["5H", "KH", "2S"]), Some(Suit::Spades)), Some(2));
    }

    #[test]
    fn higher_rank_of_same_suit_wins_without_trump() {
        assert_eq!(trick_winner(&cards(&["5H", "KH"]), Some(Suit::Diamonds)), Some(1));
        assert_eq!(trick_winner(&cards(&["5H", "KH"]), None), Some(1));
    }

    #[test]
    fn off_suit_discard_never_wins() {
        assert_eq!(trick_winner(&cards(&["9C", "AD", "2C"]), Some(Suit::Hearts)), Some(0));
    }

    #[test]
    fn higher_trump_overtakes_lower_trump() {
        assert_eq!(
            trick_winner(&cards(&["AC", "3S", "JS", "KC"]), Some(Suit::Spades)),
            Some(2)
        );
    }

    #[test]
    fn empty_trick_has_no_winner() {
        assert_eq!(trick_winner(&[], Some(Suit::Clubs)), None);
    }

    #[test]
    fn plays_follow_turn_order_and_wrap() {
        let mut trick = Trick::new(2, 3);
        trick.play(2, "2C".parse().unwrap()).unwrap();
        assert!(matches!(
            trick.play(1, "3C".parse().unwrap()),
            Err(TrickError::OutOfTurn { expected: 0, actual: 1 })
        ));
        trick.play(0, "KC".parse().unwrap()).unwrap();
        trick.play(1, "QC".parse().unwrap()).unwrap();
        assert!(trick.is_complete());
        assert_eq!(trick.winner(None), Some(0));
        assert_eq!(
            trick.play(2, "4C".parse().unwrap()),
            Err(TrickError::TrickComplete)
        );
    }

    #[test]
    fn winner_maps_position_back_to_seat() {
        let mut trick = Trick::new(1, 2);
        trick.play(1, "10D".parse().unwrap()).unwrap();
        trick.play(0, "2H".parse().unwrap()).unwrap();
        assert_eq!(trick.lead_suit(), Some(Suit::Diamonds));
        assert_eq!(trick.winner(Some(Suit::Hearts)), Some(0));
        assert_eq!(trick.winner(Some(Suit::Clubs)), Some(1));
    }
}
