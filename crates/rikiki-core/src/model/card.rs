use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Dense index in `0..52`, suit-major.
    pub const fn index(self) -> usize {
        self.suit.index() * 13 + (self.rank.value() as usize - 2)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        let Some(suit) = Suit::from_index(index / 13) else {
            return None;
        };
        match Rank::from_value((index % 13) as u8 + 2) {
            Some(rank) => Some(Self { rank, suit }),
            None => None,
        }
    }
}

// Ordering is for stable sorting only (suit, then rank). Trick resolution
// goes through `trick_winner`.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.suit.cmp(&other.suit).then(self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card '{}'", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut chars = text.chars();
        let suit = chars
            .next_back()
            .and_then(Suit::from_char)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let rank = Rank::from_symbol(chars.as_str()).ok_or_else(|| ParseCardError(s.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn parses_text_form() {
        assert_eq!("10H".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Hearts)));
        assert_eq!("as".parse::<Card>(), Ok(Card::new(Rank::Ace, Suit::Spades)));
        assert_eq!("6D".parse::<Card>(), Ok(Card::new(Rank::Six, Suit::Diamonds)));
        assert!("1H".parse::<Card>().is_err());
        assert!("QX".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let card = Card::new(Rank::Jack, Suit::Clubs);
        assert_eq!(card.to_string(), "JC");
        assert_eq!(card.to_string().parse::<Card>(), Ok(card));
    }

    #[test]
    fn index_covers_deck_without_gaps() {
        for index in 0..52 {
            let card = Card::from_index(index).expect("index in range");
            assert_eq!(card.index(), index);
        }
        assert_eq!(Card::from_index(52), None);
    }

    #[test]
    fn serializes_as_text() {
        let card = Card::new(Rank::King, Suit::Hearts);
        let json = serde_json::to_string(&card).expect("serialize");
        assert_eq!(json, "\"KH\"");
        let back: Card = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, card);
    }

    #[test]
    fn ordering_is_suit_then_rank() {
        let low_spade = Card::new(Rank::Two, Suit::Spades);
        let high_diamond = Card::new(Rank::Ace, Suit::Diamonds);
        assert!(high_diamond < low_spade);
    }
}
