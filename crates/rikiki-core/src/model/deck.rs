use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

/// Hands dealt to seats `0..n` plus the trump suit turned up afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: Vec<Hand>,
    pub trump: Option<Suit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    NotEnoughCards { requested: usize, available: usize },
    NoPlayers,
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::NotEnoughCards {
                requested,
                available,
            } => write!(
                f,
                "cannot deal {requested} cards from {available} undealt cards"
            ),
            DealError::NoPlayers => write!(f, "cannot deal to zero players"),
        }
    }
}

impl std::error::Error for DealError {}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// Standard deck minus the excluded cards, in standard order.
    pub fn without(excluded: &CardSet) -> Self {
        let mut deck = Self::standard();
        deck.cards.retain(|card| !excluded.contains(*card));
        deck
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deals `hand_size` cards to each of `players` seats round-robin from the
    /// top of the deck. The suit of the next card becomes trump; when every
    /// card is dealt there is no trump.
    pub fn deal(&self, players: usize, hand_size: usize) -> Result<Deal, DealError> {
        if players == 0 {
            return Err(DealError::NoPlayers);
        }
        let requested = players * hand_size;
        if requested > self.cards.len() {
            return Err(DealError::NotEnoughCards {
                requested,
                available: self.cards.len(),
            });
        }

        let mut hands = vec![Vec::with_capacity(hand_size); players];
        for (index, card) in self.cards[..requested].iter().enumerate() {
            hands[index % players].push(*card);
        }

        Ok(Deal {
            hands: hands.into_iter().map(Hand::with_cards).collect(),
            trump: self.cards.get(requested).map(|card| card.suit),
        })
    }
}
