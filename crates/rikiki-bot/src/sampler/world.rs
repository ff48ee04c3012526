//! Hidden-deal sampling consistent with what one seat has observed.

use rand::Rng;
use rand::seq::SliceRandom;
use rikiki_core::model::card::Card;
use rikiki_core::model::card_set::CardSet;
use rikiki_core::model::deck::Deck;
use rikiki_core::model::hand::Hand;
use rikiki_core::model::suit::Suit;
use rikiki_core::model::trick::Trick;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    /// Every attempt left some player short of cards. Only the current
    /// repetition is discarded.
    #[error("no consistent deal found after {attempts} attempts")]
    Exhausted { attempts: usize },
    #[error("seat {seat} is not at a {players}-player table")]
    SeatOutOfRange { seat: usize, players: usize },
    #[error("card {0} appears more than once in the known cards")]
    DuplicateCard(Card),
    #[error("seat {seat} holds more than {hand_size} known cards")]
    InconsistentHandSize { seat: usize, hand_size: usize },
    #[error("{needed} hidden cards required but only {available} remain")]
    NotEnoughCards { needed: usize, available: usize },
}

/// Everything one seat knows about the deal of the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownCards {
    seat: usize,
    /// The advised seat's cards at the start of the round.
    own: Hand,
    /// Cards each seat has already played. Empty for the advised seat.
    shown: Vec<Vec<Card>>,
    voids: Vec<[bool; 4]>,
    seen: CardSet,
}

impl KnownCards {
    /// Knowledge before any card is played: just the private hand.
    pub fn new(players: usize, seat: usize, hand: &Hand) -> Result<Self, SamplingError> {
        if seat >= players {
            return Err(SamplingError::SeatOutOfRange { seat, players });
        }
        let mut seen = CardSet::empty();
        for &card in hand.cards() {
            if !seen.insert(card) {
                return Err(SamplingError::DuplicateCard(card));
            }
        }
        Ok(Self {
            seat,
            own: hand.clone(),
            shown: vec![Vec::new(); players],
            voids: vec![[false; 4]; players],
            seen,
        })
    }

    /// Knowledge partway through a round.
    ///
    /// `hand` holds the cards the seat still has; its own plays are folded
    /// back in so `own_hand` is the full hand it was dealt. A seat that did
    /// not follow the led suit is recorded as void in it.
    pub fn from_history(
        players: usize,
        seat: usize,
        hand: &Hand,
        completed: &[Trick],
        current: &Trick,
    ) -> Result<Self, SamplingError> {
        let mut known = Self::new(players, seat, hand)?;
        for trick in completed.iter().chain(std::iter::once(current)) {
            let lead = trick.lead_suit();
            for play in trick.plays() {
                known.observe(play.seat, play.card, lead)?;
            }
        }
        Ok(known)
    }

    fn observe(&mut self, seat: usize, card: Card, lead: Option<Suit>) -> Result<(), SamplingError> {
        let players = self.players();
        if seat >= players {
            return Err(SamplingError::SeatOutOfRange { seat, players });
        }
        if !self.seen.insert(card) {
            return Err(SamplingError::DuplicateCard(card));
        }
        if seat == self.seat {
            self.own.add(card);
            return Ok(());
        }
        self.shown[seat].push(card);
        if let Some(lead) = lead.filter(|&suit| suit != card.suit) {
            self.voids[seat][lead.index()] = true;
        }
        Ok(())
    }

    pub fn players(&self) -> usize {
        self.shown.len()
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn own_hand(&self) -> &Hand {
        &self.own
    }

    pub fn shown(&self, seat: usize) -> &[Card] {
        self.shown.get(seat).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_void(&self, seat: usize, suit: Suit) -> bool {
        self.voids.get(seat).is_some_and(|suits| suits[suit.index()])
    }

    /// Forgets inferred voids; sampling then only respects card ownership.
    pub fn without_voids(mut self) -> Self {
        for suits in &mut self.voids {
            *suits = [false; 4];
        }
        self
    }

    /// Cards whose owner is known.
    pub fn seen(&self) -> CardSet {
        self.seen
    }
}

/// Deals the unseen cards so every player ends with `hand_size` cards for the
/// round, never handing a player a suit they are known to be void in.
///
/// The returned hands are full round hands, already-played cards included.
pub fn sample_hands<R: Rng + ?Sized>(
    known: &KnownCards,
    hand_size: usize,
    rng: &mut R,
    max_attempts: usize,
) -> Result<Vec<Hand>, SamplingError> {
    let players = known.players();
    if known.own.len() != hand_size {
        return Err(SamplingError::InconsistentHandSize {
            seat: known.seat,
            hand_size,
        });
    }
    let mut needed = 0usize;
    for seat in (0..players).filter(|&seat| seat != known.seat) {
        let shown = known.shown(seat).len();
        if shown > hand_size {
            return Err(SamplingError::InconsistentHandSize { seat, hand_size });
        }
        needed += hand_size - shown;
    }

    let mut pool = Deck::without(&known.seen).cards().to_vec();
    if needed > pool.len() {
        return Err(SamplingError::NotEnoughCards {
            needed,
            available: pool.len(),
        });
    }

    let mut opponents: Vec<usize> = (0..players).filter(|&seat| seat != known.seat).collect();
    let attempts = max_attempts.max(1);
    for _ in 0..attempts {
        pool.shuffle(rng);
        opponents.shuffle(rng);
        if let Some(hands) = deal_once(known, hand_size, &pool, &opponents) {
            return Ok(hands);
        }
    }
    Err(SamplingError::Exhausted { attempts })
}

fn deal_once(
    known: &KnownCards,
    hand_size: usize,
    pool: &[Card],
    opponents: &[usize],
) -> Option<Vec<Hand>> {
    let mut hands: Vec<Vec<Card>> = (0..known.players())
        .map(|seat| {
            if seat == known.seat {
                known.own.cards().to_vec()
            } else {
                known.shown(seat).to_vec()
            }
        })
        .collect();
    let mut open = opponents
        .iter()
        .filter(|&&seat| hands[seat].len() < hand_size)
        .count();

    for &card in pool {
        if open == 0 {
            break;
        }
        let taker = opponents
            .iter()
            .copied()
            .find(|&seat| hands[seat].len() < hand_size && !known.is_void(seat, card.suit));
        if let Some(seat) = taker {
            hands[seat].push(card);
            if hands[seat].len() == hand_size {
                open -= 1;
            }
        }
    }

    (open == 0).then(|| hands.into_iter().map(Hand::with_cards).collect())
}
