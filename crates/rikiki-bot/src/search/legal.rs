use rikiki_core::model::card::Card;
use rikiki_core::model::card_set::CardSet;
use rikiki_core::model::suit::Suit;
use rikiki_core::model::trick::trick_winner;

/// Cards from `hand` that may be played, skipping anything in `excluded`.
///
/// With a lead suit the player must follow when able; otherwise (or when void)
/// any remaining card is allowed.
pub fn legal_moves(hand: &[Card], lead: Option<Suit>, excluded: &CardSet) -> Vec<Card> {
    let available = hand.iter().copied().filter(|card| !excluded.contains(*card));
    if let Some(lead) = lead {
        let following: Vec<Card> = available.clone().filter(|card| card.suit == lead).collect();
        if !following.is_empty() {
            return following;
        }
    }
    available.collect()
}

/// Narrows `legal` to the single lowest card when none of them can take the
/// trick away from its current winner; otherwise returns `legal` unchanged.
pub fn prune_dominated(trick: &[Card], legal: &[Card], trump: Option<Suit>) -> Vec<Card> {
    if trick.is_empty() || legal.len() <= 1 {
        return legal.to_vec();
    }
    let Some(position) = trick_winner(trick, trump) else {
        return legal.to_vec();
    };
    let leader = trick[position];

    let can_win = legal
        .iter()
        .any(|card| trick_winner(&[leader, *card], trump) == Some(1));
    if can_win {
        return legal.to_vec();
    }

    legal
        .iter()
        .copied()
        .min_by_key(|card| (card.rank, card.suit))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{legal_moves, prune_dominated};
    use rikiki_core::model::card::Card;
    use rikiki_core::model::card_set::CardSet;
    use rikiki_core::model::suit::Suit;

    fn cards(text: &[&str]) -> Vec<Card> {
        text.iter().map(|c| c.parse().expect("valid card")).collect()
    }

    #[test]
    fn must_follow_lead_suit_when_able() {
        let hand = cards(&["2H", "9H", "AS"]);
        let legal = legal_moves(&hand, Some(Suit::Hearts), &CardSet::empty());
        assert_eq!(legal, cards(&["2H", "9H"]));
    }

    #[test]
    fn void_in_lead_suit_allows_any_card() {
        let hand = cards(&["2C", "AS"]);
        let legal = legal_moves(&hand, Some(Suit::Hearts), &CardSet::empty());
        assert_eq!(legal, hand);
    }

    #[test]
    fn excluded_cards_are_never_offered() {
        let hand = cards(&["2H", "9H", "AS"]);
        let excluded: CardSet = cards(&["2H", "9H"]).into_iter().collect();
        let legal = legal_moves(&hand, Some(Suit::Hearts), &excluded);
        assert_eq!(legal, cards(&["AS"]));
    }

    #[test]
    fn leading_player_keeps_every_card() {
        let hand = cards(&["2H", "9C"]);
        assert_eq!(legal_moves(&hand, None, &CardSet::empty()), hand);
        assert_eq!(prune_dominated(&[], &hand, Some(Suit::Spades)), hand);
    }

    #[test]
    fn hopeless_follower_discards_lowest_card() {
        let trick = cards(&["AH"]);
        let legal = cards(&["3H", "QH", "7H"]);
        let pruned = prune_dominated(&trick, &legal, Some(Suit::Clubs));
        assert_eq!(pruned, cards(&["3H"]));
        assert!(legal.contains(&pruned[0]));
    }

    #[test]
    fn hopeless_discard_picks_lowest_rank_across_suits() {
        let trick = cards(&["5H", "2S"]);
        let legal = cards(&["9C", "4D", "KD"]);
        assert_eq!(prune_dominated(&trick, &legal, Some(Suit::Spades)), cards(&["4D"]));
    }

    #[test]
    fn possible_winner_keeps_full_choice() {
        let trick = cards(&["5H", "KH"]);
        let legal = cards(&["2H", "AH"]);
        assert_eq!(prune_dominated(&trick, &legal, Some(Suit::Diamonds)), legal);
    }

    #[test]
    fn trump_discard_counts_as_a_possible_win() {
        let trick = cards(&["AH"]);
        let legal = cards(&["2S", "KC"]);
        assert_eq!(prune_dominated(&trick, &legal, Some(Suit::Spades)), legal);
    }
}
