use rand::SeedableRng;
use rand::rngs::StdRng;
use rikiki_bot::search::{
    RootState, ScoreObjective, TableConfig, TrickObjective, build_tree, legal_moves,
    prune_dominated, resolve,
};
use rikiki_bot::{
    BidContext, BidRequest, EngineParams, NashPolicy, PlayContext, Policy, RandomPolicy,
    estimate_bid,
};
use rikiki_core::game::round::RoundState;
use rikiki_core::model::card::Card;
use rikiki_core::model::card_set::CardSet;
use rikiki_core::model::hand::Hand;
use rikiki_core::model::suit::Suit;

fn card(text: &str) -> Card {
    text.parse().expect("valid card")
}

fn hand(text: &[&str]) -> Hand {
    text.iter().map(|c| card(c)).collect()
}

#[test]
fn one_card_heads_up_bids_are_zero_or_one() {
    let hand = hand(&["6D"]);
    let request = BidRequest {
        hand: &hand,
        trump: Some(Suit::Hearts),
        seat: 0,
        bids: &[None, None],
    };
    let params = EngineParams::default().with_repetitions(300);
    let estimate = estimate_bid(&request, &params, &mut StdRng::seed_from_u64(2024)).unwrap();
    assert!(!estimate.is_empty());
    assert!(estimate.frequencies.keys().all(|bid| [0, 1].contains(bid)));
    // 6D loses to any trump, any higher diamond and nothing else.
    assert!(estimate.frequencies.get(&1).copied().unwrap_or(0) > estimate.frequencies.get(&0).copied().unwrap_or(0));
}

#[test]
fn zero_repetitions_never_raise() {
    let hand = hand(&["6D", "7C"]);
    let request = BidRequest {
        hand: &hand,
        trump: None,
        seat: 2,
        bids: &[Some(0), Some(2), None],
    };
    let params = EngineParams::default().with_repetitions(0);
    let estimate = estimate_bid(&request, &params, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(estimate.is_empty());
}

#[test]
fn pruned_tree_is_deterministic_without_ties() {
    // Every seat's choice strictly changes its own trick count, so the
    // resolved root does not depend on the tie-breaking rng.
    let config = TableConfig {
        players: 2,
        trump: Some(Suit::Spades),
    };
    let hands = vec![hand(&["AH"]), hand(&["KH"])];
    let mut values = Vec::new();
    for seed in 0..5 {
        let mut tree = build_tree(&config, &hands, &RootState::round_start(2), 2).unwrap();
        let ties = resolve(&mut tree, &TrickObjective, &mut StdRng::seed_from_u64(seed));
        assert_eq!(ties, 0);
        values.push(tree.root_value().to_vec());
    }
    assert!(values.iter().all(|v| v == &[1, 0]));
}

#[test]
fn score_leaves_follow_round_scoring() {
    let config = TableConfig {
        players: 2,
        trump: Some(Suit::Spades),
    };
    let hands = vec![hand(&["AH", "KH"]), hand(&["2H", "3H"])];
    let bids = [2u8, 2u8];
    let mut tree = build_tree(&config, &hands, &RootState::round_start(2), 4).unwrap();
    resolve(&mut tree, &ScoreObjective::new(&bids), &mut StdRng::seed_from_u64(0));
    assert_eq!(tree.root_value(), &[14, -4]);
}

#[test]
fn hopeless_follower_discards_lowest() {
    let trick = [card("AS")];
    let legal = legal_moves(
        &[card("3S"), card("9S"), card("KD")],
        Some(Suit::Spades),
        &CardSet::empty(),
    );
    assert_eq!(legal, vec![card("3S"), card("9S")]);
    assert_eq!(prune_dominated(&trick, &legal, Some(Suit::Hearts)), vec![card("3S")]);
}

#[test]
fn nash_and_random_finish_a_round() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut round = RoundState::deal(3, 3, &mut rng).unwrap();
    let params = EngineParams::default().with_repetitions(25);
    let mut seats: Vec<Box<dyn Policy>> = vec![
        Box::new(NashPolicy::new(params.clone(), 1).unwrap()),
        Box::new(RandomPolicy::new(2)),
        Box::new(NashPolicy::new(params, 3).unwrap()),
    ];

    while let Some(seat) = round.next_bidder() {
        let bid = {
            let ctx = BidContext::from_round(&round, seat).unwrap();
            let bid = seats[seat].choose_bid(&ctx).unwrap();
            assert!(ctx.allowed.contains(&bid));
            bid
        };
        round.place_bid(seat, bid).unwrap();
    }
    while let Some(seat) = round.next_to_play() {
        let card = {
            let ctx = PlayContext::from_round(&round, seat).unwrap();
            let card = seats[seat].choose_play(&ctx).unwrap();
            assert!(ctx.legal.contains(&card));
            card
        };
        round.play_card(seat, card).unwrap();
    }

    let scores = round.round_scores().unwrap();
    assert_eq!(scores.len(), 3);
    assert_eq!(round.tricks_won().iter().map(|&t| usize::from(t)).sum::<usize>(), 3);
}
