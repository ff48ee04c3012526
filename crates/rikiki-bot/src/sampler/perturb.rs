use rand::Rng;

/// Chance of nudging the bid at `index` of a `len`-seat table.
///
/// The last bidder is the least free to choose, so their bid moves twice as
/// often.
fn nudge_probability(index: usize, len: usize, p: f64) -> f64 {
    if index + 1 == len {
        (2.0 * p).min(1.0)
    } else {
        p
    }
}

/// Copies `bids`, moving each committed bid by one with probability `p`.
///
/// Increments and decrements are equally likely; decrements stop at zero.
/// Unset bids stay unset. `p` must lie within `[0, 1]`.
pub fn perturb_bids<R: Rng + ?Sized>(bids: &[Option<u8>], p: f64, rng: &mut R) -> Vec<Option<u8>> {
    let len = bids.len();
    bids.iter()
        .enumerate()
        .map(|(index, bid)| {
            bid.map(|value| {
                if rng.gen_bool(nudge_probability(index, len, p)) {
                    if rng.gen_bool(0.5) {
                        value.saturating_add(1)
                    } else {
                        value.saturating_sub(1)
                    }
                } else {
                    value
                }
            })
        })
        .collect()
}

/// True when every committed bid equals the predicted trick count.
pub fn matches_committed(bids: &[Option<u8>], predicted: &[i32]) -> bool {
    bids.iter()
        .zip(predicted)
        .all(|(bid, &tricks)| bid.is_none_or(|value| i32::from(value) == tricks))
}

/// Plausibility filter for a sampled deal.
///
/// Accepts when the predicted trick counts agree on every committed slot with
/// either the literal bids or a freshly perturbed copy of them.
pub fn is_plausible<R: Rng + ?Sized>(
    bids: &[Option<u8>],
    predicted: &[i32],
    p: f64,
    rng: &mut R,
) -> bool {
    matches_committed(bids, predicted) || matches_committed(&perturb_bids(bids, p, rng), predicted)
}

#[cfg(test)]
mod tests {
    use super::{is_plausible, matches_committed, nudge_probability, perturb_bids};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_probability_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let bids = [Some(2), None, Some(0)];
        assert_eq!(perturb_bids(&bids, 0.0, &mut rng), bids.to_vec());
    }

    #[test]
    fn last_seat_moves_twice_as_often() {
        assert_eq!(nudge_probability(0, 3, 0.2), 0.2);
        assert!((nudge_probability(2, 3, 0.2) - 0.4).abs() < 1e-12);
        assert_eq!(nudge_probability(2, 3, 0.8), 1.0);
    }

    #[test]
    fn certain_perturbation_moves_by_exactly_one() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let out = perturb_bids(&[Some(3), None], 1.0, &mut rng);
            assert!(out[0] == Some(2) || out[0] == Some(4));
            assert_eq!(out[1], None);
        }
    }

    #[test]
    fn decrement_saturates_at_zero() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let out = perturb_bids(&[Some(0)], 1.0, &mut rng);
            assert!(out[0] == Some(0) || out[0] == Some(1));
        }
    }

    #[test]
    fn unset_slots_never_constrain() {
        assert!(matches_committed(&[None, None], &[3, 0]));
        assert!(matches_committed(&[Some(1), None], &[1, 7]));
        assert!(!matches_committed(&[Some(1), None], &[0, 1]));
    }

    #[test]
    fn literal_match_is_always_plausible() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(is_plausible(&[Some(1), Some(0)], &[1, 0], 1.0, &mut rng));
    }

    #[test]
    fn far_misses_are_never_plausible() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert!(!is_plausible(&[Some(3), None], &[0, 3], 1.0, &mut rng));
        }
    }

    #[test]
    fn off_by_one_is_sometimes_plausible() {
        let mut rng = StdRng::seed_from_u64(3);
        let accepted = (0..200)
            .filter(|_| is_plausible(&[Some(2), None], &[1, 1], 0.5, &mut rng))
            .count();
        assert!(accepted > 0 && accepted < 200);
    }
}
