/// Round score for one player: `10 + 2 * bid` on an exact hit, otherwise
/// `-2` per trick of difference.
pub fn round_score(tricks: u8, bid: u8) -> i32 {
    let tricks = i32::from(tricks);
    let bid = i32::from(bid);
    if tricks == bid {
        10 + 2 * bid
    } else {
        -2 * (tricks - bid).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: Vec<i32>,
}

impl ScoreBoard {
    pub fn new(players: usize) -> Self {
        Self {
            totals: vec![0; players],
        }
    }

    pub fn add(&mut self, player: usize, points: i32) {
        self.totals[player] += points;
    }

    pub fn score(&self, player: usize) -> i32 {
        self.totals[player]
    }

    pub fn standings(&self) -> &[i32] {
        &self.totals
    }
}
