use crate::game::round::{RoundError, RoundState};
use crate::game::schedule::RoundSchedule;
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A full match across a hand-size schedule.
///
/// Scores are indexed by agent. Seats rotate every round so that the agent
/// who bid second in round `r` bids first in round `r + 1`.
#[derive(Debug, Clone)]
pub struct MatchState {
    players: usize,
    schedule: RoundSchedule,
    scores: ScoreBoard,
    round_index: usize,
    current_round: Option<RoundState>,
    rng: StdRng,
    seed: u64,
}

impl MatchState {
    pub fn with_seed(
        players: usize,
        schedule: RoundSchedule,
        seed: u64,
    ) -> Result<Self, RoundError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let current_round = match schedule.hand_size(0) {
            Some(size) => Some(RoundState::deal(players, size, &mut rng)?),
            None => None,
        };
        Ok(Self {
            players,
            schedule,
            scores: ScoreBoard::new(players),
            round_index: 0,
            current_round,
            rng,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    pub fn schedule(&self) -> &RoundSchedule {
        &self.schedule
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.current_round.as_ref()
    }

    pub fn round_mut(&mut self) -> Option<&mut RoundState> {
        self.current_round.as_mut()
    }

    pub fn is_finished(&self) -> bool {
        self.current_round.is_none()
    }

    /// Seat held by `agent` in the current round.
    pub fn seat_of(&self, agent: usize) -> usize {
        (agent + self.players - self.round_index % self.players) % self.players
    }

    /// Agent sitting at `seat` in the current round.
    pub fn agent_at(&self, seat: usize) -> usize {
        (seat + self.round_index) % self.players
    }

    /// Books the finished round's scores and deals the next round, if any.
    /// Returns the per-agent scores of the finished round.
    pub fn finish_round_and_start_next(&mut self) -> Result<Option<Vec<i32>>, RoundError> {
        let Some(seat_scores) = self.current_round.as_ref().and_then(RoundState::round_scores)
        else {
            return Ok(None);
        };

        let mut agent_scores = vec![0; self.players];
        for (seat, points) in seat_scores.into_iter().enumerate() {
            let agent = self.agent_at(seat);
            agent_scores[agent] = points;
            self.scores.add(agent, points);
        }

        self.round_index += 1;
        self.current_round = match self.schedule.hand_size(self.round_index) {
            Some(size) => Some(RoundState::deal(self.players, size, &mut self.rng)?),
            None => None,
        };
        Ok(Some(agent_scores))
    }
}
