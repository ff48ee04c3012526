mod agents;

pub use agents::AgentError;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use agents::AgentBlueprint;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use rikiki_bot::policy::{BidContext, PlayContext, Policy};
use rikiki_bot::EngineError;
use rikiki_core::game::match_state::MatchState;
use rikiki_core::game::round::{RoundError, RoundState};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub rounds_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        if agents.len() < 2 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute the tournament, streaming one JSONL row per agent per round.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut rows_written = 0usize;
        let mut rounds_played = 0usize;

        for match_index in 0..self.config.matches.count {
            let match_seed = rng.next_u64();
            let outcome = self.play_match(match_index, match_seed, |round| {
                analytics.record_round(round)?;
                rows_written += write_round_rows(&mut writer, &self.config.run_id, round)?;
                rounds_played += 1;
                Ok(())
            })?;
            analytics.record_match(&outcome)?;
        }

        writer.flush()?;
        analytics.finalize().write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            matches_played: self.config.matches.count,
            rounds_played,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_match<F>(
        &self,
        match_index: usize,
        match_seed: u64,
        mut on_round: F,
    ) -> Result<MatchOutcome, RunnerError>
    where
        F: FnMut(&RoundOutcome) -> Result<(), RunnerError>,
    {
        let players = self.agents.len();
        let mut state = MatchState::with_seed(players, self.config.schedule.build(), match_seed)?;
        let mut policy_rng = StdRng::seed_from_u64(match_seed);
        let mut seats = self
            .agents
            .iter()
            .map(|agent| {
                Ok(AgentState {
                    name: agent.name.clone(),
                    policy: agent.spawn_policy(policy_rng.next_u64())?,
                    metrics: DecisionMetrics::default(),
                })
            })
            .collect::<Result<Vec<_>, RunnerError>>()?;

        while !state.is_finished() {
            let round_index = state.round_index();
            let agent_at: Vec<usize> = (0..players).map(|seat| state.agent_at(seat)).collect();
            let round = state
                .round_mut()
                .ok_or_else(|| RunnerError::game("match has no round in progress".to_string()))?;

            play_round(round, &agent_at, &mut seats)?;

            let seat_results = agent_at
                .iter()
                .enumerate()
                .map(|(seat, &agent)| {
                    let score = round
                        .round_scores()
                        .and_then(|scores| scores.get(seat).copied())
                        .unwrap_or(0);
                    SeatResult {
                        agent_name: seats[agent].name.clone(),
                        seat,
                        bid: round.bids()[seat].unwrap_or(0),
                        tricks: round.tricks_won()[seat],
                        score,
                        metrics: std::mem::take(&mut seats[agent].metrics).finalize(),
                    }
                })
                .collect();
            let outcome = RoundOutcome {
                match_index,
                match_seed,
                round_index,
                hand_size: round.hand_size(),
                trump: round.trump().map(|suit| suit.to_string()),
                seat_results,
            };

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                let scores = outcome
                    .seat_results
                    .iter()
                    .map(|seat| format!("{}:{}", seat.agent_name, seat.score))
                    .collect::<Vec<_>>()
                    .join(",");
                event!(
                    target: "rikiki_bench::round",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    match_index = match_index as u32,
                    round_index = round_index as u32,
                    hand_size = outcome.hand_size as u32,
                    scores = %scores,
                );
            }

            on_round(&outcome)?;
            state.finish_round_and_start_next()?;
        }

        let totals = seats
            .iter()
            .enumerate()
            .map(|(agent, seat)| (seat.name.clone(), state.scores().score(agent)))
            .collect();
        Ok(MatchOutcome { totals })
    }
}

/// Plays bidding and every trick of one round, asking each seat's agent.
fn play_round(
    round: &mut RoundState,
    agent_at: &[usize],
    agents: &mut [AgentState],
) -> Result<(), RunnerError> {
    while let Some(seat) = round.next_bidder() {
        let agent = &mut agents[agent_at[seat]];
        let bid = {
            let ctx = BidContext::from_round(round, seat)?;
            let start = Instant::now();
            let bid = agent.policy.choose_bid(&ctx)?;
            agent.metrics.record(start.elapsed());
            bid
        };
        round.place_bid(seat, bid).map_err(|err| {
            RunnerError::game(format!("agent '{}' bid {bid} at seat {seat}: {err}", agent.name))
        })?;
    }

    while let Some(seat) = round.next_to_play() {
        let agent = &mut agents[agent_at[seat]];
        let card = {
            let ctx = PlayContext::from_round(round, seat)?;
            let start = Instant::now();
            let card = agent.policy.choose_play(&ctx)?;
            agent.metrics.record(start.elapsed());
            card
        };
        round.play_card(seat, card).map_err(|err| {
            RunnerError::game(format!(
                "agent '{}' played {card} at seat {seat}: {err}",
                agent.name
            ))
        })?;
    }
    Ok(())
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_round_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    outcome: &RoundOutcome,
) -> Result<usize, RunnerError> {
    let round_id = format!("M{:05}_R{:02}", outcome.match_index, outcome.round_index);
    let mut rows_written = 0usize;
    for seat in &outcome.seat_results {
        let row = RoundLogRow {
            run_id: run_id.to_string(),
            round_id: round_id.clone(),
            match_index: outcome.match_index,
            match_seed: outcome.match_seed,
            round_index: outcome.round_index,
            hand_size: outcome.hand_size,
            trump: outcome.trump.clone(),
            seat: seat.seat,
            bot: seat.agent_name.clone(),
            bid: seat.bid,
            tricks: seat.tricks,
            score: seat.score,
            decisions: seat.metrics.decisions,
            speed_ms_decision: seat.metrics.avg_ms_per_decision,
        };
        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }
    Ok(rows_written)
}

struct AgentState {
    name: String,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

pub struct RoundOutcome {
    pub match_index: usize,
    pub match_seed: u64,
    pub round_index: usize,
    pub hand_size: usize,
    pub trump: Option<String>,
    pub seat_results: Vec<SeatResult>,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: usize,
    pub bid: u8,
    pub tricks: u8,
    pub score: i32,
    pub metrics: DecisionSummary,
}

/// Final cumulative score of each agent.
pub struct MatchOutcome {
    pub totals: Vec<(String, i32)>,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct RoundLogRow {
    run_id: String,
    round_id: String,
    match_index: usize,
    match_seed: u64,
    round_index: usize,
    hand_size: usize,
    trump: Option<String>,
    seat: usize,
    bot: String,
    bid: u8,
    tricks: u8,
    score: i32,
    decisions: u32,
    speed_ms_decision: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("round setup failed: {0}")]
    Round(#[from] RoundError),
    #[error("decision engine failed: {0}")]
    Engine(#[from] EngineError),
    #[error("configuration requires at least 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecisionMetrics, play_round};
    use crate::config::AgentKind;
    use crate::tournament::agents::AgentBlueprint;
    use crate::tournament::AgentState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rikiki_core::game::round::RoundState;
    use std::time::Duration;

    #[test]
    fn metrics_average_over_decisions() {
        let mut metrics = DecisionMetrics::default();
        metrics.record(Duration::from_millis(4));
        metrics.record(Duration::from_millis(2));
        let summary = metrics.finalize();
        assert_eq!(summary.decisions, 2);
        assert!((summary.avg_ms_per_decision - 3.0).abs() < 1e-9);
    }

    #[test]
    fn random_agents_complete_a_round() {
        let config = crate::config::AgentConfig {
            name: "random".to_string(),
            kind: AgentKind::Random,
            params: serde_yaml::Value::Null,
        };
        let blueprints = AgentBlueprint::from_configs(&[config.clone(), config]).unwrap();
        let mut agents: Vec<AgentState> = blueprints
            .iter()
            .enumerate()
            .map(|(i, bp)| AgentState {
                name: format!("{}-{i}", bp.name),
                policy: bp.spawn_policy(i as u64).unwrap(),
                metrics: DecisionMetrics::default(),
            })
            .collect();
        let mut round = RoundState::deal(2, 3, &mut StdRng::seed_from_u64(8)).unwrap();
        play_round(&mut round, &[0, 1], &mut agents).unwrap();
        assert!(round.round_scores().is_some());
        assert_eq!(agents[0].metrics.decisions + agents[1].metrics.decisions, 2 + 6);
    }
}
