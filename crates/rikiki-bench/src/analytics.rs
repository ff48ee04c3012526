use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::tournament::{MatchOutcome, RoundOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Folds per-round outcomes into per-agent reports.
pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }
        Self {
            agents,
            agent_order: order,
        }
    }

    pub fn record_round(&mut self, outcome: &RoundOutcome) -> Result<(), AnalyticsError> {
        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.record_round(seat.score, seat.bid == seat.tricks);
            acc.total_latency_ms += seat.metrics.total_ms;
            acc.total_decisions += u64::from(seat.metrics.decisions);
        }
        Ok(())
    }

    /// Books a finished match; every agent sharing the top total is a winner.
    pub fn record_match(&mut self, outcome: &MatchOutcome) -> Result<(), AnalyticsError> {
        let best = outcome.totals.iter().map(|(_, total)| *total).max();
        for (name, total) in &outcome.totals {
            let acc = self
                .agents
                .get_mut(name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(name.clone()))?;
            acc.matches += 1;
            if Some(*total) == best {
                acc.match_wins += 1;
            }
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let agents = self
            .agent_order
            .iter()
            .filter_map(|name| self.agents.remove(name))
            .map(AgentAccumulator::into_report)
            .collect();
        AnalyticsSummary { agents }
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    matches: u32,
    match_wins: u32,
    rounds: u32,
    exact_bids: u32,
    total_score: i64,
    per_round_scores: Vec<f64>,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            matches: 0,
            match_wins: 0,
            rounds: 0,
            exact_bids: 0,
            total_score: 0,
            per_round_scores: Vec::new(),
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_round(&mut self, score: i32, exact: bool) {
        self.rounds += 1;
        self.total_score += i64::from(score);
        self.per_round_scores.push(f64::from(score));
        if exact {
            self.exact_bids += 1;
        }
    }

    fn into_report(self) -> AgentReport {
        let avg_round_score = if self.rounds == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.rounds)
        };
        let exact_bid_rate = if self.rounds == 0 {
            0.0
        } else {
            f64::from(self.exact_bids) / f64::from(self.rounds)
        };
        let average_ms_per_decision = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            ci95: confidence_interval(&self.per_round_scores),
            name: self.name,
            kind: self.kind,
            matches: self.matches as usize,
            match_wins: self.match_wins as usize,
            rounds: self.rounds as usize,
            total_score: self.total_score,
            avg_round_score,
            exact_bid_rate,
            average_ms_per_decision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub matches: usize,
    pub match_wins: usize,
    pub rounds: usize,
    pub total_score: i64,
    pub avg_round_score: f64,
    pub ci95: (f64, f64),
    pub exact_bid_rate: f64,
    pub average_ms_per_decision: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub agents: Vec<AgentReport>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str("| Agent | Kind | Matches | Match Wins | Rounds | Total | Avg/Round | 95% CI | Exact Bids | Avg ms/decision |\n");
        rows.push_str("|-------|------|---------|------------|--------|-------|-----------|--------|------------|-----------------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {matches} | {wins} | {rounds} | {total} | {avg:.3} | [{ci_low:.3}, {ci_high:.3}] | {exact:.1}% | {latency:.2} |\n",
                name = agent.name,
                kind = agent.kind,
                matches = agent.matches,
                wins = agent.match_wins,
                rounds = agent.rounds,
                total = agent.total_score,
                avg = agent.avg_round_score,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                exact = agent.exact_bid_rate * 100.0,
                latency = agent.average_ms_per_decision,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
