use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs shared by the bid and card estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Sampled deals per decision.
    pub repetitions: usize,
    /// Chance that an opponent's predicted bid is nudged by one.
    pub perturb_probability: f64,
    /// Wall-clock budget; repetitions that would start after it are skipped.
    pub time_budget_ms: Option<u64>,
    /// Spread repetitions across the rayon pool.
    pub parallel: bool,
    /// Keep opponents void in suits they have visibly failed to follow.
    pub respect_voids: bool,
    /// Redraws allowed per repetition before the sample is discarded.
    pub max_sample_attempts: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            repetitions: 1000,
            perturb_probability: 0.2,
            time_budget_ms: None,
            parallel: true,
            respect_voids: true,
            max_sample_attempts: 32,
        }
    }
}

impl EngineParams {
    /// Defaults overridden by `RIKIKI_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_perturb_probability(mut self, probability: f64) -> Self {
        self.perturb_probability = probability;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.perturb_probability.is_finite() || !(0.0..=1.0).contains(&self.perturb_probability) {
            return Err(EngineError::InvalidParams(format!(
                "perturb_probability must be within [0, 1], got {}",
                self.perturb_probability
            )));
        }
        if self.max_sample_attempts == 0 {
            return Err(EngineError::InvalidParams(
                "max_sample_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let repetitions = read("RIKIKI_REPS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(defaults.repetitions);

        let perturb_probability = read("RIKIKI_PERTURB_P")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
            .unwrap_or(defaults.perturb_probability);

        let time_budget_ms = read("RIKIKI_TIME_BUDGET_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .or(defaults.time_budget_ms);

        let parallel = read("RIKIKI_PARALLEL")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(defaults.parallel);

        let respect_voids = read("RIKIKI_RESPECT_VOIDS")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(defaults.respect_voids);

        Self {
            repetitions,
            perturb_probability,
            time_budget_ms,
            parallel,
            respect_voids,
            ..defaults
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON")
}

#[cfg(test)]
mod tests {
    use super::EngineParams;
    use std::collections::HashMap;
    use std::time::Duration;

    fn read_from(pairs: &[(&str, &str)]) -> EngineParams {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineParams::from_reader(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_documented_values() {
        let params = EngineParams::default();
        assert_eq!(params.repetitions, 1000);
        assert!((params.perturb_probability - 0.2).abs() < f64::EPSILON);
        assert!(params.time_budget().is_none());
        assert!(params.parallel);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn reader_overrides_known_keys() {
        let params = read_from(&[
            ("RIKIKI_REPS", "64"),
            ("RIKIKI_PERTURB_P", "0.5"),
            ("RIKIKI_TIME_BUDGET_MS", "250"),
            ("RIKIKI_PARALLEL", "0"),
            ("RIKIKI_RESPECT_VOIDS", "off"),
        ]);
        assert_eq!(params.repetitions, 64);
        assert!((params.perturb_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(params.time_budget(), Some(Duration::from_millis(250)));
        assert!(!params.parallel);
        assert!(!params.respect_voids);
    }

    #[test]
    fn reader_ignores_garbage() {
        let params = read_from(&[("RIKIKI_REPS", "lots"), ("RIKIKI_PERTURB_P", "1.5")]);
        assert_eq!(params, EngineParams::default());
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let params = EngineParams::default().with_perturb_probability(-0.1);
        assert!(params.validate().is_err());
        let params = EngineParams::default().with_perturb_probability(f64::NAN);
        assert!(params.validate().is_err());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let params: EngineParams = serde_json::from_str(r#"{"repetitions": 10}"#).unwrap();
        assert_eq!(params.repetitions, 10);
        assert!(params.respect_voids);
    }
}
