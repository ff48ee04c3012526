use rikiki_bot::{EngineError, EngineParams, NashPolicy, Policy, RandomPolicy};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameters for agent '{name}': {message}")]
    InvalidParams { name: String, message: String },
    #[error("agent '{name}' rejected its engine parameters: {source}")]
    Engine {
        name: String,
        #[source]
        source: EngineError,
    },
}

/// A configured agent from which fresh policies are spawned per match.
pub(crate) struct AgentBlueprint {
    pub(crate) name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Nash(EngineParams),
    Random,
}

impl AgentBlueprint {
    pub(crate) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Nash => AgentImplementation::Nash(nash_params(&config.name, &config.params)?),
            AgentKind::Random => AgentImplementation::Random,
        };
        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    pub(crate) fn spawn_policy(&self, seed: u64) -> Result<Box<dyn Policy>, AgentError> {
        match &self.implementation {
            AgentImplementation::Nash(params) => {
                let policy = NashPolicy::new(params.clone(), seed).map_err(|source| {
                    AgentError::Engine {
                        name: self.name.clone(),
                        source,
                    }
                })?;
                Ok(Box::new(policy.with_name(self.name.clone())))
            }
            AgentImplementation::Random => {
                Ok(Box::new(RandomPolicy::new(seed).with_name(self.name.clone())))
            }
        }
    }
}

/// Engine parameters from the agent's `params` block; missing keys keep their
/// defaults and `RIKIKI_*` environment overrides apply underneath.
fn nash_params(name: &str, params: &serde_yaml::Value) -> Result<EngineParams, AgentError> {
    let base = EngineParams::from_env();
    let Some(mapping) = params.as_mapping() else {
        if params.is_null() {
            return Ok(base);
        }
        return Err(AgentError::InvalidParams {
            name: name.to_string(),
            message: "expected mapping for nash params".to_string(),
        });
    };

    let mut merged = serde_yaml::to_value(&base)
        .ok()
        .and_then(|value| value.as_mapping().cloned())
        .unwrap_or_default();
    for (key, value) in mapping {
        merged.insert(key.clone(), value.clone());
    }

    let params: EngineParams = serde_yaml::from_value(serde_yaml::Value::Mapping(merged))
        .map_err(|err| AgentError::InvalidParams {
            name: name.to_string(),
            message: err.to_string(),
        })?;
    params.validate().map_err(|source| AgentError::Engine {
        name: name.to_string(),
        source,
    })?;
    Ok(params)
}
