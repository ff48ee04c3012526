use crate::sampler::SamplingError;
use crate::search::SearchError;
use rikiki_core::model::deck::DealError;
use thiserror::Error;

/// Failures that indicate a caller or integration defect.
///
/// A decision whose samples were all rejected is not an error; it surfaces as
/// an empty estimate instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid engine parameters: {0}")]
    InvalidParams(String),
    #[error("malformed deal: {0}")]
    Deal(#[from] DealError),
    #[error("malformed game state: {0}")]
    Search(#[from] SearchError),
    #[error("inconsistent observations: {0}")]
    Sampling(#[from] SamplingError),
}
