//! Decision engine for Rikiki bots.
//!
//! Each decision samples hidden deals consistent with what the bot can see,
//! solves every sample exhaustively with backward induction and aggregates the
//! samples that are plausible given the bids already on the table.

pub mod error;
pub mod params;
pub mod policy;
pub mod sampler;
pub mod search;

pub use error::EngineError;
pub use params::EngineParams;
pub use policy::{BidContext, NashPolicy, PlayContext, Policy, RandomPolicy};
pub use sampler::{BidEstimate, BidRequest, PlayEstimate, PlayRequest, estimate_bid, estimate_play};
