//! Exhaustive play-out search for one fully known deal.
//!
//! - `legal`: suit-following filter and the dominated-card pruner.
//! - `tree`: arena-backed tree of every pruned continuation.
//! - `induction`: backward induction under a pluggable objective.

mod induction;
mod legal;
mod tree;

pub use induction::{Objective, ScoreObjective, TrickObjective, margin, resolve};
pub use legal::{legal_moves, prune_dominated};
pub use tree::{GameTree, Node, NodeId, RootState, SearchError, TableConfig, build_tree};
