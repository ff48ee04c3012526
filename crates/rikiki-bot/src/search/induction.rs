use super::tree::{GameTree, NodeId};
use rand::Rng;
use rand::seq::SliceRandom;
use rikiki_core::model::score::round_score;

/// What a player maximizes when choosing among sibling nodes.
pub trait Objective {
    /// Converts the raw trick counts stored at a leaf into comparable values.
    fn leaf_value(&self, tricks: &[i32]) -> Vec<i32>;

    /// How much `actor` likes an outcome vector. Larger is better.
    fn preference(&self, value: &[i32], actor: usize) -> i64;
}

/// Each player maximizes their own trick count. Used to predict bids.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrickObjective;

impl Objective for TrickObjective {
    fn leaf_value(&self, tricks: &[i32]) -> Vec<i32> {
        tricks.to_vec()
    }

    fn preference(&self, value: &[i32], actor: usize) -> i64 {
        value.get(actor).copied().map(i64::from).unwrap_or(i64::MIN)
    }
}

/// Each player maximizes their round-score margin over the rest of the table,
/// given everyone's committed bid.
#[derive(Debug, Clone, Copy)]
pub struct ScoreObjective<'a> {
    bids: &'a [u8],
}

impl<'a> ScoreObjective<'a> {
    pub fn new(bids: &'a [u8]) -> Self {
        Self { bids }
    }
}

impl Objective for ScoreObjective<'_> {
    fn leaf_value(&self, tricks: &[i32]) -> Vec<i32> {
        tricks
            .iter()
            .zip(self.bids)
            .map(|(&won, &bid)| round_score(u8::try_from(won).unwrap_or(u8::MAX), bid))
            .collect()
    }

    fn preference(&self, value: &[i32], actor: usize) -> i64 {
        margin(value, actor)
    }
}

/// Sum over every other player of `value[actor] - value[other]`.
pub fn margin(value: &[i32], actor: usize) -> i64 {
    let Some(&own) = value.get(actor) else {
        return i64::MIN;
    };
    value
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != actor)
        .map(|(_, &score)| i64::from(own) - i64::from(score))
        .sum()
}

/// Backward induction over the whole tree in a single reverse pass.
///
/// Leaves are rewritten with the objective's leaf values. Every inner node
/// takes the value of the child its acting player prefers; equally preferred
/// children are chosen uniformly with `rng`. Returns the number of ties broken.
pub fn resolve<O, R>(tree: &mut GameTree, objective: &O, rng: &mut R) -> usize
where
    O: Objective + ?Sized,
    R: Rng + ?Sized,
{
    let mut ties = 0usize;

    // Children sit after their parent in the arena, so walking ids backwards
    // resolves every subtree before the node above it.
    for id in (0..tree.len()).rev() {
        let chosen = {
            let node = tree.node(id);
            match node.children.as_slice() {
                [] => None,
                [only] => Some(*only),
                siblings => Some(pick_preferred(tree, siblings, objective, rng, &mut ties)),
            }
        };

        let value = match chosen {
            Some(child) => tree.node(child).value.clone(),
            None => objective.leaf_value(&tree.node(id).value),
        };
        tree.node_mut(id).value = value;
    }

    if ties > 0 {
        tracing::debug!(
            target: "rikiki_bot::search",
            nodes = tree.len(),
            ties,
            "broke ties during backward induction"
        );
    }
    ties
}

fn pick_preferred<O, R>(
    tree: &GameTree,
    siblings: &[NodeId],
    objective: &O,
    rng: &mut R,
    ties: &mut usize,
) -> NodeId
where
    O: Objective + ?Sized,
    R: Rng + ?Sized,
{
    let actor = tree.node(siblings[0]).player;
    let scored: Vec<(NodeId, i64)> = siblings
        .iter()
        .map(|&id| (id, objective.preference(&tree.node(id).value, actor)))
        .collect();
    let best = scored.iter().map(|&(_, score)| score).max().unwrap_or(i64::MIN);
    let preferred: Vec<NodeId> = scored
        .iter()
        .filter(|&&(_, score)| score == best)
        .map(|&(id, _)| id)
        .collect();

    if preferred.len() == 1 {
        return preferred[0];
    }
    *ties += 1;
    preferred.choose(rng).copied().unwrap_or(siblings[0])
}
