use super::legal::{legal_moves, prune_dominated};
use rikiki_core::model::card::Card;
use rikiki_core::model::card_set::CardSet;
use rikiki_core::model::hand::Hand;
use rikiki_core::model::suit::Suit;
use rikiki_core::model::trick::trick_winner;
use thiserror::Error;

pub type NodeId = usize;

/// Immutable table facts shared by every node of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub players: usize,
    pub trump: Option<Suit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("player {player} has no card to play at depth {depth}")]
    NoLegalMove { player: usize, depth: usize },
    #[error("no hand for player {player}")]
    MissingHand { player: usize },
    #[error("invalid root state: {0}")]
    InvalidRoot(String),
}

/// Game state at the point the search starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootState {
    /// Cards already played this round.
    pub depth: usize,
    /// Player whose card produced this state.
    pub last_player: usize,
    /// Cards of the trick in progress, in play order. Empty between tricks.
    pub trick: Vec<Card>,
    /// Every card played so far, including `trick`.
    pub played: CardSet,
    pub tricks_won: Vec<u8>,
    /// Player who leads when no trick is in progress.
    pub leader: usize,
}

impl RootState {
    /// Start of a round: seat 0 leads, nothing played.
    pub fn round_start(players: usize) -> Self {
        Self {
            depth: 0,
            last_player: players.saturating_sub(1),
            trick: Vec::new(),
            played: CardSet::empty(),
            tricks_won: vec![0; players],
            leader: 0,
        }
    }

    /// A decision point for `to_act` partway through a round.
    pub fn mid_round(
        players: usize,
        to_act: usize,
        trick: Vec<Card>,
        played: CardSet,
        tricks_won: Vec<u8>,
    ) -> Result<Self, SearchError> {
        if players == 0 || to_act >= players {
            return Err(SearchError::InvalidRoot(format!(
                "seat {to_act} is not at a {players}-player table"
            )));
        }
        if trick.len() >= players {
            return Err(SearchError::InvalidRoot(
                "trick in progress already holds a card from every player".to_string(),
            ));
        }
        if tricks_won.len() != players {
            return Err(SearchError::InvalidRoot(format!(
                "expected {players} trick counts, got {}",
                tricks_won.len()
            )));
        }
        Ok(Self {
            depth: played.len(),
            last_player: (to_act + players - 1) % players,
            trick,
            played,
            tricks_won,
            leader: to_act,
        })
    }

    fn trick_complete(&self) -> bool {
        self.trick.is_empty()
    }
}

/// One node: the card that led here plus memoized aggregates.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub card: Option<Card>,
    /// Player whose move produced this node.
    pub player: usize,
    pub depth: usize,
    pub lead: Option<Suit>,
    pub trick_complete: bool,
    /// Leader of the next trick once `trick_complete` is set.
    pub leader: usize,
    pub tricks_won: Vec<u8>,
    pub children: Vec<NodeId>,
    /// Outcome vector: terminal trick counts at leaves, overwritten by induction.
    pub value: Vec<i32>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Every pruned continuation from a root, stored in pre-order.
///
/// A child always has a larger id than its parent.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<Node>,
    max_depth: usize,
}

impl GameTree {
    pub const ROOT: NodeId = 0;

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    pub fn root_value(&self) -> &[i32] {
        &self.root().value
    }

    /// Card and resolved value of each immediate option at the root.
    pub fn root_actions(&self) -> Vec<(Card, Vec<i32>)> {
        self.root()
            .children
            .iter()
            .filter_map(|&id| {
                let child = &self.nodes[id];
                child.card.map(|card| (card, child.value.clone()))
            })
            .collect()
    }
}

/// Expands every pruned play-out from `root` until `max_depth` cards are down.
///
/// `hands` holds each player's cards for the round; cards already in
/// `root.played` are skipped.
pub fn build_tree(
    config: &TableConfig,
    hands: &[Hand],
    root: &RootState,
    max_depth: usize,
) -> Result<GameTree, SearchError> {
    if hands.len() != config.players {
        return Err(SearchError::MissingHand {
            player: hands.len().min(config.players),
        });
    }
    if root.tricks_won.len() != config.players {
        return Err(SearchError::InvalidRoot(format!(
            "expected {} trick counts, got {}",
            config.players,
            root.tricks_won.len()
        )));
    }

    let trick_complete = root.trick_complete();
    let root_node = Node {
        parent: None,
        card: None,
        player: root.last_player,
        depth: root.depth,
        lead: root.trick.first().map(|card| card.suit),
        trick_complete,
        leader: root.leader,
        tricks_won: root.tricks_won.clone(),
        children: Vec::new(),
        value: if root.depth >= max_depth {
            to_value(&root.tricks_won)
        } else {
            Vec::new()
        },
    };

    let mut builder = Builder {
        config: *config,
        hands,
        max_depth,
        nodes: vec![root_node],
        played: root.played,
        trick: root.trick.clone(),
    };
    builder.expand(GameTree::ROOT)?;

    Ok(GameTree {
        nodes: builder.nodes,
        max_depth,
    })
}

struct Builder<'a> {
    config: TableConfig,
    hands: &'a [Hand],
    max_depth: usize,
    nodes: Vec<Node>,
    // Path state, pushed on the way down and restored on the way back up.
    played: CardSet,
    trick: Vec<Card>,
}

impl Builder<'_> {
    fn expand(&mut self, id: NodeId) -> Result<(), SearchError> {
        let (depth, player, trick_complete, leader, lead) = {
            let node = &self.nodes[id];
            (
                node.depth,
                node.player,
                node.trick_complete,
                node.leader,
                node.lead,
            )
        };
        if depth >= self.max_depth {
            return Ok(());
        }

        let actor = if trick_complete {
            leader
        } else {
            (player + 1) % self.config.players
        };
        let hands = self.hands;
        let hand = hands
            .get(actor)
            .ok_or(SearchError::MissingHand { player: actor })?;

        let lead = if trick_complete { None } else { lead };
        let legal = legal_moves(hand.cards(), lead, &self.played);
        if legal.is_empty() {
            return Err(SearchError::NoLegalMove {
                player: actor,
                depth,
            });
        }

        let saved_trick = if trick_complete {
            Some(std::mem::take(&mut self.trick))
        } else {
            None
        };
        let choices = prune_dominated(&self.trick, &legal, self.config.trump);

        for card in choices {
            self.trick.push(card);
            self.played.insert(card);
            let child = self.push_child(id, actor, card);
            self.expand(child)?;
            self.played.remove(card);
            self.trick.pop();
        }

        if let Some(trick) = saved_trick {
            self.trick = trick;
        }
        Ok(())
    }

    fn push_child(&mut self, parent_id: NodeId, actor: usize, card: Card) -> NodeId {
        let players = self.config.players;
        let parent = &self.nodes[parent_id];
        let depth = parent.depth + 1;
        let lead = if parent.trick_complete {
            Some(card.suit)
        } else {
            parent.lead
        };
        let mut tricks_won = parent.tricks_won.clone();
        let mut leader = parent.leader;
        let trick_complete = self.trick.len() == players;
        if trick_complete {
            let position = trick_winner(&self.trick, self.config.trump).unwrap_or(0);
            let winner = (actor + position + 1) % players;
            tricks_won[winner] += 1;
            leader = winner;
        }
        let value = if depth == self.max_depth {
            to_value(&tricks_won)
        } else {
            Vec::new()
        };

        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(parent_id),
            card: Some(card),
            player: actor,
            depth,
            lead,
            trick_complete,
            leader,
            tricks_won,
            children: Vec::new(),
            value,
        });
        self.nodes[parent_id].children.push(id);
        id
    }
}

fn to_value(tricks_won: &[u8]) -> Vec<i32> {
    tricks_won.iter().map(|&tricks| i32::from(tricks)).collect()
}
