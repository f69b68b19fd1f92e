use smallvec::SmallVec;

use crate::{error::SearchError, game_tree_search::*};

/// Index of a node in a [`super::SearchTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Statistics record of one MCTS tree node.
///
/// `reward` is accumulated from the perspective of the player who made
/// `action`, i.e. the side to move at the parent, so a parent simply
/// maximizes `reward / visits` over its children.
#[derive(Debug, Clone)]
pub struct Node<G: Game> {
    pub state: G,
    pub action: Option<G::Action>,
    pub parent: Option<NodeId>,
    pub visits: u32,
    pub reward: f64,
    /// Simulations that started at this node rather than below it.
    pub direct_simulations: u32,
    pub status: GameStatus,
    /// Expanded children in expansion order.
    pub children: SmallVec<[(G::Action, NodeId); 8]>,
    untried: ActionList<G::Action>,
}

impl<G: Game> Node<G> {
    pub fn new(state: G, action: Option<G::Action>, parent: Option<NodeId>) -> Result<Self, SearchError> {
        let status = state.status();
        let untried = if status.is_terminal() {
            Default::default()
        } else {
            state.action_list()
        };
        if !status.is_terminal() && untried.is_empty() {
            return Err(SearchError::stuck(&state));
        }
        Ok(Self {
            state,
            action,
            parent,
            visits: 0,
            reward: 0.0,
            direct_simulations: 0,
            status,
            children: Default::default(),
            untried,
        })
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Moves without a child yet, in enumeration order.
    #[inline]
    pub fn untried(&self) -> &[G::Action] {
        &self.untried
    }

    #[inline]
    pub(crate) fn take_untried(&mut self, action: G::Action) -> bool {
        match self.untried.iter().position(|a| *a == action) {
            Some(i) => {
                self.untried.remove(i);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn update(&mut self, reward: f64) {
        self.visits += 1;
        self.reward += reward;
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / (self.visits as f64)
        }
    }

    /// UCT score seen from the parent: `w / n + c * sqrt(ln N / n)`, unvisited nodes first.
    #[inline]
    pub fn uct(&self, parent_visits: u32, exploration_constant: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let n = self.visits as f64;
        let ln_parent = (parent_visits.max(1) as f64).ln();
        self.reward / n + exploration_constant * (ln_parent / n).sqrt()
    }
}
