use crate::{error::SearchError, game_tree_search::*};

use super::node::{Node, NodeId};

/// Arena of MCTS nodes. The root is always `NodeId::ROOT`; every other node
/// is owned by the arena and reachable from its parent's `children`.
#[derive(Debug, Clone)]
pub struct SearchTree<G: Game> {
    nodes: Vec<Node<G>>,
}

impl<G: Game> SearchTree<G> {
    pub fn new(root_state: G) -> Result<Self, SearchError> {
        Ok(Self {
            nodes: vec![Node::new(root_state, None, None)?],
        })
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<G>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Child maximizing UCT; the first one wins ties.
    pub fn best_child(&self, id: NodeId, exploration_constant: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(f64, NodeId)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).uct(node.visits, exploration_constant);
            match best {
                Some((s, _)) if score <= s => {}
                _ => best = Some((score, child_id)),
            }
        }
        best.map(|(_, child_id)| child_id)
    }

    /// Child with the most visits; the first one wins ties.
    pub fn most_visited_child(&self, id: NodeId) -> Option<(G::Action, NodeId)> {
        let mut best: Option<(u32, G::Action, NodeId)> = None;
        for &(action, child_id) in &self.get(id).children {
            let visits = self.get(child_id).visits;
            match best {
                Some((v, ..)) if visits <= v => {}
                _ => best = Some((visits, action, child_id)),
            }
        }
        best.map(|(_, action, child_id)| (action, child_id))
    }

    pub fn child_for(&self, id: NodeId, action: G::Action) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, child_id)| *child_id)
    }

    /// Attaches the position after `action` below `id`.
    pub fn add_child(&mut self, id: NodeId, action: G::Action) -> Result<NodeId, SearchError> {
        let state = self
            .get(id)
            .state
            .apply(action)
            .map_err(|e| SearchError::refused_move(action, e))?;
        let child = Node::new(state, Some(action), Some(id))?;
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(child);
        let parent = self.get_mut(id);
        parent.take_untried(action);
        parent.children.push((action, child_id));
        Ok(child_id)
    }

    /// Expands the first untried move of `id`, if any.
    pub fn expand(&mut self, id: NodeId) -> Result<Option<NodeId>, SearchError> {
        let Some(&action) = self.get(id).untried().first() else {
            return Ok(None);
        };
        self.add_child(id, action).map(Some)
    }

    /// Records one simulation started at `leaf`.
    ///
    /// `value` is the outcome for the side to move at `leaf`. Each node stores
    /// it from its parent's point of view, so the sign flips at every level.
    pub fn backpropagate(&mut self, leaf: NodeId, value: f64) {
        self.get_mut(leaf).direct_simulations += 1;
        let mut current = Some(leaf);
        let mut reward = -value;
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.update(reward);
            reward = -reward;
            current = node.parent;
        }
    }

    /// Actions along the most visited chain starting below `id`.
    pub fn principal_variation(&self, id: NodeId) -> Vec<G::Action> {
        let mut pv = vec![];
        let mut current = id;
        while let Some((action, child_id)) = self.most_visited_child(current) {
            if self.get(child_id).visits == 0 {
                break;
            }
            pv.push(action);
            current = child_id;
        }
        pv
    }
}
