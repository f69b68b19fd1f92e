use std::{fmt::Write, rc::Rc};

use smallvec::SmallVec;

use crate::game_tree_search::Game;

use super::{
    node::{Node, NodeId},
    tree::SearchTree,
};

#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreeDump<T> {
    #[cfg_attr(feature = "serde", serde(rename = "_"))]
    pub value: T,
    #[cfg_attr(feature = "serde", serde(rename = "children"))]
    pub children: Vec<Rc<TreeDump<T>>>,
}

impl<T> TreeDump<T> {
    pub fn new(value: T, children: Vec<Rc<TreeDump<T>>>) -> Self {
        Self { value, children }
    }
}

impl<T: std::fmt::Display> TreeDump<T> {
    /// Indented outline, one line per entry.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_level(&mut out, 0);
        out
    }

    fn render_level(&self, out: &mut String, depth: usize) {
        let _ = writeln!(out, "{}- {}", "  ".repeat(depth), self.value);
        for child in &self.children {
            child.render_level(out, depth + 1);
        }
    }
}

impl<G: Game> Node<G> {
    fn debug_description(&self, describe_action: &dyn Fn(G::Action) -> String) -> String {
        let action_part = match self.action {
            Some(action) => describe_action(action),
            None => "[Root]".to_string(),
        };
        format!(
            "{action_part} ({:.1}/{} = {:.3}), #children = {}, untried = {}{}",
            self.reward,
            self.visits,
            self.mean(),
            self.children.len(),
            self.untried().len(),
            if self.is_terminal() {
                format!(", {:?}", self.status)
            } else {
                String::new()
            }
        )
    }
}

impl<G: Game> SearchTree<G> {
    /// Dump of the top `max_depth` levels below `id`, most visited children
    /// first. Children with fewer than `min_visits` visits (other than the
    /// most visited one) are folded into a single summary entry.
    pub fn dump_tree(
        &self,
        id: NodeId,
        max_depth: u8,
        min_visits: u32,
        describe_action: &dyn Fn(G::Action) -> String,
    ) -> TreeDump<String> {
        let node = self.get(id);
        let desc = node.debug_description(describe_action);
        if max_depth == 0 {
            return TreeDump::new(desc, vec![]);
        }

        let mut children: SmallVec<[NodeId; 16]> = node.children.iter().map(|(_, c)| *c).collect();
        children.sort_by_key(|c| std::cmp::Reverse(self.get(*c).visits));
        let mut dumped = Vec::with_capacity(children.len());
        let (mut omitted, mut omitted_n) = (0, 0);
        for (i, child) in children.iter().copied().enumerate() {
            let n = self.get(child).visits;
            if n > 0 && (i == 0 || n >= min_visits) {
                dumped.push(Rc::new(self.dump_tree(child, max_depth - 1, min_visits, describe_action)));
            } else {
                omitted += 1;
                omitted_n += n;
            }
        }
        if omitted > 0 {
            let summary = format!("...[{omitted} omitted, {omitted_n} visits]");
            dumped.push(Rc::new(TreeDump::new(summary, vec![])));
        }
        TreeDump::new(desc, dumped)
    }
}
