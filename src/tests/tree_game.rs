use std::sync::Arc;

use crate::{eval::Evaluate, game_tree_search::*, minimax::Score};

/// Shape of a hand-built game tree.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Non-terminal node. The value is the heuristic for the side to move there.
    Inner(i32, Vec<Shape>),
    /// The side to move is checkmated.
    Mated,
    Draw,
    /// Marks the move leading into the wrapped node as a capture.
    Capture(Box<Shape>),
}

pub fn leaf(value: i32) -> Shape {
    Shape::Inner(value, vec![])
}

pub fn inner(value: i32, children: Vec<Shape>) -> Shape {
    Shape::Inner(value, children)
}

pub fn capture(shape: Shape) -> Shape {
    Shape::Capture(Box::new(shape))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Ongoing,
    Mated,
    Draw,
}

#[derive(Debug)]
struct TreeNode {
    value: i32,
    kind: Kind,
    ply: u8,
    capture: bool,
    children: Vec<usize>,
}

/// Explicit game tree. Moves are child indices; players alternate by ply.
///
/// Every node has its own hash, so the transposition table never merges two
/// nodes. Inner nodes without children are only valid as depth-limited leaves.
#[derive(Clone)]
pub struct TreeGame {
    nodes: Arc<Vec<TreeNode>>,
    at: usize,
}

impl std::fmt::Debug for TreeGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeGame(#{})", self.at)
    }
}

fn flatten(nodes: &mut Vec<TreeNode>, shape: &Shape, ply: u8, capture: bool) -> usize {
    let (value, kind, children) = match shape {
        Shape::Capture(inner) => return flatten(nodes, inner, ply, true),
        Shape::Inner(value, children) => (*value, Kind::Ongoing, &children[..]),
        Shape::Mated => (0, Kind::Mated, &[][..]),
        Shape::Draw => (0, Kind::Draw, &[][..]),
    };
    let id = nodes.len();
    nodes.push(TreeNode {
        value,
        kind,
        ply,
        capture,
        children: vec![],
    });
    let child_ids: Vec<usize> = children.iter().map(|c| flatten(nodes, c, ply + 1, false)).collect();
    nodes[id].children = child_ids;
    id
}

impl TreeGame {
    pub fn new(shape: &Shape) -> Self {
        let mut nodes = vec![];
        flatten(&mut nodes, shape, 0, false);
        Self {
            nodes: Arc::new(nodes),
            at: 0,
        }
    }

    fn node(&self) -> &TreeNode {
        &self.nodes[self.at]
    }

    pub fn ply(&self) -> u8 {
        self.node().ply
    }

    /// The two-ply example found in most textbooks: the minimax value is 3,
    /// reached by move 0. Move 1 is refuted by its first reply.
    pub fn textbook() -> Self {
        Self::new(&inner(
            0,
            vec![
                inner(-1, vec![leaf(3), leaf(12), leaf(8)]),
                inner(-5, vec![leaf(2), leaf(4), leaf(6)]),
                inner(0, vec![leaf(14), leaf(5), leaf(2)]),
            ],
        ))
    }

    /// Non-terminal position without legal moves.
    pub fn broken() -> Self {
        Self::new(&leaf(0))
    }

    /// Four moves, 1 and 3 are captures. One ply deep.
    pub fn captures_fixture() -> Self {
        Self::new(&inner(
            0,
            vec![leaf(10), capture(leaf(-20)), leaf(5), capture(leaf(-20))],
        ))
    }

    /// Move 1 forces mate on the next move of the first player whatever the
    /// reply. Move 0 looks best at depth 1 but lets the opponent mate, move 2
    /// draws immediately. Every line ends in a terminal node.
    pub fn forced_mate() -> Self {
        Self::new(&inner(
            0,
            vec![
                inner(-50, vec![Shape::Draw, Shape::Mated]),
                inner(0, vec![inner(0, vec![Shape::Mated]), inner(0, vec![Shape::Draw, Shape::Mated])]),
                Shape::Draw,
            ],
        ))
    }

    /// Root to move and immediately checkmated.
    pub fn mated() -> Self {
        Self::new(&Shape::Mated)
    }
}

impl ZobristHashable for TreeGame {
    fn zobrist_hash(&self) -> HashValue {
        (self.at as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

impl Game for TreeGame {
    type Action = u8;
    type Actions = Vec<u8>;
    type Error = String;

    fn to_move(&self) -> PlayerId {
        if self.ply() % 2 == 0 {
            PlayerId::PlayerFirst
        } else {
            PlayerId::PlayerSecond
        }
    }

    fn actions(&self) -> Vec<u8> {
        (0..self.node().children.len() as u8).collect()
    }

    fn advance(&mut self, action: u8) -> Result<(), String> {
        match self.node().children.get(action as usize) {
            Some(&child) => {
                self.at = child;
                Ok(())
            }
            None => Err(format!("no move {action} at node {}", self.at)),
        }
    }

    fn status(&self) -> GameStatus {
        match self.node().kind {
            Kind::Ongoing => GameStatus::Ongoing,
            Kind::Mated => GameStatus::Terminal(TerminalReason::Checkmate),
            Kind::Draw => GameStatus::Terminal(TerminalReason::DrawByRule),
        }
    }

    fn is_capture(&self, action: u8) -> bool {
        self.node()
            .children
            .get(action as usize)
            .map_or(false, |&child| self.nodes[child].capture)
    }
}

/// Reads the node values of a [`TreeGame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeEval;

impl Evaluate<TreeGame> for TreeEval {
    fn evaluate(&self, position: &TreeGame, ply: u8) -> Score {
        match position.node().kind {
            Kind::Mated => Score::mated_in(ply),
            Kind::Draw => Score::DRAW,
            Kind::Ongoing => Score::heuristic(position.node().value),
        }
    }
}

/// Plain negamax without pruning or tables, for comparison.
pub fn reference_negamax<G: Game, E: Evaluate<G>>(evaluator: &E, position: &G, depth: u8, ply: u8) -> Score {
    if depth == 0 || position.is_terminal() {
        return evaluator.evaluate(position, ply);
    }
    let mut best = -Score::INFINITY;
    for action in position.actions() {
        let child = position.apply(action).unwrap();
        let value = -reference_negamax(evaluator, &child, depth - 1, ply + 1);
        if value > best {
            best = value;
        }
    }
    best
}

/// Root moves whose plain negamax value equals the best one.
pub fn reference_best_moves<G: Game, E: Evaluate<G>>(evaluator: &E, position: &G, depth: u8) -> (Score, Vec<G::Action>) {
    let scored: Vec<(G::Action, Score)> = position
        .actions()
        .into_iter()
        .map(|a| {
            let child = position.apply(a).unwrap();
            (a, -reference_negamax(evaluator, &child, depth - 1, 1))
        })
        .collect();
    let best = scored.iter().map(|(_, s)| *s).max().unwrap();
    let moves = scored.into_iter().filter(|(_, s)| *s == best).map(|(a, _)| a).collect();
    (best, moves)
}

#[test]
fn test_tree_game_navigation() {
    let game = TreeGame::textbook();
    assert_eq!(vec![0, 1, 2], game.actions());
    assert_eq!(PlayerId::PlayerFirst, game.to_move());
    let child = game.apply(1).unwrap();
    assert_eq!(PlayerId::PlayerSecond, child.to_move());
    assert_ne!(game.zobrist_hash(), child.zobrist_hash());
    assert!(child.apply(5).is_err());
    assert!(TreeGame::broken().actions().is_empty());
    assert!(!TreeGame::broken().is_terminal());
    assert_eq!(Some(PlayerId::PlayerSecond), TreeGame::mated().winner());
}
