#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![doc = include_str!("../README.md")]

/// Opening book lookup keyed on move history.
pub mod book;

/// Chess rules adapter backed by `cozy-chess`.
#[cfg(feature = "chess")]
pub mod chess;

pub mod config;
pub mod error;

/// Static evaluation: material, piece-square tables and pawn structure.
pub mod eval;

/// The `Game` capability set consumed from the rules engine and the types shared by both engines.
pub mod game_tree_search;

pub mod linked_list;

/// Monte Carlo Tree Search.
pub mod mcts;

/// Negamax search with alpha-beta pruning and a transposition table.
pub mod minimax;

pub mod selector;

pub mod transposition_table;

/// Re-exports the `smallvec` crate
pub use smallvec;

/// Re-exports the `rand` crate
pub use rand;

/// Re-exports the `enum_map` crate
pub use enum_map;

pub mod prelude {
    pub use crate::book::{LineBook, NoBook, OpeningBook};
    pub use crate::config::{EngineKind, SelectorConfig};
    pub use crate::error::{ConfigError, SearchError};
    pub use crate::eval::{BoardView, EvalWeights, Evaluate, PawnPenalties, PieceKind, PositionEvaluator, Square};
    pub use crate::game_tree_search::{
        ActionList, ByPlayer, Game, GameStatus, GameTreeSearch, HashValue, PlayerId, SearchCounter, SearchLimits,
        SearchResult, TerminalReason, ZobristHashable, PV,
    };
    pub use crate::mcts::{MctsConfig, MctsSearch, RolloutKind, RolloutPolicy};
    pub use crate::minimax::{MinimaxConfig, MinimaxSearch, MoveOrdering, Score};
    pub use crate::selector::{Decision, MoveSelector};

    #[cfg(feature = "chess")]
    pub use crate::chess::{ChessError, ChessPosition};
}

#[cfg(test)]
mod tests;
