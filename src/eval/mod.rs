//! Static position evaluation.
//!
//! The evaluator combines material, piece-square tables and pawn-structure
//! penalties into a single [`Score`] relative to the side to move.
//! Terminal positions short-circuit the heuristic: a checkmated side to move
//! gets [`Score::mated_in`] and every draw scores zero.

use enum_map::{enum_map, Enum, EnumMap};

use crate::{
    game_tree_search::{ByPlayer, Game, GameStatus, PlayerId, TerminalReason},
    minimax::Score,
};

pub mod pawns;
pub mod tables;

pub use pawns::PawnStructure;
pub use tables::PieceSquareTable;

/// Board square index, `a1 = 0`, `h1 = 7`, `a8 = 56`.
pub type Square = u8;

#[inline]
pub const fn square(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Read-only board access needed by [`PositionEvaluator`].
pub trait BoardView {
    fn piece_at(&self, square: Square) -> Option<(PlayerId, PieceKind)>;
}

/// Leaf evaluation consumed by both search engines.
pub trait Evaluate<G: Game>: Send + Sync {
    /// Score of `position` for its side to move, `ply` plies below the search root.
    fn evaluate(&self, position: &G, ply: u8) -> Score;
}

/// A 64-square snapshot of the board, read once per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mailbox([Option<(PlayerId, PieceKind)>; 64]);

impl Mailbox {
    pub fn empty() -> Self {
        Self([None; 64])
    }

    pub fn read<B: BoardView + ?Sized>(board: &B) -> Self {
        let mut squares = [None; 64];
        for (sq, slot) in squares.iter_mut().enumerate() {
            *slot = board.piece_at(sq as Square);
        }
        Self(squares)
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<(PlayerId, PieceKind)> {
        self.0.get(sq as usize).copied().flatten()
    }

    pub fn put(&mut self, sq: Square, player: PlayerId, kind: PieceKind) {
        if let Some(slot) = self.0.get_mut(sq as usize) {
            *slot = Some((player, kind));
        }
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, PlayerId, PieceKind)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(sq, x)| x.map(|(player, kind)| (sq as Square, player, kind)))
    }
}

impl BoardView for Mailbox {
    #[inline]
    fn piece_at(&self, square: Square) -> Option<(PlayerId, PieceKind)> {
        self.get(square)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PawnPenalties {
    pub doubled: i32,
    pub blocked: i32,
    pub isolated: i32,
}

impl Default for PawnPenalties {
    fn default() -> Self {
        Self {
            doubled: 30,
            blocked: 30,
            isolated: 30,
        }
    }
}

impl PawnPenalties {
    #[inline]
    pub fn apply(&self, s: &PawnStructure) -> i32 {
        self.doubled * s.doubled + self.blocked * s.blocked + self.isolated * s.isolated
    }
}

/// Evaluation weights, passed explicitly so that searches with different
/// weights can run side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvalWeights {
    pub piece_values: EnumMap<PieceKind, i32>,
    pub position_tables: EnumMap<PieceKind, PieceSquareTable>,
    /// Replaces the king table once total non-king material drops below `endgame_material`.
    pub king_endgame_table: PieceSquareTable,
    pub endgame_material: i32,
    pub pawn_penalties: PawnPenalties,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            piece_values: enum_map! {
                PieceKind::Pawn => 100,
                PieceKind::Knight => 320,
                PieceKind::Bishop => 330,
                PieceKind::Rook => 500,
                PieceKind::Queen => 900,
                PieceKind::King => 0,
            },
            position_tables: enum_map! {
                PieceKind::Pawn => tables::PAWN,
                PieceKind::Knight => tables::KNIGHT,
                PieceKind::Bishop => tables::BISHOP,
                PieceKind::Rook => tables::ROOK,
                PieceKind::Queen => tables::QUEEN,
                PieceKind::King => tables::KING,
            },
            king_endgame_table: tables::KING_ENDGAME,
            endgame_material: 2800,
            pawn_penalties: Default::default(),
        }
    }
}

impl EvalWeights {
    /// Piece-square bonus for `player`'s `kind` on `sq`.
    #[inline]
    pub fn position_bonus(&self, player: PlayerId, kind: PieceKind, sq: Square, endgame: bool) -> i32 {
        let table = if kind == PieceKind::King && endgame {
            &self.king_endgame_table
        } else {
            &self.position_tables[kind]
        };
        let (file, rank) = ((sq % 8) as usize, (sq / 8) as usize);
        let row = match player {
            PlayerId::PlayerFirst => 7 - rank,
            PlayerId::PlayerSecond => rank,
        };
        table[row][file]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionEvaluator {
    pub weights: EvalWeights,
}

impl PositionEvaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    /// Heuristic balance from the first player's (White's) point of view, not clamped.
    pub fn heuristic<B: BoardView + ?Sized>(&self, board: &B) -> i32 {
        let mailbox = Mailbox::read(board);
        let w = &self.weights;

        let mut material: ByPlayer<i32> = Default::default();
        let mut non_king_material = 0;
        for (_, player, kind) in mailbox.pieces() {
            let value = w.piece_values[kind];
            material[player] += value;
            if kind != PieceKind::King {
                non_king_material += value;
            }
        }
        let endgame = non_king_material < w.endgame_material;

        let mut position: ByPlayer<i32> = Default::default();
        for (sq, player, kind) in mailbox.pieces() {
            position[player] += w.position_bonus(player, kind, sq, endgame);
        }

        let structure = pawns::pawn_structure(&mailbox);
        let total = |p: PlayerId| material[p] + position[p] - w.pawn_penalties.apply(&structure[p]);
        total(PlayerId::PlayerFirst) - total(PlayerId::PlayerSecond)
    }

    /// Evaluation from `player`'s point of view.
    ///
    /// Zero-sum: `evaluate_for(p, a) == -evaluate_for(p, a.opposite())`.
    pub fn evaluate_for<G: Game + BoardView>(&self, position: &G, player: PlayerId) -> Score {
        let score = self.evaluate(position, 0);
        if player == position.to_move() {
            score
        } else {
            -score
        }
    }
}

impl<G: Game + BoardView> Evaluate<G> for PositionEvaluator {
    fn evaluate(&self, position: &G, ply: u8) -> Score {
        match position.status() {
            GameStatus::Terminal(TerminalReason::Checkmate) => Score::mated_in(ply),
            GameStatus::Terminal(TerminalReason::Stalemate | TerminalReason::DrawByRule) => Score::DRAW,
            GameStatus::Ongoing => {
                let white = self.heuristic(position);
                Score::heuristic(match position.to_move() {
                    PlayerId::PlayerFirst => white,
                    PlayerId::PlayerSecond => -white,
                })
            }
        }
    }
}
