//! Chess rules adapter over `cozy-chess`.
//!
//! Only translates the rules engine's API into [`Game`] and [`BoardView`].
//! Moves use cozy-chess's encoding where castling is "king takes own rook"
//! (`e1h1`); [`ChessPosition::parse_move`] and [`ChessPosition::to_uci`]
//! convert from and to the standard `e1g1` notation.

use cozy_chess::{Board, Color, File, Move, Piece, Square};
use thiserror::Error;

use crate::{
    eval::{self, BoardView, PieceKind},
    game_tree_search::*,
};

pub use cozy_chess;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("invalid FEN {0:?}")]
    InvalidFen(String),
    #[error("cannot parse move {0:?}")]
    InvalidMove(String),
    #[error("illegal move {0}")]
    IllegalMove(String),
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone)]
pub struct ChessPosition {
    pub board: Board,
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self { board: Board::default() }
    }
}

impl std::fmt::Debug for ChessPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ChessPosition").field(&format!("{}", self.board)).finish()
    }
}

impl std::fmt::Display for ChessPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)
    }
}

#[inline]
fn player_of(color: Color) -> PlayerId {
    match color {
        Color::White => PlayerId::PlayerFirst,
        Color::Black => PlayerId::PlayerSecond,
    }
}

#[inline]
fn piece_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

impl ChessPosition {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Board::from_fen(fen, false)
            .map(Self::new)
            .map_err(|_| ChessError::InvalidFen(fen.to_string()))
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    #[inline]
    fn is_king_move(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
    }

    /// Parses a UCI move, accepting both `e1g1` and `e1h1` for castling.
    pub fn parse_move(&self, uci: &str) -> Result<Move, ChessError> {
        let mut mv: Move = uci.parse().map_err(|_| ChessError::InvalidMove(uci.to_string()))?;
        if self.is_king_move(mv) && mv.from.rank() == mv.to.rank() {
            let rook_file = match (mv.from.file(), mv.to.file()) {
                (File::E, File::G) => Some(File::H),
                (File::E, File::C) => Some(File::A),
                _ => None,
            };
            if let Some(file) = rook_file {
                mv.to = Square::new(file, mv.from.rank());
            }
        }
        if !self.board.is_legal(mv) {
            return Err(ChessError::IllegalMove(uci.to_string()));
        }
        Ok(mv)
    }

    /// Standard UCI notation of a legal move of this position.
    pub fn to_uci(&self, mv: Move) -> String {
        let castles = self.is_king_move(mv) && self.board.color_on(mv.to) == Some(self.board.side_to_move());
        if castles {
            let file = if (mv.to.file() as u8) > (mv.from.file() as u8) { File::G } else { File::C };
            return Move {
                to: Square::new(file, mv.from.rank()),
                ..mv
            }
            .to_string();
        }
        mv.to_string()
    }

    /// Plays UCI moves in order, returning them in adapter encoding.
    pub fn play_line(&mut self, line: &[&str]) -> Result<Vec<Move>, ChessError> {
        let mut played = Vec::with_capacity(line.len());
        for uci in line {
            let mv = self.parse_move(uci)?;
            self.advance(mv)?;
            played.push(mv);
        }
        Ok(played)
    }

    fn has_moves(&self) -> bool {
        self.board.generate_moves(|_| true)
    }
}

/// Spreads the halfmove clock over the hash bits.
const HALFMOVE_KEY: HashValue = 0x9E37_79B9_7F4A_7C15;

impl ZobristHashable for ChessPosition {
    /// Board hash with the halfmove clock mixed in, since the clock decides
    /// fifty-move draws. A clock of zero leaves the board hash unchanged.
    #[inline]
    fn zobrist_hash(&self) -> HashValue {
        let clock = HashValue::from(self.board.halfmove_clock());
        self.board.hash() ^ clock.wrapping_mul(HALFMOVE_KEY)
    }
}

impl Game for ChessPosition {
    type Action = Move;
    type Actions = ActionList<Move>;
    type Error = ChessError;

    #[inline]
    fn to_move(&self) -> PlayerId {
        player_of(self.board.side_to_move())
    }

    fn actions(&self) -> Self::Actions {
        let mut moves = ActionList::new();
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    fn advance(&mut self, action: Move) -> Result<(), ChessError> {
        if !self.board.is_legal(action) {
            return Err(ChessError::IllegalMove(action.to_string()));
        }
        self.board.play_unchecked(action);
        Ok(())
    }

    fn status(&self) -> GameStatus {
        match self.board.status() {
            cozy_chess::GameStatus::Ongoing => GameStatus::Ongoing,
            cozy_chess::GameStatus::Won => GameStatus::Terminal(TerminalReason::Checkmate),
            cozy_chess::GameStatus::Drawn if self.has_moves() => GameStatus::Terminal(TerminalReason::DrawByRule),
            cozy_chess::GameStatus::Drawn => GameStatus::Terminal(TerminalReason::Stalemate),
        }
    }

    #[inline]
    fn is_capture(&self, action: Move) -> bool {
        let them = !self.board.side_to_move();
        if self.board.color_on(action.to) == Some(them) {
            return true;
        }
        self.board.piece_on(action.from) == Some(Piece::Pawn) && action.from.file() != action.to.file()
    }
}

impl BoardView for ChessPosition {
    #[inline]
    fn piece_at(&self, square: eval::Square) -> Option<(PlayerId, PieceKind)> {
        if square >= 64 {
            return None;
        }
        let sq = Square::index(square as usize);
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((player_of(color), piece_kind(piece)))
    }
}
