use crate::game_tree_search::{ByPlayer, PlayerId};

use super::{Mailbox, PieceKind, Square};

/// Pawn-structure defect counts for one side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PawnStructure {
    /// Sum over files of `pawns_on_file - 1` where a file holds more than one pawn.
    pub doubled: i32,
    /// Pawns whose next square holds an enemy piece.
    pub blocked: i32,
    /// Pawns without a friendly pawn on either adjacent file.
    pub isolated: i32,
}

#[inline]
fn forward(sq: Square, player: PlayerId) -> Option<Square> {
    match player {
        PlayerId::PlayerFirst => sq.checked_add(8).filter(|s| *s < 64),
        PlayerId::PlayerSecond => sq.checked_sub(8),
    }
}

pub fn pawn_structure(board: &Mailbox) -> ByPlayer<PawnStructure> {
    let mut files: ByPlayer<[i32; 8]> = ByPlayer::new([0; 8], [0; 8]);
    for (sq, player, _) in board.pieces().filter(|(_, _, kind)| *kind == PieceKind::Pawn) {
        files[player][(sq % 8) as usize] += 1;
    }

    let mut result: ByPlayer<PawnStructure> = Default::default();
    for player in [PlayerId::PlayerFirst, PlayerId::PlayerSecond] {
        result[player].doubled = files[player].iter().filter(|n| **n > 1).map(|n| n - 1).sum();
    }

    for (sq, player, _) in board.pieces().filter(|(_, _, kind)| *kind == PieceKind::Pawn) {
        let blocked = forward(sq, player)
            .and_then(|f| board.get(f))
            .is_some_and(|(owner, _)| owner != player);
        if blocked {
            result[player].blocked += 1;
        }

        let file = sq % 8;
        let has_neighbour = [file.checked_sub(1), Some(file + 1).filter(|f| *f < 8)]
            .into_iter()
            .flatten()
            .any(|f| files[player][f as usize] > 0);
        if !has_neighbour {
            result[player].isolated += 1;
        }
    }
    result
}
