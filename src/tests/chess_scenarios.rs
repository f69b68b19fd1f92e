use crate::{
    chess::{ChessPosition, START_FEN},
    eval::{Evaluate, PositionEvaluator},
    game_tree_search::*,
    mcts::{MctsConfig, MctsSearch},
    minimax::{MinimaxConfig, MinimaxSearch, MoveOrdering, Score},
};

const BACK_RANK_MATE: &str = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1";

fn minimax(config: MinimaxConfig) -> MinimaxSearch<ChessPosition, PositionEvaluator> {
    MinimaxSearch::new(config, PositionEvaluator::default())
}

#[test]
fn minimax_finds_back_rank_mate() {
    let pos = ChessPosition::from_fen(BACK_RANK_MATE).unwrap();
    for depth in 1..=3 {
        let res = minimax(MinimaxConfig::new(depth)).search(&pos).unwrap();
        assert_eq!("a1a8", pos.to_uci(res.best_move), "depth {depth}");
        assert_eq!(Score::mate_in(1), res.eval, "depth {depth}");
    }
}

#[test]
fn minimax_finds_back_rank_mate_in_parallel() {
    let pos = ChessPosition::from_fen(BACK_RANK_MATE).unwrap();
    let config = MinimaxConfig::new(3)
        .with_parallel(true)
        .with_ordering(MoveOrdering::CapturesFirst);
    let res = minimax(config).search(&pos).unwrap();
    assert_eq!("a1a8", pos.to_uci(res.best_move));
    assert_eq!(Score::mate_in(1), res.eval);
}

#[test]
fn mcts_finds_back_rank_mate() {
    let pos = ChessPosition::from_fen(BACK_RANK_MATE).unwrap();
    let config = MctsConfig::new(500).with_seed(1234);
    let res = MctsSearch::new(config, PositionEvaluator::default()).search(&pos).unwrap();
    assert_eq!("a1a8", pos.to_uci(res.best_move));
}

#[test]
fn defender_makes_luft() {
    // Black to move must open an escape square for the king.
    let pos = ChessPosition::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 b - - 0 1").unwrap();
    let res = minimax(MinimaxConfig::new(2)).search(&pos).unwrap();
    assert!(res.eval < Score::ZERO);
    let res = minimax(MinimaxConfig::new(3)).search(&pos).unwrap();
    assert!(!res.eval.is_mate(), "{}", res.eval);
}

#[test]
fn start_position_is_balanced_at_even_depth() {
    let pos = ChessPosition::from_fen(START_FEN).unwrap();
    let res = minimax(MinimaxConfig::new(2)).search(&pos).unwrap();
    assert_eq!(Score::ZERO, res.eval);
    assert_eq!(2, res.pv.len());
}

#[test]
fn start_position_depth_three() {
    let pos = ChessPosition::default();
    let res = minimax(MinimaxConfig::new(3)).search(&pos).unwrap();
    // Knights on b1/g1 score -90 and 10 on c3/f3, so each knight development
    // is worth 100. At odd depth White gets one more of them than Black.
    assert_eq!(Some(cozy_chess::Piece::Knight), pos.board.piece_on(res.best_move.from));
    assert_eq!(Score(100), res.eval);
}

#[test]
fn table_does_not_outlive_the_fifty_move_rule() {
    let early = ChessPosition::from_fen("7k/8/8/8/8/8/8/R6K w - - 0 1").unwrap();
    let late = ChessPosition::from_fen("7k/8/8/8/8/8/8/R6K w - - 98 1").unwrap();
    let mut engine = minimax(MinimaxConfig::new(2));
    let res = engine.search(&early).unwrap();
    assert!(res.eval > Score(400), "{}", res.eval);

    // Any two plies from here reach a halfmove clock of 100.
    let fresh = minimax(MinimaxConfig::new(2)).search(&late).unwrap();
    assert_eq!(Score::DRAW, fresh.eval);
    let reused = engine.search(&late).unwrap();
    assert_eq!(fresh.eval, reused.eval);
    assert_eq!(fresh.best_move, reused.best_move);
}

#[test]
fn evaluator_scores_terminal_positions() {
    let eval = PositionEvaluator::default();
    let mut pos = ChessPosition::default();
    pos.play_line(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
    assert_eq!(Score::mated_in(4), eval.evaluate(&pos, 4));
    assert_eq!(Score::mated_in(0), eval.evaluate_for(&pos, PlayerId::PlayerFirst));
    assert_eq!(Score::mate_in(0), eval.evaluate_for(&pos, PlayerId::PlayerSecond));

    let stalemate = ChessPosition::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(Score::DRAW, eval.evaluate(&stalemate, 3));
}

#[test]
fn terminal_root_has_no_moves() {
    let mut pos = ChessPosition::default();
    pos.play_line(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
    let err = minimax(MinimaxConfig::new(2)).search(&pos).err();
    assert_eq!(Some(crate::error::SearchError::NoLegalMoves), err);
}
