use crate::{
    config::{EngineKind, SelectorConfig},
    eval::PieceKind,
    mcts::RolloutKind,
    minimax::MoveOrdering,
};

#[test]
fn config_from_partial_json() {
    let json = r#"{
        "engine": "mcts",
        "mcts_iterations": 250,
        "opening_book_horizon": 4,
        "mcts": { "rollout": "captures_first", "seed": 7 },
        "minimax": { "ordering": "captures_first" }
    }"#;
    let config = SelectorConfig::from_json_str(json).unwrap();
    assert_eq!(EngineKind::Mcts, config.engine);
    assert_eq!(250, config.mcts_config().iterations);
    assert_eq!(RolloutKind::CapturesFirst, config.mcts_config().rollout);
    assert_eq!(Some(7), config.mcts_config().seed);
    assert_eq!(MoveOrdering::CapturesFirst, config.minimax_config().ordering);
    assert_eq!(4, config.opening_book_horizon);
    assert_eq!(SelectorConfig::default().minimax_depth, config.minimax_depth);
    assert_eq!(Ok(()), config.validate());
}

#[test]
fn config_json_round_trip() {
    let mut config = SelectorConfig::minimax(5);
    config.evaluation_weights.piece_values[PieceKind::Queen] = 950;
    config.evaluation_weights.pawn_penalties.isolated = 15;
    config.mcts_exploration_constant = 1.5;
    config.mcts.exploration_constant = 0.75;
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed = SelectorConfig::from_json_str(&json).unwrap();
    assert_eq!(config, parsed);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(SelectorConfig::from_json_str(r#"{ "engine": "alphabeta" }"#).is_err());
}
