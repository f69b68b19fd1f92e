use crate::{
    error::ConfigError,
    eval::EvalWeights,
    mcts::MctsConfig,
    minimax::MinimaxConfig,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EngineKind {
    #[default]
    Minimax,
    Mcts,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Minimax => f.write_str("minimax"),
            EngineKind::Mcts => f.write_str("mcts"),
        }
    }
}

/// Configuration of [`crate::selector::MoveSelector`].
///
/// The top-level fields are the ones every caller sets; they take precedence
/// over the corresponding fields of `minimax` and `mcts`, which carry the
/// remaining engine knobs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectorConfig {
    pub engine: EngineKind,
    pub minimax_depth: u8,
    pub mcts_iterations: u32,
    pub mcts_exploration_constant: f64,
    pub evaluation_weights: EvalWeights,
    /// The book is consulted while fewer than this many moves have been played.
    pub opening_book_horizon: u32,
    pub minimax: MinimaxConfig,
    pub mcts: MctsConfig,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let minimax = MinimaxConfig::default();
        let mcts = MctsConfig::default();
        Self {
            engine: EngineKind::Minimax,
            minimax_depth: minimax.depth,
            mcts_iterations: mcts.iterations,
            mcts_exploration_constant: mcts.exploration_constant,
            evaluation_weights: EvalWeights::default(),
            opening_book_horizon: 10,
            minimax,
            mcts,
        }
    }
}

impl SelectorConfig {
    pub fn minimax(depth: u8) -> Self {
        Self {
            engine: EngineKind::Minimax,
            minimax_depth: depth,
            ..Default::default()
        }
    }

    pub fn mcts(iterations: u32) -> Self {
        Self {
            engine: EngineKind::Mcts,
            mcts_iterations: iterations,
            ..Default::default()
        }
    }

    pub fn with_opening_book_horizon(self, opening_book_horizon: u32) -> Self {
        Self {
            opening_book_horizon,
            ..self
        }
    }

    pub fn with_evaluation_weights(self, evaluation_weights: EvalWeights) -> Self {
        Self {
            evaluation_weights,
            ..self
        }
    }

    pub fn minimax_config(&self) -> MinimaxConfig {
        MinimaxConfig {
            depth: self.minimax_depth,
            ..self.minimax
        }
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig {
            iterations: self.mcts_iterations,
            exploration_constant: self.mcts_exploration_constant,
            ..self.mcts
        }
    }

    /// Checks both engine configurations, whichever engine is selected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.minimax_config().validate()?;
        self.mcts_config().validate()
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
