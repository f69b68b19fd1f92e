use thiserror::Error;

/// Rejected configuration values, reported before a search starts.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("search depth must be at least 1, got {0}")]
    DepthTooSmall(u8),
    #[error("iteration budget must be at least 1, got {0}")]
    IterationsTooSmall(u32),
    #[error("exploration constant must be finite and > 0, got {0}")]
    InvalidExplorationConstant(f64),
    #[error("rollout evaluation scale must be finite and > 0, got {0}")]
    InvalidRolloutEvalScale(f64),
    #[error("thread count must be at least 1")]
    NoThreads,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The rules engine broke its contract: a position has no legal moves but
    /// is not terminal, or a listed move was refused.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("no legal moves: the position is terminal")]
    NoLegalMoves,
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl SearchError {
    pub(crate) fn refused_move<A: std::fmt::Debug, E: std::fmt::Debug>(action: A, err: E) -> Self {
        SearchError::InvalidPosition(format!("legal move {action:?} was refused: {err:?}"))
    }

    pub(crate) fn stuck<G: std::fmt::Debug>(position: &G) -> Self {
        SearchError::InvalidPosition(format!("no legal moves in a non-terminal position: {position:?}"))
    }
}
