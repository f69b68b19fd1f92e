use tracing::debug;

use crate::{
    book::{NoBook, OpeningBook},
    config::{EngineKind, SelectorConfig},
    error::SearchError,
    eval::{BoardView, EvalWeights, Evaluate, PositionEvaluator},
    game_tree_search::*,
    mcts::MctsSearch,
    minimax::MinimaxSearch,
};

/// How a move was chosen.
#[derive(Debug, Clone)]
pub enum Decision<G: Game> {
    Book(G::Action),
    Search {
        engine: EngineKind,
        result: SearchResult<G>,
    },
}

impl<G: Game> Decision<G> {
    #[inline]
    pub fn action(&self) -> G::Action {
        match self {
            Decision::Book(action) => *action,
            Decision::Search { result, .. } => result.best_move,
        }
    }

    #[inline]
    pub fn is_book(&self) -> bool {
        matches!(self, Decision::Book(..))
    }
}

/// Top-level dispatch between the opening book and the two engines.
///
/// The minimax searcher, and with it the transposition table, is kept for
/// the lifetime of the selector. MCTS starts from a fresh tree on every call.
/// Changes to `config` apply from the next decision on.
pub struct MoveSelector<G: Game, E: Evaluate<G> + Clone = PositionEvaluator, B: OpeningBook<G::Action> = NoBook> {
    pub config: SelectorConfig,
    pub book: B,
    evaluator: E,
    /// Builds the evaluator from weights; `None` for a caller-supplied evaluator.
    rebuild: Option<fn(&EvalWeights) -> E>,
    /// Weights the current evaluator was built from.
    weights: EvalWeights,
    minimax: MinimaxSearch<G, E>,
}

fn weighted_evaluator(weights: &EvalWeights) -> PositionEvaluator {
    PositionEvaluator::new(weights.clone())
}

impl<G: Game + BoardView, B: OpeningBook<G::Action>> MoveSelector<G, PositionEvaluator, B> {
    /// Selector using [`PositionEvaluator`] with `config.evaluation_weights`.
    pub fn new(config: SelectorConfig, book: B) -> Self {
        let evaluator = weighted_evaluator(&config.evaluation_weights);
        let mut selector = Self::with_evaluator(config, evaluator, book);
        selector.rebuild = Some(weighted_evaluator as fn(&EvalWeights) -> PositionEvaluator);
        selector
    }
}

impl<G: Game, E: Evaluate<G> + Clone, B: OpeningBook<G::Action>> MoveSelector<G, E, B> {
    /// Selector with a custom evaluator. `config.evaluation_weights` is not
    /// used by such a selector.
    pub fn with_evaluator(config: SelectorConfig, evaluator: E, book: B) -> Self {
        let minimax = MinimaxSearch::new(config.minimax_config(), evaluator.clone());
        let weights = config.evaluation_weights.clone();
        Self {
            config,
            book,
            evaluator,
            rebuild: None,
            weights,
            minimax,
        }
    }

    /// Rebuilds the evaluator after `config.evaluation_weights` changed. Table
    /// entries scored with the old weights are dropped.
    fn sync_evaluator(&mut self) {
        let Some(rebuild) = self.rebuild else {
            return;
        };
        if self.weights == self.config.evaluation_weights {
            return;
        }
        self.weights = self.config.evaluation_weights.clone();
        self.evaluator = rebuild(&self.weights);
        self.minimax.evaluator = self.evaluator.clone();
        self.minimax.clear_tt();
        debug!("selector: evaluation weights changed");
    }

    pub fn minimax(&self) -> &MinimaxSearch<G, E> {
        &self.minimax
    }

    pub fn decide(&mut self, position: &G, history: &[G::Action]) -> Result<Decision<G>, SearchError> {
        self.config.validate()?;
        self.sync_evaluator();

        if (history.len() as u64) < u64::from(self.config.opening_book_horizon) {
            if let Some(action) = self.book.lookup(history) {
                debug!(ply = history.len(), action = ?action, "selector: book move");
                return Ok(Decision::Book(action));
            }
        }

        let engine = self.config.engine;
        debug!(ply = history.len(), %engine, "selector: searching");
        let result = match engine {
            EngineKind::Minimax => {
                self.minimax.config = self.config.minimax_config();
                self.minimax.search(position)?
            }
            EngineKind::Mcts => MctsSearch::new(self.config.mcts_config(), self.evaluator.clone()).search(position)?,
        };
        Ok(Decision::Search { engine, result })
    }

    /// Book move while within the horizon, otherwise the configured engine's best move.
    pub fn choose_move(&mut self, position: &G, history: &[G::Action]) -> Result<G::Action, SearchError> {
        self.decide(position, history).map(|d| d.action())
    }
}
