use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    cons,
    error::{ConfigError, SearchError},
    eval::Evaluate,
    game_tree_search::*,
    linked_list,
};

use super::{
    transposition_table::{new_tt, TTEntry, TTFlag, TTKey, DEFAULT_SIZE_MB, TT},
    Score,
};

/// Order in which moves are tried at every node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MoveOrdering {
    /// Rules engine enumeration order.
    #[default]
    Natural,
    /// Captures first, otherwise enumeration order (stable).
    CapturesFirst,
}

impl MoveOrdering {
    #[inline]
    fn order<G: Game>(self, position: &G, actions: &mut ActionList<G::Action>) {
        match self {
            MoveOrdering::Natural => {}
            MoveOrdering::CapturesFirst => actions.sort_by_key(|a| !position.is_capture(*a)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MinimaxConfig {
    pub depth: u8,
    pub ordering: MoveOrdering,
    /// Search root moves on the rayon pool.
    pub parallel: bool,
    /// Transposition table size, 0 disables it.
    pub tt_size_mb: u32,
    /// With a time budget the search deepens iteratively from depth 1 and
    /// stops after the first completed iteration past the budget.
    pub limits: Option<SearchLimits>,
    pub debug: bool,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            ordering: MoveOrdering::Natural,
            parallel: false,
            tt_size_mb: DEFAULT_SIZE_MB,
            limits: None,
            debug: false,
        }
    }
}

impl MinimaxConfig {
    pub fn new(depth: u8) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    pub fn with_ordering(self, ordering: MoveOrdering) -> Self {
        Self { ordering, ..self }
    }

    pub fn with_parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    pub fn with_tt_size_mb(self, tt_size_mb: u32) -> Self {
        Self { tt_size_mb, ..self }
    }

    pub fn with_limits(self, limits: SearchLimits) -> Self {
        Self {
            limits: Some(limits),
            ..self
        }
    }

    pub fn with_debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth < 1 {
            return Err(ConfigError::DepthTooSmall(self.depth));
        }
        Ok(())
    }
}

struct SearchContext<'a, G: Game, E: Evaluate<G>> {
    evaluator: &'a E,
    tt: &'a TT<G::Action>,
    ordering: MoveOrdering,
}

impl<'a, G: Game, E: Evaluate<G>> SearchContext<'a, G, E> {
    #[inline]
    fn ordered_actions(&self, position: &G) -> ActionList<G::Action> {
        let mut actions = position.action_list();
        self.ordering.order(position, &mut actions);
        actions
    }

    #[inline]
    fn probe(&self, position: &G, depth: u8, ply: u8, ab: (Score, Score)) -> Option<(Score, PV<G>)> {
        if ply == 0 || !self.tt.is_enabled() {
            return None;
        }
        let entry = self.tt.get(&TTKey(position.zobrist_hash()))?;
        let value = entry.cutoff(depth, ab.0, ab.1, ply)?;
        let pv = match entry.best_move {
            Some(a) => linked_list![a],
            None => linked_list![],
        };
        Some((value, pv))
    }

    #[inline]
    fn store(&self, position: &G, depth: u8, ply: u8, value: Score, ab: (Score, Score), best: Option<G::Action>) {
        if !self.tt.is_enabled() {
            return;
        }
        let flag = TTFlag::classify(value, ab.0, ab.1);
        let entry = TTEntry::new(flag, depth, value.to_tt(ply), best);
        self.tt.set(&TTKey(position.zobrist_hash()), entry);
    }
}

/// Fail-soft negamax with alpha-beta pruning. Returns the score for the side
/// to move at `position` and the principal variation from it.
fn negamax<G: Game, E: Evaluate<G>>(
    ctx: &SearchContext<G, E>,
    position: &G,
    depth: u8,
    ply: u8,
    ab: (Score, Score),
    counter: &mut SearchCounter,
) -> Result<(Score, PV<G>), SearchError> {
    if depth == 0 || position.is_terminal() {
        counter.evals += 1;
        return Ok((ctx.evaluator.evaluate(position, ply), linked_list![]));
    }

    if let Some(hit) = ctx.probe(position, depth, ply, ab) {
        counter.tt_hits += 1;
        return Ok(hit);
    }

    let actions = ctx.ordered_actions(position);
    if actions.is_empty() {
        return Err(SearchError::stuck(position));
    }

    let (alpha0, beta) = ab;
    let mut alpha = alpha0;
    let mut best = -Score::INFINITY;
    let mut best_move = None;
    let mut pv = linked_list![];
    for action in actions {
        let child = position
            .apply(action)
            .map_err(|e| SearchError::refused_move(action, e))?;
        counter.states_visited += 1;
        let (value, child_pv) = negamax(ctx, &child, depth - 1, ply + 1, (-beta, -alpha), counter)?;
        let value = -value;
        if value > best {
            best = value;
            best_move = Some(action);
            pv = cons!(action, child_pv);
        }
        if best > alpha {
            alpha = best;
        }
        if best >= beta {
            counter.beta_prunes += 1;
            break;
        }
    }

    ctx.store(position, depth, ply, best, ab, best_move);
    Ok((best, pv))
}

/// Root moves searched independently with a full window, merged by first maximum.
fn negamax_parallel_root<G: Game, E: Evaluate<G>>(
    ctx: &SearchContext<G, E>,
    position: &G,
    depth: u8,
    counter: &mut SearchCounter,
) -> Result<(Score, PV<G>), SearchError> {
    let actions = ctx.ordered_actions(position);
    if actions.is_empty() {
        return Err(SearchError::stuck(position));
    }
    let window = (-Score::INFINITY, Score::INFINITY);
    let results = actions[..]
        .par_iter()
        .map(|&action| {
            let child = position
                .apply(action)
                .map_err(|e| SearchError::refused_move(action, e))?;
            let mut c = SearchCounter {
                states_visited: 1,
                ..SearchCounter::ZERO
            };
            let (value, pv) = negamax(ctx, &child, depth - 1, 1, (-window.1, -window.0), &mut c)?;
            Ok((-value, cons!(action, pv), c))
        })
        .collect::<Result<Vec<_>, SearchError>>()?;

    let mut best = -Score::INFINITY;
    let mut best_pv = linked_list![];
    for (value, pv, c) in results {
        counter.add_in_place(&c);
        if value > best {
            best = value;
            best_pv = pv;
        }
    }
    Ok((best, best_pv))
}

/// Depth-bounded negamax searcher with alpha-beta pruning.
///
/// The transposition table lives as long as the searcher, so repeated
/// searches from related positions reuse earlier work. Entries are only
/// trusted at exactly the remaining depth they were computed with, which keeps
/// every result identical to a plain fixed-depth search.
pub struct MinimaxSearch<G: Game, E: Evaluate<G>> {
    pub config: MinimaxConfig,
    pub evaluator: E,
    tt: TT<G::Action>,
}

impl<G: Game, E: Evaluate<G>> MinimaxSearch<G, E> {
    pub fn new(config: MinimaxConfig, evaluator: E) -> Self {
        let tt = new_tt(config.tt_size_mb);
        Self { config, evaluator, tt }
    }

    pub fn tt(&self) -> &TT<G::Action> {
        &self.tt
    }

    pub fn clear_tt(&self) {
        self.tt.clear();
    }

    fn search_fixed_depth(
        &self,
        position: &G,
        depth: u8,
        counter: &mut SearchCounter,
    ) -> Result<(Score, PV<G>), SearchError> {
        let ctx = SearchContext {
            evaluator: &self.evaluator,
            tt: &self.tt,
            ordering: self.config.ordering,
        };
        if self.config.parallel {
            negamax_parallel_root(&ctx, position, depth, counter)
        } else {
            negamax(&ctx, position, depth, 0, (-Score::INFINITY, Score::INFINITY), counter)
        }
    }

    /// Searches `position` to `depth` plies and returns the best move for the side to move.
    pub fn search_depth(&self, position: &G, depth: u8) -> Result<SearchResult<G>, SearchError> {
        MinimaxConfig { depth, ..self.config }.validate()?;
        if position.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }

        let t0 = Instant::now();
        let mut counter = SearchCounter::ZERO;
        let (eval, pv) = match self.config.limits {
            Some(limits) => {
                let mut last = None;
                for d in 1..=depth {
                    let res = self.search_fixed_depth(position, d, &mut counter)?;
                    counter.last_depth = d;
                    debug!(depth = d, eval = %res.0, pv = %res.1.describe(), "minimax: iteration finished");
                    last = Some(res);
                    if limits.should_terminate(t0, counter.states_visited) {
                        break;
                    }
                }
                last.ok_or(ConfigError::DepthTooSmall(depth))?
            }
            None => {
                let res = self.search_fixed_depth(position, depth, &mut counter)?;
                counter.last_depth = depth;
                res
            }
        };

        let Some(best_move) = pv.head() else {
            return Err(SearchError::stuck(position));
        };
        if self.config.debug {
            info!(
                depth = counter.last_depth,
                eval = %eval,
                pv = %pv.describe(),
                states = counter.states_visited,
                evals = counter.evals,
                beta_prunes = counter.beta_prunes,
                tt_hits = counter.tt_hits,
                "minimax: {}",
                counter.summary(t0.elapsed().as_nanos())
            );
        }
        Ok(SearchResult::new(best_move, eval, pv, counter))
    }
}

impl<G: Game, E: Evaluate<G>> GameTreeSearch<G> for MinimaxSearch<G, E> {
    fn search(&mut self, position: &G) -> Result<SearchResult<G>, SearchError> {
        self.search_depth(position, self.config.depth)
    }
}
