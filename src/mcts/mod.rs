//! Monte Carlo Tree Search with UCT selection and random rollouts.

use std::time::Instant;

use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::{ConfigError, SearchError},
    eval::Evaluate,
    game_tree_search::*,
    linked_list::LinkedList,
};

pub mod debug;
pub mod node;
pub mod policy;
pub mod tree;

pub use node::{Node, NodeId};
pub use policy::{reward_to_score, score_to_reward, RolloutKind, RolloutPolicy};
pub use tree::SearchTree;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MctsConfig {
    pub iterations: u32,
    pub exploration_constant: f64,
    pub rollout: RolloutKind,
    /// Rollouts stop after this many plies and fall back to the evaluator.
    pub rollout_depth_cap: u32,
    /// Evaluator scores are mapped to rewards with `tanh(score / rollout_eval_scale)`.
    pub rollout_eval_scale: f64,
    /// `None` draws a seed from the thread RNG.
    pub seed: Option<u64>,
    /// Independent trees searched in parallel, merged at the root.
    pub threads: u32,
    pub limits: Option<SearchLimits>,
    pub debug: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration_constant: std::f64::consts::SQRT_2,
            rollout: RolloutKind::UniformRandom,
            rollout_depth_cap: 100,
            rollout_eval_scale: 400.0,
            seed: None,
            threads: 1,
            limits: None,
            debug: false,
        }
    }
}

impl MctsConfig {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }

    pub fn with_exploration_constant(self, exploration_constant: f64) -> Self {
        Self {
            exploration_constant,
            ..self
        }
    }

    pub fn with_rollout(self, rollout: RolloutKind) -> Self {
        Self { rollout, ..self }
    }

    pub fn with_rollout_depth_cap(self, rollout_depth_cap: u32) -> Self {
        Self {
            rollout_depth_cap,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_threads(self, threads: u32) -> Self {
        Self { threads, ..self }
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
        if self.iterations < 1 {
            return Err(ConfigError::IterationsTooSmall(self.iterations));
        }
        if !(self.exploration_constant.is_finite() && self.exploration_constant > 0.0) {
            return Err(ConfigError::InvalidExplorationConstant(self.exploration_constant));
        }
        if !(self.rollout_eval_scale.is_finite() && self.rollout_eval_scale > 0.0) {
            return Err(ConfigError::InvalidRolloutEvalScale(self.rollout_eval_scale));
        }
        if self.threads < 1 {
            return Err(ConfigError::NoThreads);
        }
        Ok(())
    }
}

/// Borrowed search state shared by the worker trees.
struct Worker<'a, G: Game, E: Evaluate<G>, P: RolloutPolicy<G>> {
    config: &'a MctsConfig,
    evaluator: &'a E,
    policy: &'a P,
    _game: std::marker::PhantomData<fn(&G)>,
}

impl<'a, G: Game, E: Evaluate<G>, P: RolloutPolicy<G>> Worker<'a, G, E, P> {
    /// Outcome for the side to move at `start`, in `[-1, 1]`, and the number of plies played.
    fn simulate(&self, start: &G, rng: &mut SmallRng) -> Result<(f64, u64), SearchError> {
        let mover = start.to_move();
        let mut game = start.clone();
        let mut plies = 0u64;
        while !game.is_terminal() && plies < u64::from(self.config.rollout_depth_cap) {
            let actions = game.action_list();
            if actions.is_empty() {
                return Err(SearchError::stuck(&game));
            }
            let action = self.policy.choose(&game, &actions, rng);
            game.advance(action).map_err(|e| SearchError::refused_move(action, e))?;
            plies += 1;
        }

        let value = match game.status() {
            GameStatus::Terminal(TerminalReason::Checkmate) => {
                if game.to_move() == mover {
                    -1.0
                } else {
                    1.0
                }
            }
            GameStatus::Terminal(..) => 0.0,
            GameStatus::Ongoing => {
                let ply = plies.min(u64::from(u8::MAX)) as u8;
                let score = self.evaluator.evaluate(&game, ply);
                let score = if game.to_move() == mover { score } else { -score };
                score_to_reward(score, self.config.rollout_eval_scale)
            }
        };
        Ok((value, plies))
    }

    /// Selection, expansion, simulation and backpropagation.
    fn iteration(
        &self,
        tree: &mut SearchTree<G>,
        rng: &mut SmallRng,
        counter: &mut SearchCounter,
    ) -> Result<(), SearchError> {
        let c = self.config.exploration_constant;
        let mut id = tree.root();
        while tree.get(id).is_fully_expanded() && !tree.get(id).is_terminal() {
            match tree.best_child(id, c) {
                Some(child) => id = child,
                None => break,
            }
        }

        if !tree.get(id).is_terminal() {
            if let Some(child) = tree.expand(id)? {
                counter.states_visited += 1;
                id = child;
            }
        }

        let (value, plies) = self.simulate(&tree.get(id).state, rng)?;
        counter.rollout_plies += plies;
        tree.backpropagate(id, value);
        counter.iterations += 1;
        Ok(())
    }

    /// Grows one tree. At least one iteration always runs.
    fn run(
        &self,
        position: &G,
        iterations: u32,
        seed: u64,
    ) -> Result<(SearchTree<G>, SearchCounter), SearchError> {
        let mut tree = SearchTree::new(position.clone())?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut counter = SearchCounter::ZERO;
        let t0 = Instant::now();
        for i in 0..iterations {
            if i > 0 {
                if let Some(limits) = self.config.limits {
                    if limits.should_terminate(t0, counter.states_visited + counter.rollout_plies) {
                        break;
                    }
                }
            }
            self.iteration(&mut tree, &mut rng, &mut counter)?;
        }
        Ok((tree, counter))
    }
}

/// Root statistics of one move merged across worker trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootStat<A> {
    pub action: A,
    pub visits: u32,
    pub reward: f64,
}

/// UCT Monte Carlo Tree Search.
///
/// Every call to [`GameTreeSearch::search`] builds a fresh tree. The tree
/// of the first worker is kept in `tree` until the next search for
/// inspection and debugging.
pub struct MctsSearch<G: Game, E: Evaluate<G>, P: RolloutPolicy<G> = RolloutKind> {
    pub config: MctsConfig,
    pub evaluator: E,
    pub policy: P,
    pub tree: Option<SearchTree<G>>,
    pub root_stats: Vec<RootStat<G::Action>>,
}

impl<G: Game, E: Evaluate<G>> MctsSearch<G, E, RolloutKind> {
    pub fn new(config: MctsConfig, evaluator: E) -> Self {
        Self::with_policy(config, evaluator, config.rollout)
    }
}

impl<G: Game, E: Evaluate<G>, P: RolloutPolicy<G>> MctsSearch<G, E, P> {
    pub fn with_policy(config: MctsConfig, evaluator: E, policy: P) -> Self {
        Self {
            config,
            evaluator,
            policy,
            tree: None,
            root_stats: vec![],
        }
    }

    /// Runs `iterations` iterations (split across `config.threads` trees) and picks the most visited root move.
    pub fn search_iterations(&mut self, position: &G, iterations: u32) -> Result<SearchResult<G>, SearchError> {
        let config = MctsConfig { iterations, ..self.config };
        config.validate()?;
        if position.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }

        let t0 = Instant::now();
        let base_seed = config.seed.unwrap_or_else(rand::random);
        let worker = Worker {
            config: &config,
            evaluator: &self.evaluator,
            policy: &self.policy,
            _game: std::marker::PhantomData,
        };

        let threads = config.threads;
        let trees = if threads == 1 {
            vec![worker.run(position, iterations, base_seed)?]
        } else {
            (0..threads)
                .into_par_iter()
                .map(|i| {
                    let share = iterations / threads + u32::from(i < iterations % threads);
                    worker.run(position, share.max(1), base_seed.wrapping_add(u64::from(i)))
                })
                .collect::<Result<Vec<_>, SearchError>>()?
        };

        let mut counter = SearchCounter::ZERO;
        for (_, c) in &trees {
            counter.add_in_place(c);
        }
        let stats = merge_root_stats(position, trees.iter().map(|(tree, _)| tree));

        let mut best: Option<&RootStat<G::Action>> = None;
        for stat in &stats {
            match best {
                Some(b) if stat.visits <= b.visits => {}
                _ => best = Some(stat),
            }
        }
        let Some(best) = best.copied().filter(|b| b.visits > 0) else {
            return Err(SearchError::stuck(position));
        };

        let Some((tree, _)) = trees.into_iter().next() else {
            return Err(SearchError::stuck(position));
        };
        let mut pv_moves = vec![best.action];
        if let Some(child) = tree.child_for(tree.root(), best.action) {
            pv_moves.extend(tree.principal_variation(child));
        }
        let pv = LinkedList::from_slice(&pv_moves);
        let eval = reward_to_score(best.reward / f64::from(best.visits), config.rollout_eval_scale);

        debug!(
            iterations = counter.iterations,
            best = ?best.action,
            visits = best.visits,
            eval = %eval,
            "mcts: search finished"
        );
        if config.debug {
            debug!(
                nodes = tree.len(),
                pv = %pv.describe(),
                "mcts: {}\n{}",
                counter.summary(t0.elapsed().as_nanos()),
                tree.dump_tree(tree.root(), 2, 40, &|a| format!("{a:?}")).render()
            );
        }

        self.tree = Some(tree);
        self.root_stats = stats;
        Ok(SearchResult::new(best.action, eval, pv, counter))
    }
}

/// Sums root child statistics by move, in enumeration order of `position`.
fn merge_root_stats<'t, G: Game + 't>(
    position: &G,
    trees: impl Iterator<Item = &'t SearchTree<G>>,
) -> Vec<RootStat<G::Action>> {
    let mut stats: Vec<RootStat<G::Action>> = position
        .actions()
        .into_iter()
        .map(|action| RootStat {
            action,
            visits: 0,
            reward: 0.0,
        })
        .collect();
    for tree in trees {
        for &(action, child) in &tree.get(tree.root()).children {
            if let Some(stat) = stats.iter_mut().find(|s| s.action == action) {
                let node = tree.get(child);
                stat.visits += node.visits;
                stat.reward += node.reward;
            }
        }
    }
    stats
}

impl<G: Game, E: Evaluate<G>, P: RolloutPolicy<G>> GameTreeSearch<G> for MctsSearch<G, E, P> {
    fn search(&mut self, position: &G) -> Result<SearchResult<G>, SearchError> {
        self.search_iterations(position, self.config.iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimax::Score;

    #[test]
    fn test_config_validation() {
        assert_eq!(Ok(()), MctsConfig::default().validate());
        assert_eq!(
            Err(ConfigError::IterationsTooSmall(0)),
            MctsConfig::new(0).validate()
        );
        assert_eq!(
            Err(ConfigError::InvalidExplorationConstant(0.0)),
            MctsConfig::default().with_exploration_constant(0.0).validate()
        );
        assert!(matches!(
            MctsConfig::default().with_exploration_constant(f64::NAN).validate(),
            Err(ConfigError::InvalidExplorationConstant(..))
        ));
        assert_eq!(
            Err(ConfigError::InvalidRolloutEvalScale(-1.0)),
            MctsConfig {
                rollout_eval_scale: -1.0,
                ..Default::default()
            }
            .validate()
        );
        assert_eq!(Err(ConfigError::NoThreads), MctsConfig::default().with_threads(0).validate());
    }

    #[test]
    fn test_even_reward_maps_to_zero_score() {
        assert_eq!(Score::ZERO, reward_to_score(0.0, 400.0));
    }
}
