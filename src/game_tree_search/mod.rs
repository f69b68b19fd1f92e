use std::{
    ops::{Add, Index, IndexMut},
    time::Instant,
};

mod game_trait;

pub use game_trait::*;

use crate::{error::SearchError, linked_list::LinkedList, minimax::Score};

/// Principal Variation: the sequence of moves the search expects both sides to play.
#[allow(type_alias_bounds)]
pub type PV<G: Game> = LinkedList<G::Action>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByPlayer<T>(pub T, pub T);

impl<T> ByPlayer<T> {
    #[inline]
    pub const fn new(a: T, b: T) -> Self {
        Self(a, b)
    }

    #[inline]
    pub fn get(&self, player_id: PlayerId) -> &T {
        match player_id {
            PlayerId::PlayerFirst => &self.0,
            PlayerId::PlayerSecond => &self.1,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, player_id: PlayerId) -> &mut T {
        match player_id {
            PlayerId::PlayerFirst => &mut self.0,
            PlayerId::PlayerSecond => &mut self.1,
        }
    }

    #[inline]
    pub fn map<A, F: FnMut(T) -> A>(self, mut f: F) -> ByPlayer<A> {
        ByPlayer::<A>::new(f(self.0), f(self.1))
    }
}

impl<T> Index<PlayerId> for ByPlayer<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: PlayerId) -> &Self::Output {
        self.get(index)
    }
}

impl<T> IndexMut<PlayerId> for ByPlayer<T> {
    #[inline]
    fn index_mut(&mut self, index: PlayerId) -> &mut Self::Output {
        self.get_mut(index)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchCounter {
    /// Number of positions produced by applying a move.
    pub states_visited: u64,
    /// Number of positions scored by the evaluator (zero depth or terminal).
    pub evals: u64,
    /// Number of beta cut-offs.
    pub beta_prunes: u64,
    /// Number of transposition table probes that ended the node early.
    pub tt_hits: u64,
    /// Last finished depth for iterative deepening.
    pub last_depth: u8,
    /// Completed MCTS iterations.
    pub iterations: u64,
    /// Moves played inside MCTS rollouts.
    pub rollout_plies: u64,
}

impl SearchCounter {
    pub const ZERO: SearchCounter = SearchCounter {
        states_visited: 0,
        evals: 0,
        beta_prunes: 0,
        tt_hits: 0,
        last_depth: 0,
        iterations: 0,
        rollout_plies: 0,
    };

    #[inline]
    pub fn add_in_place(&mut self, c: &SearchCounter) {
        self.states_visited += c.states_visited;
        self.evals += c.evals;
        self.beta_prunes += c.beta_prunes;
        self.tt_hits += c.tt_hits;
        self.last_depth = self.last_depth.max(c.last_depth);
        self.iterations += c.iterations;
        self.rollout_plies += c.rollout_plies;
    }

    pub fn summary(&self, dt_ns: u128) -> String {
        let dt_ms: f64 = 1e-6 * (dt_ns as f64);
        let visited = self.states_visited + self.rollout_plies;
        let rate: f64 = 1e3 * (visited as f64) / (dt_ns.max(1) as f64);
        format!("dt={dt_ms:.2}ms rate={rate:.4} Mstates/s")
    }
}

impl Add for SearchCounter {
    type Output = SearchCounter;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        let mut a = self;
        a.add_in_place(&rhs);
        a
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult<G: Game> {
    pub best_move: G::Action,
    /// Score of `best_move` from the perspective of the side to move at the root.
    pub eval: Score,
    /// Principal Variation, starting with `best_move`.
    pub pv: PV<G>,
    pub counter: SearchCounter,
}

impl<G: Game> SearchResult<G> {
    #[inline]
    pub(crate) fn new(best_move: G::Action, eval: Score, pv: PV<G>, counter: SearchCounter) -> Self {
        SearchResult {
            best_move,
            eval,
            pv,
            counter,
        }
    }
}

/// A move-selection engine rooted at the side to move.
pub trait GameTreeSearch<G: Game> {
    fn search(&mut self, position: &G) -> Result<SearchResult<G>, SearchError>;
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchLimits {
    pub max_time_ms: Option<u64>,
    pub max_positions: Option<u64>,
}

impl SearchLimits {
    pub fn with_max_time_ms(max_time_ms: u64) -> Self {
        Self {
            max_time_ms: Some(max_time_ms),
            ..Default::default()
        }
    }

    pub fn should_terminate(&self, start_time: Instant, positions_searched: u64) -> bool {
        if let Some(max_time_ms) = self.max_time_ms {
            if start_time.elapsed().as_millis() >= u128::from(max_time_ms) {
                return true;
            }
        }
        if let Some(max_positions) = self.max_positions {
            return positions_searched >= max_positions;
        }

        false
    }
}
