use rand::{rngs::SmallRng, Rng};
use smallvec::SmallVec;

use crate::{game_tree_search::Game, minimax::Score};

/// Chooses the moves played during a rollout.
pub trait RolloutPolicy<G: Game>: Send + Sync {
    /// `actions` is never empty.
    fn choose(&self, position: &G, actions: &[G::Action], rng: &mut SmallRng) -> G::Action;
}

/// Built-in rollout policies, selectable from configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RolloutKind {
    /// Every legal move with equal probability.
    #[default]
    UniformRandom,
    /// A random capture when one exists, otherwise a random move.
    CapturesFirst,
}

#[inline]
fn pick<A: Copy>(actions: &[A], rng: &mut SmallRng) -> A {
    actions[rng.gen_range(0..actions.len())]
}

impl<G: Game> RolloutPolicy<G> for RolloutKind {
    fn choose(&self, position: &G, actions: &[G::Action], rng: &mut SmallRng) -> G::Action {
        match self {
            RolloutKind::UniformRandom => pick(actions, rng),
            RolloutKind::CapturesFirst => {
                let captures: SmallVec<[G::Action; 16]> =
                    actions.iter().copied().filter(|a| position.is_capture(*a)).collect();
                if captures.is_empty() {
                    pick(actions, rng)
                } else {
                    pick(&captures, rng)
                }
            }
        }
    }
}

/// Maps an evaluation to a reward in `[-1, 1]`; mate scores saturate.
#[inline]
pub fn score_to_reward(score: Score, scale: f64) -> f64 {
    if score.is_mate() {
        return f64::from(score.0.signum());
    }
    (f64::from(score.0) / scale).tanh()
}

/// Inverse of [`score_to_reward`] for reporting mean rewards as scores.
#[inline]
pub fn reward_to_score(reward: f64, scale: f64) -> Score {
    let r = reward.clamp(-0.999_999, 0.999_999);
    Score::heuristic((r.atanh() * scale).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::tree_game::TreeGame;
    use rand::SeedableRng;

    #[test]
    fn test_reward_mapping() {
        assert_eq!(1.0, score_to_reward(Score::mate_in(3), 400.0));
        assert_eq!(-1.0, score_to_reward(Score::mated_in(0), 400.0));
        assert_eq!(0.0, score_to_reward(Score::ZERO, 400.0));
        let r = score_to_reward(Score(200), 400.0);
        assert!(r > 0.0 && r < 1.0);
        assert_eq!(Score(200), reward_to_score(r, 400.0));
    }

    #[test]
    fn test_captures_first_rollout() {
        let game = TreeGame::captures_fixture();
        let actions = game.action_list();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let a = RolloutKind::CapturesFirst.choose(&game, &actions, &mut rng);
            assert!(a == 1 || a == 3);
        }
    }

    #[test]
    fn test_uniform_rollout_covers_all_moves() {
        let game = TreeGame::captures_fixture();
        let actions = game.action_list();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[RolloutKind::UniformRandom.choose(&game, &actions, &mut rng) as usize] = true;
        }
        assert_eq!([true; 4], seen);
    }
}
