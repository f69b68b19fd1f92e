use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use smallvec::SmallVec;

pub type HashValue = u64;

/// Legal moves of a position, in rules-engine enumeration order.
pub type ActionList<A> = SmallVec<[A; 64]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerId {
    #[default]
    PlayerFirst = 0,
    PlayerSecond = 1,
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerId::PlayerFirst => f.write_str("P1"),
            PlayerId::PlayerSecond => f.write_str("P2"),
        }
    }
}

impl PlayerId {
    #[inline]
    pub fn opposite(self) -> PlayerId {
        match self {
            PlayerId::PlayerFirst => PlayerId::PlayerSecond,
            PlayerId::PlayerSecond => PlayerId::PlayerFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminalReason {
    /// The side to move has been checkmated.
    Checkmate,
    Stalemate,
    DrawByRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    Ongoing,
    Terminal(TerminalReason),
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Terminal(..))
    }

    #[inline]
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Terminal(TerminalReason::Stalemate | TerminalReason::DrawByRule)
        )
    }
}

pub trait ZobristHashable {
    fn zobrist_hash(&self) -> HashValue;
}

/// Capability set consumed from the rules engine.
///
/// The search never inspects the position beyond this trait (and
/// [`crate::eval::BoardView`] for the positional evaluator). Implementations
/// must only enumerate legal moves, and `advance` must accept every move
/// returned by `actions`.
pub trait Game: ZobristHashable + Debug + Clone + Send + Sync {
    type Action: Copy + Send + Sync + Debug + PartialEq + Eq + Hash;
    type Actions: IntoIterator<Item = Self::Action>;
    type Error: Debug;

    fn to_move(&self) -> PlayerId;

    /// Legal moves in a stable enumeration order. Search tie-breaks depend on this order.
    fn actions(&self) -> Self::Actions;

    fn advance(&mut self, action: Self::Action) -> Result<(), Self::Error>;

    fn status(&self) -> GameStatus;

    /// Returns the position after `action` without modifying `self`.
    #[inline]
    fn apply(&self, action: Self::Action) -> Result<Self, Self::Error> {
        let mut next = self.clone();
        next.advance(action)?;
        Ok(next)
    }

    #[inline]
    fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// The player that delivered checkmate, if any.
    #[inline]
    fn winner(&self) -> Option<PlayerId> {
        match self.status() {
            GameStatus::Terminal(TerminalReason::Checkmate) => Some(self.to_move().opposite()),
            _ => None,
        }
    }

    /// Hint used by move ordering and the captures-first rollout policy.
    #[inline]
    fn is_capture(&self, _action: Self::Action) -> bool {
        false
    }

    #[inline]
    fn action_list(&self) -> ActionList<Self::Action> {
        self.actions().into_iter().collect()
    }
}
