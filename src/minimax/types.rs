use std::{
    fmt::{Debug, Display},
    ops::Neg,
};

/// Centipawn-style evaluation, always from the perspective of the side to move.
///
/// Checkmates are encoded as `MATE - ply` so that a shallower mate scores
/// higher than a deeper one, and a later loss scores higher than an earlier
/// one. Heuristic scores never reach [`Score::MATE_THRESHOLD`].
#[derive(Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score(pub i32);

impl Score {
    pub const MATE: i32 = 1_000_000;
    pub const MATE_THRESHOLD: i32 = Self::MATE - 1_000;

    pub const ZERO: Score = Score(0);
    pub const DRAW: Score = Score(0);
    /// Strictly above any reachable score, used as the initial alpha-beta window.
    pub const INFINITY: Score = Score(Self::MATE + 1);
    pub const MAX_HEURISTIC: Score = Score(Self::MATE_THRESHOLD - 1);

    /// Score of the side to move when it is already checkmated at `ply`.
    #[inline]
    pub const fn mated_in(ply: u8) -> Score {
        Score(-(Self::MATE - ply as i32))
    }

    /// Score of the side to move when it delivers mate at `ply`.
    #[inline]
    pub const fn mate_in(ply: u8) -> Score {
        Score(Self::MATE - ply as i32)
    }

    /// Clamps a heuristic sum so that it can never be confused with a mate score.
    #[inline]
    pub fn heuristic(value: i32) -> Score {
        Score(value.clamp(-Self::MAX_HEURISTIC.0, Self::MAX_HEURISTIC.0))
    }

    #[inline]
    pub fn is_mate(self) -> bool {
        self.0.abs() >= Self::MATE_THRESHOLD
    }

    /// Plies until mate if this is a mate score; positive when the side to move mates.
    pub fn mate_distance(self) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        let plies = Self::MATE - self.0.abs();
        Some(if self.0 > 0 { plies } else { -plies })
    }

    /// Re-bases a mate score from root-relative to node-relative before storing it.
    #[inline]
    pub(crate) fn to_tt(self, ply: u8) -> Score {
        let ply = ply as i32;
        if self.0 >= Self::MATE_THRESHOLD {
            Score(self.0 + ply)
        } else if self.0 <= -Self::MATE_THRESHOLD {
            Score(self.0 - ply)
        } else {
            self
        }
    }

    /// Inverse of [`Score::to_tt`].
    #[inline]
    pub(crate) fn from_tt(self, ply: u8) -> Score {
        let ply = ply as i32;
        if self.0 >= Self::MATE_THRESHOLD {
            Score(self.0 - ply)
        } else if self.0 <= -Self::MATE_THRESHOLD {
            Score(self.0 + ply)
        } else {
            self
        }
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Self::Output {
        Score(-self.0)
    }
}

impl Debug for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mate_distance() {
            Some(d) => write!(f, "Score(mate {d})"),
            None => f.debug_tuple("Score").field(&self.0).finish(),
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mate_distance() {
            Some(d) => write!(f, "#{d}"),
            None => write!(f, "{}", self.0),
        }
    }
}
