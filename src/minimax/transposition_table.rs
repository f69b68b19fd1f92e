use crate::{game_tree_search::HashValue, transposition_table::CacheTable};

use super::Score;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    /// Fail-high: the true value is at least `value`.
    Lower,
    /// Fail-low: the true value is at most `value`.
    Upper,
}

impl TTFlag {
    #[inline]
    pub fn classify(value: Score, alpha0: Score, beta: Score) -> TTFlag {
        if value <= alpha0 {
            TTFlag::Upper
        } else if value >= beta {
            TTFlag::Lower
        } else {
            TTFlag::Exact
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TTEntry<A: Copy> {
    pub flag: TTFlag,
    /// Remaining depth the entry was searched with.
    pub depth: u8,
    /// Node-relative score, see [`Score::to_tt`].
    pub value: Score,
    pub best_move: Option<A>,
}

impl<A: Copy> TTEntry<A> {
    #[inline]
    pub fn new(flag: TTFlag, depth: u8, value: Score, best_move: Option<A>) -> Self {
        Self {
            flag,
            depth,
            value,
            best_move,
        }
    }

    /// The stored value if it settles a node searched with `depth` and window `(alpha, beta)`.
    #[inline]
    pub fn cutoff(&self, depth: u8, alpha: Score, beta: Score, ply: u8) -> Option<Score> {
        if self.depth != depth {
            return None;
        }
        let value = self.value.from_tt(ply);
        match self.flag {
            TTFlag::Exact => Some(value),
            TTFlag::Lower if value >= beta => Some(value),
            TTFlag::Upper if value <= alpha => Some(value),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct TTKey(pub HashValue);

impl From<TTKey> for usize {
    #[inline]
    fn from(value: TTKey) -> Self {
        value.0 as usize
    }
}

pub const DEFAULT_SIZE_MB: u32 = 16;

/// Transposition table shared by every task of one `MinimaxSearch`.
pub type TT<A> = CacheTable<TTKey, TTEntry<A>>;

#[inline]
pub fn new_tt<A: Copy>(megabytes: u32) -> TT<A> {
    CacheTable::new(megabytes as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let (a, b) = (Score(-10), Score(10));
        assert_eq!(TTFlag::Upper, TTFlag::classify(Score(-10), a, b));
        assert_eq!(TTFlag::Lower, TTFlag::classify(Score(10), a, b));
        assert_eq!(TTFlag::Exact, TTFlag::classify(Score(3), a, b));
    }

    #[test]
    fn test_cutoff_requires_equal_depth() {
        let entry = TTEntry::<u8>::new(TTFlag::Exact, 3, Score(12), Some(1));
        assert_eq!(None, entry.cutoff(2, -Score::INFINITY, Score::INFINITY, 1));
        assert_eq!(None, entry.cutoff(4, -Score::INFINITY, Score::INFINITY, 1));
        assert_eq!(Some(Score(12)), entry.cutoff(3, -Score::INFINITY, Score::INFINITY, 1));
    }

    #[test]
    fn test_cutoff_bounds() {
        let lower = TTEntry::<u8>::new(TTFlag::Lower, 2, Score(50), None);
        assert_eq!(Some(Score(50)), lower.cutoff(2, Score(0), Score(40), 1));
        assert_eq!(None, lower.cutoff(2, Score(0), Score(60), 1));

        let upper = TTEntry::<u8>::new(TTFlag::Upper, 2, Score(-50), None);
        assert_eq!(Some(Score(-50)), upper.cutoff(2, Score(-40), Score(0), 1));
        assert_eq!(None, upper.cutoff(2, Score(-60), Score(0), 1));
    }

    #[test]
    fn test_table_round_trip() {
        let tt = new_tt::<u8>(1);
        let key = TTKey(0xdead_beef);
        tt.set(&key, TTEntry::new(TTFlag::Exact, 1, Score(7), Some(3)));
        let entry = tt.get(&key);
        assert_eq!(Some(Some(3)), entry.map(|e| e.best_move));
        assert_eq!(None, tt.get(&TTKey(1)).map(|e| e.depth));
    }
}
