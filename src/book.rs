//! Opening book collaborators.

use std::{hash::Hash, sync::Mutex};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Looks up a book move for the game so far.
pub trait OpeningBook<A>: Send + Sync {
    /// `history` holds every move played from the initial position, oldest first.
    fn lookup(&self, history: &[A]) -> Option<A>;
}

/// A book that never answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBook;

impl<A> OpeningBook<A> for NoBook {
    #[inline]
    fn lookup(&self, _: &[A]) -> Option<A> {
        None
    }
}

impl<A, B: OpeningBook<A> + ?Sized> OpeningBook<A> for Box<B> {
    fn lookup(&self, history: &[A]) -> Option<A> {
        (**self).lookup(history)
    }
}

/// Book built from complete move lines.
///
/// Every prefix of an inserted line maps to the move that follows it. When a
/// prefix has several recorded continuations the book answers with the first
/// one, or with a random one when built with [`LineBook::with_seed`].
#[derive(Debug)]
pub struct LineBook<A: Copy + Eq + Hash> {
    continuations: FxHashMap<Vec<A>, SmallVec<[A; 4]>>,
    rng: Option<Mutex<SmallRng>>,
}

impl<A: Copy + Eq + Hash> Default for LineBook<A> {
    fn default() -> Self {
        Self {
            continuations: Default::default(),
            rng: None,
        }
    }
}

impl<A: Copy + Eq + Hash> LineBook<A> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            continuations: Default::default(),
            rng: Some(Mutex::new(SmallRng::seed_from_u64(seed))),
        }
    }

    pub fn insert_line(&mut self, line: &[A]) {
        for (i, &next) in line.iter().enumerate() {
            let entry = self.continuations.entry(line[..i].to_vec()).or_default();
            if !entry.contains(&next) {
                entry.push(next);
            }
        }
    }

    pub fn from_lines<'a, I: IntoIterator<Item = &'a [A]>>(lines: I) -> Self
    where
        A: 'a,
    {
        let mut book = Self::new();
        for line in lines {
            book.insert_line(line);
        }
        book
    }

    pub fn continuations(&self, history: &[A]) -> &[A] {
        self.continuations.get(history).map(|c| &c[..]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.continuations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.continuations.is_empty()
    }
}

impl<A: Copy + Eq + Hash + Send + Sync> OpeningBook<A> for LineBook<A> {
    fn lookup(&self, history: &[A]) -> Option<A> {
        let moves = self.continuations(history);
        match (moves.len(), &self.rng) {
            (0, _) => None,
            (1, _) | (_, None) => moves.first().copied(),
            (n, Some(rng)) => {
                let i = rng.lock().map(|mut r| r.gen_range(0..n)).unwrap_or(0);
                moves.get(i).copied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_book() {
        assert_eq!(None, OpeningBook::<u8>::lookup(&NoBook, &[]));
    }

    #[test]
    fn test_line_book_prefixes() {
        let book = LineBook::from_lines([&[1u8, 2, 3][..], &[1, 4][..]]);
        assert_eq!(Some(1), book.lookup(&[]));
        assert_eq!(Some(2), book.lookup(&[1]));
        assert_eq!(&[2u8, 4][..], book.continuations(&[1]));
        assert_eq!(Some(3), book.lookup(&[1, 2]));
        assert_eq!(None, book.lookup(&[1, 2, 3]));
        assert_eq!(None, book.lookup(&[9]));
        assert_eq!(3, book.len());
    }

    #[test]
    fn test_seeded_choice_stays_in_book() {
        let mut book = LineBook::with_seed(3);
        book.insert_line(&[10u8, 1]);
        book.insert_line(&[20u8]);
        book.insert_line(&[30u8]);
        let mut seen = [false; 3];
        for _ in 0..100 {
            match book.lookup(&[]) {
                Some(10) => seen[0] = true,
                Some(20) => seen[1] = true,
                Some(30) => seen[2] = true,
                other => panic!("unexpected book move {other:?}"),
            }
        }
        assert_eq!([true; 3], seen);
    }
}
