use std::{fmt::Debug, sync::Arc};

use itertools::Itertools;

#[derive(Debug, Clone)]
pub struct Cons<T: Clone>(pub T, pub LinkedList<T>);

/// A persistent singly linked list sharing tails through `std::sync::Arc`.
///
/// Prepending is O(1) and never copies the tail, which is what the minimax
/// recursion needs when it extends a child's principal variation.
#[derive(Debug, Clone)]
pub struct LinkedList<T: Clone>(pub Option<Arc<Cons<T>>>);

impl<T: Clone> Default for LinkedList<T> {
    fn default() -> Self {
        Self(Default::default())
    }
}

impl<T: Clone> LinkedList<T> {
    pub fn decons(&self) -> Option<(T, LinkedList<T>)> {
        self.0.as_ref().map(|rc| (rc.0.clone(), rc.1.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn head(&self) -> Option<T> {
        self.0.as_ref().map(|rc| rc.0.clone())
    }

    pub fn tail(&self) -> Option<LinkedList<T>> {
        self.0.as_ref().map(|rc| rc.1.clone())
    }

    pub fn iter(&self) -> LinkedListIterView<'_, T> {
        LinkedListIterView { ptr: self }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    pub fn from_slice(items: &[T]) -> Self {
        items
            .iter()
            .rev()
            .fold(Self::default(), |tail, x| LinkedList(Some(Arc::new(Cons(x.clone(), tail)))))
    }
}

impl<T: Clone + Debug> LinkedList<T> {
    /// Space-separated debug rendering, used in search logs.
    pub fn describe(&self) -> String {
        self.iter().map(|x| format!("{x:?}")).join(" ")
    }
}

impl<'a, T: Clone> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;

    type IntoIter = LinkedListIterView<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct LinkedListIterView<'a, T: Clone> {
    ptr: &'a LinkedList<T>,
}

impl<'a, T: Clone> Iterator for LinkedListIterView<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let cons = self.ptr.0.as_ref()?;
        let Cons(a, b) = cons.as_ref();
        self.ptr = b;
        Some(a)
    }
}

#[macro_export]
#[doc(hidden)]
macro_rules! cons {
    ($x: expr, $xs: expr) => {
        $crate::linked_list::LinkedList(Some(::std::sync::Arc::new($crate::linked_list::Cons($x, $xs))))
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! linked_list {
    ($(,)?) => {
        $crate::linked_list::LinkedList(None)
    };
    ($x: expr $(,)?) => {
        $crate::cons!($x, $crate::linked_list![])
    };
    ($x: expr, $($xs: expr),+) => {
        $crate::cons!($x, $crate::linked_list![$($xs),+])
    };
}
