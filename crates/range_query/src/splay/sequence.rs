use std::fmt;
use std::ops::RangeBounds;

use super::forest::{Iter, SplayForest, Tree};
use crate::error::Result;
use crate::policy::Monoid;

/// A positional sequence backed by a single splay tree.
///
/// Every access splays the touched node to the root, so `get` takes `&mut self`.
pub struct SplaySequence<M: Monoid> {
    forest: SplayForest<M>,
    tree: Tree,
}

impl<M: Monoid + Default> SplaySequence<M> {
    pub fn new() -> Self {
        Self::with_monoid(M::default())
    }
}

impl<M: Monoid + Default> Default for SplaySequence<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Monoid> SplaySequence<M> {
    pub fn with_monoid(monoid: M) -> Self {
        Self::with_capacity(monoid, 0)
    }

    /// Pre-allocates the node pool for up to `capacity` elements.
    pub fn with_capacity(monoid: M, capacity: usize) -> Self {
        Self {
            forest: SplayForest::with_capacity(monoid, capacity),
            tree: Tree::empty(),
        }
    }

    pub fn from_values<I: IntoIterator<Item = M::Value>>(monoid: M, values: I) -> Self {
        let mut forest = SplayForest::with_monoid(monoid);
        let tree = forest.build(values);
        Self { forest, tree }
    }

    pub fn len(&self) -> usize {
        self.forest.len(&self.tree)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn get(&mut self, index: usize) -> Result<&M::Value> {
        self.forest.get(&mut self.tree, index)
    }

    pub fn set(&mut self, index: usize, value: M::Value) -> Result<()> {
        self.forest.set(&mut self.tree, index, value)
    }

    pub fn insert(&mut self, index: usize, value: M::Value) -> Result<()> {
        self.forest.insert(&mut self.tree, index, value)
    }

    pub fn remove(&mut self, index: usize) -> Result<M::Value> {
        self.forest.remove(&mut self.tree, index)
    }

    pub fn push(&mut self, value: M::Value) {
        self.forest.push_back(&mut self.tree, value);
    }

    pub fn pop(&mut self) -> Option<M::Value> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.forest.remove(&mut self.tree, len - 1).ok()
    }

    pub fn prod<R: RangeBounds<usize>>(&mut self, range: R) -> Result<M::Value> {
        self.forest.prod(&mut self.tree, range)
    }

    pub fn all_prod(&self) -> M::Value {
        self.forest.all_prod(&self.tree)
    }

    /// Moves the value at `r` to position `l`, in either direction.
    pub fn shift(&mut self, l: usize, r: usize) -> Result<()> {
        self.forest.shift(&mut self.tree, l, r)
    }

    /// Rotates the window `range` left by `k`. Negative `k` rotates right.
    pub fn shift_by<R: RangeBounds<usize>>(&mut self, range: R, k: i64) -> Result<()> {
        self.forest.shift_by(&mut self.tree, range, k)
    }

    pub fn iter(&self) -> Iter<'_, M> {
        self.forest.iter(&self.tree)
    }

    pub fn verify(&self) -> Result<()>
    where
        M::Value: PartialEq + fmt::Debug,
    {
        self.forest.verify(&self.tree)
    }

    /// Gives up the single-tree view, e.g. to split the sequence into several trees.
    pub fn into_parts(self) -> (SplayForest<M>, Tree) {
        (self.forest, self.tree)
    }
}

impl<M: Monoid + Default> FromIterator<M::Value> for SplaySequence<M> {
    fn from_iter<I: IntoIterator<Item = M::Value>>(iter: I) -> Self {
        Self::from_values(M::default(), iter)
    }
}

impl<M> fmt::Debug for SplaySequence<M>
where
    M: Monoid,
    M::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SplaySequence;
    use crate::error::Error;
    use crate::policy::{Min, Sum};

    #[test]
    fn vector_commands() {
        let mut seq = SplaySequence::<Sum>::with_capacity(Sum, 8);
        seq.push(1);
        seq.push(2);
        seq.push(3);
        assert_eq!(seq.pop(), Some(3));
        seq.push(4);
        assert_eq!(seq.get(0), Ok(&1));
        assert_eq!(seq.get(1), Ok(&2));
        assert_eq!(seq.get(2), Ok(&4));
        assert_eq!(seq.get(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(seq.all_prod(), 7);
        seq.verify().unwrap();
    }

    #[test]
    fn rotate_window_scenario() {
        let mut seq: SplaySequence<Sum> = (0..10).collect();
        seq.shift_by(2..7, 3).unwrap();
        assert_eq!(
            seq.iter().copied().collect::<Vec<_>>(),
            vec![0, 1, 5, 6, 2, 3, 4, 7, 8, 9]
        );
        seq.verify().unwrap();
    }

    #[test]
    fn shift_and_min() {
        let mut seq = SplaySequence::from_values(Min, 0..10);
        assert_eq!(seq.prod(5..=7), Ok(5));
        seq.shift(2, 5).unwrap();
        assert_eq!(seq.prod(5..=7), Ok(4));
        seq.shift(7, 2).unwrap();
        assert_eq!(format!("{seq:?}"), "[0, 1, 2, 3, 4, 6, 7, 5, 8, 9]");
        assert_eq!(seq.prod(5..=7), Ok(5));
        seq.shift(2, 7).unwrap();
        seq.set(6, -1).unwrap();
        assert_eq!(seq.prod(..), Ok(-1));
        assert_eq!(format!("{seq:?}"), "[0, 1, 5, 2, 3, 4, -1, 7, 8, 9]");
    }

    #[test]
    fn errors_leave_sequence_untouched() {
        let mut seq: SplaySequence<Sum> = [3, 1, 4].into_iter().collect();
        assert!(seq.insert(5, 0).is_err());
        assert!(seq.remove(3).is_err());
        assert!(seq.shift_by(1..4, 1).is_err());
        assert!(seq.shift(3, 1).is_err());
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![3, 1, 4]);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn into_parts_allows_splitting() {
        let seq: SplaySequence<Sum> = (1..=6).collect();
        let (mut forest, mut tree) = seq.into_parts();
        let right = forest.split_off(&mut tree, 2).unwrap();
        assert_eq!(forest.all_prod(&tree), 3);
        assert_eq!(forest.all_prod(&right), 18);
        let tree = forest.merge(right, tree);
        assert_eq!(
            forest.iter(&tree).copied().collect::<Vec<_>>(),
            vec![3, 4, 5, 6, 1, 2]
        );
    }
}
