use std::fmt;
use std::ops::{Index, RangeBounds};

use crate::error::{Error, Result};
use crate::policy::Monoid;
use crate::util::{check_index, normalize_range};

/// Point-update / range-fold segment tree over a [`Monoid`].
///
/// Leaf `i` is stored at slot `i + size`, where `size` is the smallest power of two `>= len`.
/// Every internal slot `k` holds `combine(data[2k], data[2k + 1])`.
#[derive(Clone)]
pub struct SegmentTree<M: Monoid> {
    monoid: M,
    len: usize,
    size: usize,
    data: Vec<M::Value>,
}

impl<M: Monoid + Default> SegmentTree<M> {
    pub fn new(len: usize) -> Self {
        Self::with_monoid(M::default(), len)
    }
}

impl<M: Monoid> SegmentTree<M> {
    /// Builds a tree of `len` identity leaves.
    pub fn with_monoid(monoid: M, len: usize) -> Self {
        let size = len.next_power_of_two();
        let data = vec![monoid.identity(); 2 * size];
        log::trace!("segment tree: len={len} size={size}");
        Self {
            monoid,
            len,
            size,
            data,
        }
    }

    /// Builds a tree over `values` in O(n).
    pub fn from_values(monoid: M, values: Vec<M::Value>) -> Self {
        let len = values.len();
        let size = len.next_power_of_two();
        let mut data = Vec::with_capacity(2 * size);
        data.resize(size, monoid.identity());
        data.extend(values);
        data.resize(2 * size, monoid.identity());

        let mut tree = Self {
            monoid,
            len,
            size,
            data,
        };
        for k in (1..size).rev() {
            tree.update(k);
        }
        log::trace!("segment tree: len={len} size={size}");
        tree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn monoid(&self) -> &M {
        &self.monoid
    }

    pub fn get(&self, index: usize) -> Result<&M::Value> {
        check_index(index, self.len)?;
        Ok(&self.data[index + self.size])
    }

    /// Replaces the value at `index`.
    pub fn set(&mut self, index: usize, value: M::Value) -> Result<()> {
        check_index(index, self.len)?;
        let mut k = index + self.size;
        self.data[k] = value;
        while k > 1 {
            k >>= 1;
            self.update(k);
        }
        Ok(())
    }

    /// Combines `value` onto the right of the value at `index`.
    pub fn apply(&mut self, index: usize, value: &M::Value) -> Result<()> {
        check_index(index, self.len)?;
        let merged = self.monoid.combine(&self.data[index + self.size], value);
        self.set(index, merged)
    }

    /// Folds `range` from left to right. An empty range yields the identity.
    pub fn prod<R: RangeBounds<usize>>(&self, range: R) -> Result<M::Value> {
        let (start, end) = normalize_range(range, self.len)?;

        let mut l = start + self.size;
        let mut r = end + self.size;
        let mut left = self.monoid.identity();
        let mut right = self.monoid.identity();

        while l < r {
            if (l & 1) == 1 {
                left = self.monoid.combine(&left, &self.data[l]);
                l += 1;
            }
            if (r & 1) == 1 {
                r -= 1;
                right = self.monoid.combine(&self.data[r], &right);
            }
            l >>= 1;
            r >>= 1;
        }

        Ok(self.monoid.combine(&left, &right))
    }

    pub fn all_prod(&self) -> &M::Value {
        &self.data[1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M::Value> {
        self.data[self.size..self.size + self.len].iter()
    }

    /// Checks every internal slot against its children and every padding leaf against the
    /// identity.
    pub fn verify(&self) -> Result<()>
    where
        M::Value: PartialEq + fmt::Debug,
    {
        let identity = self.monoid.identity();
        for k in self.size + self.len..2 * self.size {
            if self.data[k] != identity {
                return Err(Error::StructuralInconsistency(format!(
                    "padding slot {k} holds {:?}",
                    self.data[k]
                )));
            }
        }
        for k in 1..self.size {
            let expected = self.monoid.combine(&self.data[2 * k], &self.data[2 * k + 1]);
            if self.data[k] != expected {
                return Err(Error::StructuralInconsistency(format!(
                    "slot {k} holds {:?}, children combine to {expected:?}",
                    self.data[k]
                )));
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn update(&mut self, k: usize) {
        self.data[k] = self.monoid.combine(&self.data[2 * k], &self.data[2 * k + 1]);
    }
}

impl<M: Monoid + Default> From<Vec<M::Value>> for SegmentTree<M> {
    fn from(values: Vec<M::Value>) -> Self {
        Self::from_values(M::default(), values)
    }
}

impl<M: Monoid> Index<usize> for SegmentTree<M> {
    type Output = M::Value;

    fn index(&self, index: usize) -> &M::Value {
        assert!(index < self.len, "index {index} out of range for length {}", self.len);
        &self.data[index + self.size]
    }
}

impl<M> fmt::Debug for SegmentTree<M>
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
    use super::SegmentTree;
    use crate::error::Error;
    use crate::policy::{Affine, FnMonoid, Max, Min, Monoid, Sum};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn concat() -> FnMonoid<String, impl Fn(&String, &String) -> String + Clone> {
        FnMonoid::new(String::new(), |a: &String, b: &String| format!("{a}{b}"))
    }

    #[test]
    fn sum_over_small_array() {
        let seg = SegmentTree::<Sum>::from(vec![1, 2, 3, 4, 5]);
        assert_eq!(seg.prod(1..4), Ok(9));
        assert_eq!(seg.prod(..), Ok(15));
        assert_eq!(seg.prod(2..2), Ok(0));
        assert_eq!(*seg.all_prod(), 15);
        assert_eq!(seg[3], 4);
        seg.verify().unwrap();
    }

    #[test]
    fn empty_tree() {
        let seg = SegmentTree::<Min>::new(0);
        assert!(seg.is_empty());
        assert_eq!(seg.prod(0..0), Ok(i64::MAX));
        assert_eq!(seg.get(0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
        assert_eq!(*seg.all_prod(), i64::MAX);
    }

    #[test]
    fn out_of_range_is_reported_without_mutation() {
        let mut seg = SegmentTree::<Sum>::from(vec![1, 2, 3]);
        assert_eq!(seg.set(3, 10), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(seg.apply(7, &1), Err(Error::IndexOutOfRange { index: 7, len: 3 }));
        assert_eq!(
            seg.prod(1..4),
            Err(Error::RangeOutOfBounds { start: 1, end: 4, len: 3 })
        );
        assert_eq!(seg.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        seg.verify().unwrap();
    }

    #[test]
    fn non_commutative_fold_keeps_order() {
        let letters: Vec<String> = "segment".chars().map(String::from).collect();
        let mut seg = SegmentTree::from_values(concat(), letters);
        assert_eq!(seg.prod(..).unwrap(), "segment");
        assert_eq!(seg.prod(2..6).unwrap(), "gmen");
        seg.set(0, "S".to_string()).unwrap();
        seg.apply(6, &"s".to_string()).unwrap();
        assert_eq!(seg.prod(..).unwrap(), "Segments");
        assert_eq!(*seg.all_prod(), "Segments");
    }

    #[test]
    fn set_only_touches_one_leaf() {
        let mut seg = SegmentTree::<Max>::from(vec![5, 1, 4, 1, 3]);
        seg.set(2, -7).unwrap();
        assert_eq!(seg.iter().copied().collect::<Vec<_>>(), vec![5, 1, -7, 1, 3]);
        assert_eq!(seg.prod(1..4), Ok(1));
        seg.verify().unwrap();
    }

    #[test]
    fn random_affine_matches_bruteforce() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        let affine = Affine::default();
        let m = affine.modulus();

        for n in 0..40 {
            let mut values: Vec<(u64, u64)> = (0..n)
                .map(|_| (rng.random_range(0..m), rng.random_range(0..m)))
                .collect();
            let mut seg = SegmentTree::from_values(affine, values.clone());

            for _ in 0..200 {
                if n > 0 && rng.random_bool(0.3) {
                    let i = rng.random_range(0..n);
                    let f = (rng.random_range(0..m), rng.random_range(0..m));
                    seg.set(i, f).unwrap();
                    values[i] = f;
                }
                let l = rng.random_range(0..=n);
                let r = rng.random_range(l..=n);
                let expected = values[l..r]
                    .iter()
                    .fold(affine.identity(), |acc, f| affine.combine(&acc, f));
                assert_eq!(seg.prod(l..r), Ok(expected), "n={n} l={l} r={r}");
            }
            seg.verify().unwrap();
        }
    }
}
