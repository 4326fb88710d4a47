use std::fmt;
use std::ops::RangeBounds;

use crate::error::{Error, Result};
use crate::policy::MapMonoid;
use crate::util::{check_index, normalize_range};

/// Range-update / range-fold segment tree over a [`MapMonoid`].
///
/// `lazy[k]` (for internal slots) is an action already applied to `data[k]` but not yet pushed
/// to the children of `k`. `length[k]` is the number of leaves below `k`, fed to
/// [`MapMonoid::act_power`] whenever an action lands on a slot.
///
/// Reads take `&mut self`: every read first pushes the pending actions on the root-to-boundary
/// paths so that no stale slot is ever observed.
#[derive(Clone)]
pub struct LazySegmentTree<M: MapMonoid> {
    monoid: M,
    len: usize,
    size: usize,
    log: u32,
    data: Vec<M::Value>,
    lazy: Vec<M::Act>,
    length: Vec<usize>,
}

impl<M: MapMonoid + Default> LazySegmentTree<M> {
    pub fn new(len: usize) -> Self {
        Self::with_monoid(M::default(), len)
    }
}

impl<M: MapMonoid> LazySegmentTree<M> {
    pub fn with_monoid(monoid: M, len: usize) -> Self {
        let values = vec![monoid.identity(); len];
        Self::from_values(monoid, values)
    }

    pub fn from_values(monoid: M, values: Vec<M::Value>) -> Self {
        let len = values.len();
        let size = len.next_power_of_two();
        let log = size.trailing_zeros();

        let mut data = Vec::with_capacity(2 * size);
        data.resize(size, monoid.identity());
        data.extend(values);
        data.resize(2 * size, monoid.identity());
        let lazy = vec![monoid.act_unit(); size];
        let mut length = vec![1; 2 * size];
        for k in (1..size).rev() {
            length[k] = length[2 * k] + length[2 * k + 1];
        }

        let mut tree = Self {
            monoid,
            len,
            size,
            log,
            data,
            lazy,
            length,
        };
        for k in (1..size).rev() {
            tree.update(k);
        }
        log::trace!("lazy segment tree: len={len} size={size} log={log}");
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

    pub fn set(&mut self, index: usize, value: M::Value) -> Result<()> {
        check_index(index, self.len)?;
        let p = index + self.size;
        for i in (1..=self.log).rev() {
            self.propagate(p >> i);
        }
        self.data[p] = value;
        for i in 1..=self.log {
            self.update(p >> i);
        }
        Ok(())
    }

    pub fn get(&mut self, index: usize) -> Result<M::Value> {
        check_index(index, self.len)?;
        let p = index + self.size;
        for i in (1..=self.log).rev() {
            self.propagate(p >> i);
        }
        Ok(self.data[p].clone())
    }

    pub fn prod<R: RangeBounds<usize>>(&mut self, range: R) -> Result<M::Value> {
        let (start, end) = normalize_range(range, self.len)?;
        if start == end {
            return Ok(self.monoid.identity());
        }

        let mut l = start + self.size;
        let mut r = end + self.size;
        self.propagate_boundaries(l, r);

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

    /// Applies `act` to the single value at `index`.
    pub fn apply(&mut self, index: usize, act: &M::Act) -> Result<()> {
        check_index(index, self.len)?;
        let p = index + self.size;
        for i in (1..=self.log).rev() {
            self.propagate(p >> i);
        }
        self.data[p] = self.monoid.act_apply(act, &self.data[p]);
        for i in 1..=self.log {
            self.update(p >> i);
        }
        Ok(())
    }

    /// Applies `act` to every value in `range`.
    pub fn apply_range<R: RangeBounds<usize>>(&mut self, range: R, act: &M::Act) -> Result<()> {
        let (start, end) = normalize_range(range, self.len)?;
        if start == end {
            return Ok(());
        }

        let l = start + self.size;
        let r = end + self.size;
        self.propagate_boundaries(l, r);

        {
            let mut l = l;
            let mut r = r;
            while l < r {
                if (l & 1) == 1 {
                    self.apply_to_slot(l, act);
                    l += 1;
                }
                if (r & 1) == 1 {
                    r -= 1;
                    self.apply_to_slot(r, act);
                }
                l >>= 1;
                r >>= 1;
            }
        }

        for i in 1..=self.log {
            if ((l >> i) << i) != l {
                self.update(l >> i);
            }
            if ((r >> i) << i) != r {
                self.update((r - 1) >> i);
            }
        }
        Ok(())
    }

    /// Pushes every pending action down and returns the leaves in order.
    pub fn to_vec(&mut self) -> Vec<M::Value> {
        for k in 1..self.size {
            self.propagate(k);
        }
        self.data[self.size..self.size + self.len].to_vec()
    }

    /// Checks that every internal slot equals its pending action applied to the combine of its
    /// children, and that leaf counts add up.
    pub fn verify(&self) -> Result<()>
    where
        M::Value: PartialEq + fmt::Debug,
    {
        for k in 1..self.size {
            if self.length[k] != self.length[2 * k] + self.length[2 * k + 1] {
                return Err(Error::StructuralInconsistency(format!(
                    "slot {k} counts {} leaves",
                    self.length[k]
                )));
            }
            let merged = self.monoid.combine(&self.data[2 * k], &self.data[2 * k + 1]);
            let act = self.monoid.act_power(&self.lazy[k], self.length[k]);
            let expected = self.monoid.act_apply(&act, &merged);
            if self.data[k] != expected {
                return Err(Error::StructuralInconsistency(format!(
                    "slot {k} holds {:?}, expected {expected:?}",
                    self.data[k]
                )));
            }
        }
        Ok(())
    }

    /// Pushes pending actions into every slot on the paths to the boundaries of `[l, r)`,
    /// top-down. Slots whose subtree is aligned with a boundary are skipped.
    fn propagate_boundaries(&mut self, l: usize, r: usize) {
        for i in (1..=self.log).rev() {
            if ((l >> i) << i) != l {
                self.propagate(l >> i);
            }
            if ((r >> i) << i) != r {
                self.propagate((r - 1) >> i);
            }
        }
    }

    #[inline(always)]
    fn update(&mut self, k: usize) {
        self.data[k] = self.monoid.combine(&self.data[2 * k], &self.data[2 * k + 1]);
    }

    #[inline(always)]
    fn apply_to_slot(&mut self, k: usize, act: &M::Act) {
        let scaled = self.monoid.act_power(act, self.length[k]);
        self.data[k] = self.monoid.act_apply(&scaled, &self.data[k]);
        if k < self.size {
            self.lazy[k] = self.monoid.act_compose(act, &self.lazy[k]);
        }
    }

    #[inline(always)]
    fn propagate(&mut self, k: usize) {
        let act = std::mem::replace(&mut self.lazy[k], self.monoid.act_unit());
        self.apply_to_slot(2 * k, &act);
        self.apply_to_slot(2 * k + 1, &act);
    }
}

impl<M: MapMonoid + Default> From<Vec<M::Value>> for LazySegmentTree<M> {
    fn from(values: Vec<M::Value>) -> Self {
        Self::from_values(M::default(), values)
    }
}

impl<M> fmt::Debug for LazySegmentTree<M>
where
    M: MapMonoid,
    M::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySegmentTree")
            .field("len", &self.len)
            .field("all_prod", self.all_prod())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::LazySegmentTree;
    use crate::error::Error;
    use crate::policy::{MapMonoid, RangeAddMin, RangeAddSum, RangeAffineSum, RangeAssignMin};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn range_add_then_sum() {
        let mut seg = LazySegmentTree::<RangeAddSum>::from(vec![1, 2, 3, 4, 5]);
        assert_eq!(seg.prod(1..4), Ok(9));
        seg.apply_range(0..3, &10).unwrap();
        assert_eq!(seg.prod(0..5), Ok(45));
        assert_eq!(*seg.all_prod(), 45);
        assert_eq!(seg.to_vec(), vec![11, 12, 13, 4, 5]);
        seg.verify().unwrap();
    }

    #[test]
    fn power_scales_window_sum() {
        let n = 37;
        let mut seg = LazySegmentTree::<RangeAddSum>::new(n);
        for (l, r, delta) in [(0, 37, 3), (5, 17, -2), (16, 16, 100), (30, 31, 7)] {
            let before = seg.prod(l..r).unwrap();
            seg.apply_range(l..r, &delta).unwrap();
            assert_eq!(seg.prod(l..r).unwrap() - before, (r - l) as i64 * delta);
        }
        seg.verify().unwrap();
    }

    #[test]
    fn empty_range_is_noop_and_errors_do_not_mutate() {
        let mut seg = LazySegmentTree::<RangeAssignMin>::from(vec![4, 2, 9]);
        seg.apply_range(1..1, &Some(0)).unwrap();
        assert_eq!(
            seg.apply_range(0..4, &Some(0)),
            Err(Error::RangeOutOfBounds { start: 0, end: 4, len: 3 })
        );
        assert_eq!(seg.apply(3, &Some(0)), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(seg.to_vec(), vec![4, 2, 9]);
        assert_eq!(seg.prod(..), Ok(2));
    }

    #[test]
    fn empty_tree() {
        let mut seg = LazySegmentTree::<RangeAddSum>::new(0);
        assert!(seg.is_empty());
        assert_eq!(seg.prod(..), Ok(0));
        seg.apply_range(.., &5).unwrap();
        assert_eq!(seg.get(0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
        assert_eq!(seg.to_vec(), Vec::<i64>::new());
    }

    #[test]
    fn composed_applies_equal_single_apply() {
        let p = RangeAffineSum::default();
        let values: Vec<u64> = (0..23).map(|i| i * 7 + 1).collect();
        let f1 = (3, 5);
        let f2 = (2, 11);

        let mut twice = LazySegmentTree::from_values(p, values.clone());
        twice.apply_range(4..19, &f1).unwrap();
        twice.apply_range(4..19, &f2).unwrap();

        let mut once = LazySegmentTree::from_values(p, values);
        once.apply_range(4..19, &p.act_compose(&f2, &f1)).unwrap();

        assert_eq!(twice.to_vec(), once.to_vec());
        assert_eq!(twice.prod(..), once.prod(..));
    }

    #[test]
    fn point_apply_and_set() {
        let mut seg = LazySegmentTree::<RangeAddMin>::from(vec![5, 3, 8, 6]);
        seg.apply_range(1..3, &10).unwrap();
        seg.apply(0, &-1).unwrap();
        assert_eq!(seg.get(0), Ok(4));
        assert_eq!(seg.prod(1..4), Ok(6));
        seg.set(3, 20).unwrap();
        assert_eq!(seg.prod(1..4), Ok(13));
        assert_eq!(seg.to_vec(), vec![4, 13, 18, 20]);
        seg.verify().unwrap();
    }

    #[test]
    fn random_operations_match_vec() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        let p = RangeAffineSum::default();
        let m = 998_244_353_u64;

        for n in [1, 2, 3, 7, 8, 9, 31, 64, 100] {
            let mut vec: Vec<u64> = (0..n).map(|_| rng.random_range(0..m)).collect();
            let mut seg = LazySegmentTree::from_values(p, vec.clone());

            for _ in 0..500 {
                let l = rng.random_range(0..=n);
                let r = rng.random_range(l..=n);
                match rng.random_range(0..4) {
                    0 => {
                        let f = (rng.random_range(0..m), rng.random_range(0..m));
                        seg.apply_range(l..r, &f).unwrap();
                        for value in &mut vec[l..r] {
                            *value = (f.0 * *value + f.1) % m;
                        }
                    }
                    1 => {
                        if l == n {
                            continue;
                        }
                        let value = rng.random_range(0..m);
                        seg.set(l, value).unwrap();
                        vec[l] = value;
                    }
                    2 => {
                        if l == n {
                            continue;
                        }
                        assert_eq!(seg.get(l), Ok(vec[l]));
                    }
                    _ => {
                        let expected = vec[l..r].iter().fold(0, |acc, v| (acc + v) % m);
                        assert_eq!(seg.prod(l..r), Ok(expected), "n={n} l={l} r={r}");
                    }
                }
            }
            seg.verify().unwrap();
            assert_eq!(seg.to_vec(), vec);
        }
    }

    #[test]
    fn random_assign_min_matches_vec() {
        let mut rng = StdRng::seed_from_u64(0xDEAD_BEEF);
        let n = 50;
        let mut vec: Vec<i64> = (0..n).map(|_| rng.random_range(-100..=100)).collect();
        let mut seg = LazySegmentTree::<RangeAssignMin>::from(vec.clone());

        for _ in 0..2000 {
            let l = rng.random_range(0..n);
            let r = rng.random_range(l + 1..=n);
            if rng.random_bool(0.5) {
                let x = rng.random_range(-100..=100);
                seg.apply_range(l..r, &Some(x)).unwrap();
                vec[l..r].fill(x);
            } else {
                let expected = *vec[l..r].iter().min().unwrap();
                assert_eq!(seg.prod(l..r), Ok(expected));
            }
        }
        seg.verify().unwrap();
    }
}
