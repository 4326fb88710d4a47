//! Algebra policies for the range-query structures.
//!
//! Policies are plain values stored inside each structure, so two trees over the same value type
//! can carry different operators (e.g. a runtime modulus, or a closure via [`FnMonoid`]).

/// An associative operation over `Value` with a two-sided identity.
///
/// Implementations must ensure, for all `a`, `b`, `c`:
///
/// - `combine(&combine(&a, &b), &c) == combine(&a, &combine(&b, &c))`
/// - `combine(&identity(), &a) == a == combine(&a, &identity())`
///
/// Neither law is checked at runtime. `combine` is never assumed to be commutative: `left`
/// always covers the positions before `right`.
pub trait Monoid {
    type Value: Clone;

    fn identity(&self) -> Self::Value;

    /// Merge aggregates as `left ++ right`.
    fn combine(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;
}

/// A monoid of update operators `Act` acting on the aggregates of a [`Monoid`].
///
/// Besides the monoid laws for `act_compose` / `act_unit`, implementations must ensure that
/// `act_apply` distributes over `combine` once scaled by [`MapMonoid::act_power`]:
///
/// `act_apply(power(f, m + n), combine(a, b)) == combine(act_apply(power(f, m), a), act_apply(power(f, n), b))`
///
/// where `a` and `b` aggregate `m` and `n` values.
pub trait MapMonoid: Monoid {
    type Act: Clone;

    fn act_unit(&self) -> Self::Act;

    /// Compose actions as `new ∘ old` (apply `old` first, then `new`).
    fn act_compose(&self, new: &Self::Act, old: &Self::Act) -> Self::Act;

    fn act_apply(&self, act: &Self::Act, value: &Self::Value) -> Self::Value;

    /// Turn `act` into the action that has the effect of applying `act` to each of the `len`
    /// values under an aggregate.
    ///
    /// The default returns `act` unchanged. That is only correct when acting on the aggregate
    /// already matches acting on every element (assignment, chmin, add over min/max).
    /// Additive updates over sums must override this, e.g. by scaling the delta by `len`.
    #[inline(always)]
    fn act_power(&self, act: &Self::Act, len: usize) -> Self::Act {
        let _ = len;
        act.clone()
    }
}

/// A [`Monoid`] built from an identity value and a combine closure.
#[derive(Clone)]
pub struct FnMonoid<T, F> {
    identity: T,
    combine: F,
}

impl<T, F> FnMonoid<T, F>
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    pub fn new(identity: T, combine: F) -> Self {
        Self { identity, combine }
    }
}

impl<T, F> Monoid for FnMonoid<T, F>
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    type Value = T;

    fn identity(&self) -> T {
        self.identity.clone()
    }

    fn combine(&self, left: &T, right: &T) -> T {
        (self.combine)(left, right)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sum;

impl Monoid for Sum {
    type Value = i64;

    #[inline(always)]
    fn identity(&self) -> i64 {
        0
    }

    #[inline(always)]
    fn combine(&self, left: &i64, right: &i64) -> i64 {
        left + right
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Min;

impl Monoid for Min {
    type Value = i64;

    #[inline(always)]
    fn identity(&self) -> i64 {
        i64::MAX
    }

    #[inline(always)]
    fn combine(&self, left: &i64, right: &i64) -> i64 {
        *left.min(right)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Max;

impl Monoid for Max {
    type Value = i64;

    #[inline(always)]
    fn identity(&self) -> i64 {
        i64::MIN
    }

    #[inline(always)]
    fn combine(&self, left: &i64, right: &i64) -> i64 {
        *left.max(right)
    }
}

/// Composition of affine maps `x -> a * x + b` modulo `modulus`.
///
/// `combine(f, g)` is "`f` then `g`", so a range product is the map obtained by applying the
/// elements from left to right. Not commutative.
#[derive(Clone, Copy, Debug)]
pub struct Affine {
    modulus: u64,
}

impl Affine {
    pub const DEFAULT_MODULUS: u64 = 998_244_353;

    pub fn new(modulus: u64) -> Self {
        assert!(
            modulus > 1 && modulus <= u32::MAX as u64,
            "modulus {modulus} must lie in 2..=u32::MAX"
        );
        Self { modulus }
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Evaluates the map `(a, b)` at `x`.
    pub fn eval(&self, (a, b): (u64, u64), x: u64) -> u64 {
        (a * (x % self.modulus) + b) % self.modulus
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MODULUS)
    }
}

impl Monoid for Affine {
    type Value = (u64, u64);

    #[inline(always)]
    fn identity(&self) -> (u64, u64) {
        (1, 0)
    }

    #[inline(always)]
    fn combine(&self, &(a1, b1): &(u64, u64), &(a2, b2): &(u64, u64)) -> (u64, u64) {
        let m = self.modulus;
        (a2 * a1 % m, (a2 * b1 + b2) % m)
    }
}

/// Range add over range sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeAddSum;

impl Monoid for RangeAddSum {
    type Value = i64;

    #[inline(always)]
    fn identity(&self) -> i64 {
        0
    }

    #[inline(always)]
    fn combine(&self, left: &i64, right: &i64) -> i64 {
        left + right
    }
}

impl MapMonoid for RangeAddSum {
    type Act = i64;

    #[inline(always)]
    fn act_unit(&self) -> i64 {
        0
    }

    #[inline(always)]
    fn act_compose(&self, new: &i64, old: &i64) -> i64 {
        new + old
    }

    #[inline(always)]
    fn act_apply(&self, act: &i64, value: &i64) -> i64 {
        value + act
    }

    #[inline(always)]
    fn act_power(&self, act: &i64, len: usize) -> i64 {
        act * len as i64
    }
}

/// Range assign over range min. `None` is the no-op action.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeAssignMin;

impl Monoid for RangeAssignMin {
    type Value = i64;

    #[inline(always)]
    fn identity(&self) -> i64 {
        i64::MAX
    }

    #[inline(always)]
    fn combine(&self, left: &i64, right: &i64) -> i64 {
        *left.min(right)
    }
}

impl MapMonoid for RangeAssignMin {
    type Act = Option<i64>;

    #[inline(always)]
    fn act_unit(&self) -> Option<i64> {
        None
    }

    #[inline(always)]
    fn act_compose(&self, new: &Option<i64>, old: &Option<i64>) -> Option<i64> {
        new.or(*old)
    }

    #[inline(always)]
    fn act_apply(&self, act: &Option<i64>, value: &i64) -> i64 {
        act.unwrap_or(*value)
    }
}

/// Range add over range min. The identity (`i64::MAX`) absorbs additions.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeAddMin;

impl Monoid for RangeAddMin {
    type Value = i64;

    #[inline(always)]
    fn identity(&self) -> i64 {
        i64::MAX
    }

    #[inline(always)]
    fn combine(&self, left: &i64, right: &i64) -> i64 {
        *left.min(right)
    }
}

impl MapMonoid for RangeAddMin {
    type Act = i64;

    #[inline(always)]
    fn act_unit(&self) -> i64 {
        0
    }

    #[inline(always)]
    fn act_compose(&self, new: &i64, old: &i64) -> i64 {
        new + old
    }

    #[inline(always)]
    fn act_apply(&self, act: &i64, value: &i64) -> i64 {
        if *value == i64::MAX { i64::MAX } else { value + act }
    }
}

/// Range affine update `x -> a * x + b` over range sum, modulo `modulus`.
#[derive(Clone, Copy, Debug)]
pub struct RangeAffineSum {
    modulus: u64,
}

impl RangeAffineSum {
    pub fn new(modulus: u64) -> Self {
        assert!(
            modulus > 1 && modulus <= u32::MAX as u64,
            "modulus {modulus} must lie in 2..=u32::MAX"
        );
        Self { modulus }
    }
}

impl Default for RangeAffineSum {
    fn default() -> Self {
        Self::new(Affine::DEFAULT_MODULUS)
    }
}

impl Monoid for RangeAffineSum {
    type Value = u64;

    #[inline(always)]
    fn identity(&self) -> u64 {
        0
    }

    #[inline(always)]
    fn combine(&self, left: &u64, right: &u64) -> u64 {
        (left + right) % self.modulus
    }
}

impl MapMonoid for RangeAffineSum {
    type Act = (u64, u64);

    #[inline(always)]
    fn act_unit(&self) -> (u64, u64) {
        (1, 0)
    }

    #[inline(always)]
    fn act_compose(&self, &(a2, b2): &(u64, u64), &(a1, b1): &(u64, u64)) -> (u64, u64) {
        let m = self.modulus;
        (a2 * a1 % m, (a2 * b1 + b2) % m)
    }

    #[inline(always)]
    fn act_apply(&self, &(a, b): &(u64, u64), value: &u64) -> u64 {
        (a * (value % self.modulus) + b) % self.modulus
    }

    #[inline(always)]
    fn act_power(&self, &(a, b): &(u64, u64), len: usize) -> (u64, u64) {
        (a, b * (len as u64 % self.modulus) % self.modulus)
    }
}
