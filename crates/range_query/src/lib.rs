//! Range-query data structures: a segment tree, a lazy-propagation segment tree and a
//! splay-tree sequence keyed by position.
//!
//! - All ranges are half-open `[l, r)` and accept any `RangeBounds<usize>`.
//! - Bad indices and ranges are reported as [`Error`] before anything is mutated.
//! - The algebra (combine, identity, update operators) comes from a [`Monoid`] /
//!   [`MapMonoid`] value stored in each structure.

mod error;
mod lazy_segment_tree;
mod segment_tree;
mod util;

pub mod policy;
pub mod splay;

pub use error::{Error, Result};
pub use lazy_segment_tree::LazySegmentTree;
pub use policy::{
    Affine, FnMonoid, MapMonoid, Max, Min, Monoid, RangeAddMin, RangeAddSum, RangeAffineSum,
    RangeAssignMin, Sum,
};
pub use segment_tree::SegmentTree;
pub use splay::{SplayForest, SplaySequence, Tree};
