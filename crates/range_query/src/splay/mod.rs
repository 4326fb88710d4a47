mod forest;
mod sequence;

pub use forest::{Iter, SplayForest, Tree};
pub use sequence::SplaySequence;
