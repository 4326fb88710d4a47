use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("range {start}..{end} out of bounds for length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    /// An internal invariant does not hold. Only reported by the `verify` methods.
    #[error("structural inconsistency: {0}")]
    StructuralInconsistency(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
