//! Error types for the core pixel pipeline.

use crate::scopes::histogram::Channel;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for the given dimensions")]
    BufferSize { expected: usize, actual: usize },
    #[error("image dimensions {width}x{height} overflow the address space")]
    DimensionOverflow { width: u32, height: u32 },
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("invalid grading preset: {0}")]
    Preset(#[from] serde_json::Error),
}

/// Failures of the histogram scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("{channel} value {value} does not fit in {num_bins} bins")]
    IndexOutOfRange {
        channel: Channel,
        value: u8,
        num_bins: usize,
    },
    #[error("histogram needs at least one bin")]
    ZeroBins,
    #[error("channel bin counts differ: {left} and {right} bins")]
    BinMismatch { left: usize, right: usize },
}
