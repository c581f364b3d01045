//! Error types and handling for lazy streams
//!
//! Every failure is a deterministic failure of a single operation. Nothing is
//! retried, and a failing operation never leaves a half-resolved link behind.

/// Main error type for stream operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// A walk needed more nodes than the stream has
    #[error("node index out of range: requested {requested} step(s), only {available} available")]
    OutOfRange { requested: isize, available: usize },
    /// Slice parameters were rejected before any traversal
    #[error("invalid slice range: {0}")]
    InvalidRange(#[from] RangeError),
}

impl StreamError {
    pub(crate) fn out_of_range(requested: isize, available: usize) -> Self {
        StreamError::OutOfRange {
            requested,
            available,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StreamError::OutOfRange { .. })
    }
}

/// Reasons a slice request is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("start must be a nonnegative integer, not {0}")]
    NegativeStart(isize),
    #[error("stop must be a nonnegative integer, not {0}")]
    NegativeStop(isize),
    #[error("step must be a positive integer, not {0}")]
    NonPositiveStep(isize),
    #[error("start ({start}) must be less than or equal to stop ({stop}) minus start")]
    StartAfterStop { start: isize, stop: isize },
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
