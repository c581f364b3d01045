//! Slice parameter validation
use crate::error::RangeError;

/// Validated slice request: skip `start` nodes, keep at most `limit`, then
/// keep every `step`-th node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceBounds {
    pub start: usize,
    pub limit: Option<usize>,
    pub step: Option<usize>,
}

impl SliceBounds {
    /// Check every parameter before anything is traversed.
    ///
    /// `stop` is absolute and is first made relative to `start`; `start` must
    /// not exceed that relative limit.
    pub fn new(
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Result<Self, RangeError> {
        let start = match start {
            Some(start) if start < 0 => return Err(RangeError::NegativeStart(start)),
            Some(start) => start,
            None => 0,
        };

        let limit = match stop {
            Some(stop) if stop < 0 => return Err(RangeError::NegativeStop(stop)),
            Some(stop) => {
                let limit = stop - start;
                if start > limit {
                    return Err(RangeError::StartAfterStop { start, stop });
                }
                Some(limit as usize)
            }
            None => None,
        };

        let step = match step {
            Some(step) if step <= 0 => return Err(RangeError::NonPositiveStep(step)),
            Some(step) => Some(step as usize),
            None => None,
        };

        Ok(Self {
            start: start as usize,
            limit,
            step,
        })
    }
}
