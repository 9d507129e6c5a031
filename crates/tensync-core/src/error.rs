//! Error types for index enumeration and coordinate validation
//!
//! Errors fall into three families, each detected as early as possible:
//!
//! - **Construction** ([`ConstructionError`]): invalid dimension vectors,
//!   duplicate or out-of-range shift dimensions. Raised by constructors, never
//!   deferred to first use.
//! - **Bounds** ([`BoundsError`]): a coordinate, position or bulk shape that does
//!   not fit the structure it addresses. Raised before any lock is taken or any
//!   storage is touched.
//! - **Exhaustion** ([`TensorError::Exhausted`]): stepping an enumerator past its
//!   last point. Distinct from bounds errors since no data was requested.
//!
//! # Examples
//!
//! ```
//! use tensync_core::error::{ConstructionError, TensorError};
//!
//! fn validate(dimensions: &[usize]) -> Result<(), TensorError> {
//!     if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
//!         return Err(ConstructionError::ZeroDimension { axis }.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate(&[2, 0, 3]).is_err());
//! assert!(validate(&[2, 3]).is_ok());
//! ```

use thiserror::Error;

/// Top-level error type for enumerators and cell access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    /// Invalid construction parameters
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// Coordinate, position or shape outside the addressed structure
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// `next` called after the last point was produced
    #[error("Enumerator exhausted after {state_count} states")]
    Exhausted { state_count: u64 },
}

/// Errors detected while building an enumerator, store or policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Dimension {axis} has size 0; every dimension must be at least 1")]
    ZeroDimension { axis: usize },

    #[error("Dimension product of {dimensions:?} does not fit in 64 bits")]
    StateCountOverflow { dimensions: Vec<usize> },

    #[error("Shift dimension {axis} is listed more than once")]
    DuplicateShiftDimension { axis: usize },

    #[error("Shift dimension {axis} is out of range for rank {rank}")]
    ShiftDimensionOutOfRange { axis: usize, rank: usize },

    #[error("Axis {axis} is out of range for rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },

    #[error("Lock stripe count must be at least 1")]
    InvalidStripeCount,
}

/// Errors raised when a request does not fit the structure it addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundsError {
    #[error("Coordinate rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    #[error("Index out of bounds: index {index:?} exceeds shape {shape:?}")]
    OutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Position {position} is out of range for {state_count} states")]
    PositionOutOfRange { position: u64, state_count: u64 },

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Locked value {value} is out of range for dimension {axis} with size {size}")]
    LockedValueOutOfRange {
        axis: usize,
        value: usize,
        size: usize,
    },
}

/// Result type alias for enumerator and cell access operations
pub type TensorResult<T> = Result<T, TensorError>;

impl TensorError {
    /// Create an index out of bounds error
    pub fn out_of_bounds(index: &[usize], shape: &[usize]) -> Self {
        TensorError::Bounds(BoundsError::OutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        })
    }

    /// Create a coordinate rank mismatch error
    pub fn rank_mismatch(expected: usize, got: usize) -> Self {
        TensorError::Bounds(BoundsError::RankMismatch { expected, got })
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        TensorError::Bounds(BoundsError::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }

    /// True for construction-time failures
    pub fn is_construction(&self) -> bool {
        matches!(self, TensorError::Construction(_))
    }

    /// True for bounds failures
    pub fn is_bounds(&self) -> bool {
        matches!(self, TensorError::Bounds(_))
    }

    /// True when an enumerator was stepped past its end
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TensorError::Exhausted { .. })
    }
}

/// Check that `coords` has the right rank and lies inside `shape`.
///
/// Pure validation with no side effects; callers run it before taking any lock.
pub fn check_coords(coords: &[usize], shape: &[usize]) -> TensorResult<()> {
    if coords.len() != shape.len() {
        return Err(TensorError::rank_mismatch(shape.len(), coords.len()));
    }
    if coords.iter().zip(shape).any(|(&c, &s)| c >= s) {
        return Err(TensorError::out_of_bounds(coords, shape));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_error_display() {
        let err = ConstructionError::ZeroDimension { axis: 2 };
        assert_eq!(
            err.to_string(),
            "Dimension 2 has size 0; every dimension must be at least 1"
        );
    }

    #[test]
    fn test_tensor_error_from_construction() {
        let err: TensorError = ConstructionError::DuplicateShiftDimension { axis: 1 }.into();
        assert!(err.is_construction());
        assert!(!err.is_bounds());
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = TensorError::out_of_bounds(&[1, 2, 3], &[1, 2, 2]);
        assert!(err.is_bounds());
        assert_eq!(
            err.to_string(),
            "Bounds error: Index out of bounds: index [1, 2, 3] exceeds shape [1, 2, 2]"
        );
    }

    #[test]
    fn test_exhausted_is_not_bounds() {
        let err = TensorError::Exhausted { state_count: 4 };
        assert!(err.is_exhausted());
        assert!(!err.is_bounds());
    }

    #[test]
    fn test_check_coords() {
        assert!(check_coords(&[0, 1], &[2, 2]).is_ok());
        assert_eq!(
            check_coords(&[0], &[2, 2]),
            Err(TensorError::rank_mismatch(2, 1))
        );
        assert!(check_coords(&[2, 0], &[2, 2]).unwrap_err().is_bounds());
        assert!(check_coords(&[], &[]).is_ok());
    }
}
