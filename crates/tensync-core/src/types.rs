//! Core type aliases shared by every enumerator and tensor wrapper.
//!
//! - [`Axis`] and [`Rank`] name dimension indices and dimension counts
//! - [`Point`] is one coordinate tuple produced by an enumerator
//! - [`Position`] is the 0-based visitation index of a point
//!
//! # Examples
//!
//! ```
//! use tensync_core::{Abacus, IndexEnumerator, Point};
//!
//! let mut abacus = Abacus::new(&[2, 3]).unwrap();
//! let first: Point = abacus.next_point().unwrap();
//! assert_eq!(&first[..], &[0, 0]);
//! ```

use smallvec::SmallVec;

/// Index of a single dimension (zero-based).
pub type Axis = usize;

/// Number of dimensions of a tensor or enumerator.
pub type Rank = usize;

/// Coordinate tuple, one entry per dimension with `0 <= point[i] < dimensions[i]`.
///
/// Inline for up to 6 dimensions and heap-allocated beyond that. Every point an
/// enumerator hands out is an owned snapshot; enumerators never alias a buffer
/// that callers may retain.
pub type Point = SmallVec<[usize; 6]>;

/// Linear visitation index of a point. 64 bits wide so dimension products past
/// the 32-bit range stay addressable on every target.
pub type Position = u64;

/// Lifecycle of an enumerator cursor.
///
/// `Fresh` until the first point is produced or a seek happens, `Iterating`
/// while points remain, `Exhausted` once the position reaches the state count.
/// [`set_position`](crate::IndexEnumerator::set_position) can move any state
/// back to `Iterating`.
///
/// [`has_next`](crate::IndexEnumerator::has_next) is a pure query and never
/// moves the state: a cursor that has only been asked `has_next` is still
/// `Fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumeratorState {
    /// No point produced yet
    Fresh,
    /// At least one point produced, more remain
    Iterating,
    /// Every point has been produced
    Exhausted,
}

/// Product of `dimensions` as a state count, or `None` on 64-bit overflow.
pub(crate) fn checked_state_count(dimensions: &[usize]) -> Option<u64> {
    dimensions
        .iter()
        .try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
}
