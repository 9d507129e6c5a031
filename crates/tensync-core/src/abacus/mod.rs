//! Mixed-radix index enumerators
//!
//! This module provides the odometer-style enumerators that walk every
//! coordinate of a dense tensor in a deterministic order.
//!
//! # Enumerators
//!
//! - [`Abacus`]: plain mixed-radix odometer, last dimension fastest
//! - [`EmptyAbacus`]: zero-state placeholder that never yields
//! - [`DimensionLockingAbacus`]: freezes chosen dimensions at fixed values
//! - [`LockShiftingAbacus`]: moves a chosen subset of dimensions to the
//!   outermost (slowest) precedence
//!
//! All of them implement [`IndexEnumerator`], support O(rank) random seek via
//! [`point_at`](IndexEnumerator::point_at) and
//! [`set_position`](IndexEnumerator::set_position), and hand out owned
//! [`Point`] snapshots.
//!
//! # Example
//!
//! ```
//! use tensync_core::abacus::{split_ranges, Abacus, IndexEnumerator};
//!
//! let abacus = Abacus::new(&[4, 25]).unwrap();
//!
//! // Give each worker its own cursor over a contiguous slice of positions
//! for range in split_ranges(abacus.state_count(), 4) {
//!     let mut worker = abacus.fresh_clone();
//!     worker.set_position(range.start).unwrap();
//!     for _ in range {
//!         let point = worker.next_point().unwrap();
//!         assert_eq!(point.len(), 2);
//!     }
//! }
//! ```

mod locking;
mod radix;
mod shifting;

use crate::error::TensorResult;
use crate::types::{EnumeratorState, Point, Position, Rank};
use std::fmt;
use std::ops::Range;

pub use locking::DimensionLockingAbacus;
pub use radix::{Abacus, EmptyAbacus};
pub use shifting::LockShiftingAbacus;

/// Cursor over every point of a fixed dimension vector.
///
/// Implementors keep their own cursor state; use
/// [`fresh_clone`](IndexEnumerator::fresh_clone) to give another thread or
/// another pass an independent cursor instead of sharing one.
pub trait IndexEnumerator: Send + fmt::Debug {
    /// Size of each dimension, in the caller's original axis order
    fn dimensions(&self) -> &[usize];

    /// Number of dimensions
    fn rank(&self) -> Rank {
        self.dimensions().len()
    }

    /// Total number of points this enumerator visits
    fn state_count(&self) -> u64;

    /// Position of the next point to be produced
    fn position(&self) -> Position;

    /// Current lifecycle state of the cursor
    fn state(&self) -> EnumeratorState;

    /// True while at least one point remains. Does not change [`state`](Self::state).
    fn has_next(&self) -> bool {
        self.position() < self.state_count()
    }

    /// Produce the next point and advance the cursor.
    ///
    /// # Errors
    ///
    /// [`TensorError::Exhausted`](crate::TensorError::Exhausted) once every
    /// point has been produced. The cursor never wraps around.
    fn next_point(&mut self) -> TensorResult<Point>;

    /// Point visited at `position`, computed directly without stepping.
    fn point_at(&self, position: Position) -> TensorResult<Point>;

    /// Seek so the next call to `next_point` yields the point at `position`.
    ///
    /// Seeking to exactly `state_count()` leaves the enumerator exhausted.
    fn set_position(&mut self, position: Position) -> TensorResult<()>;

    /// Return to the initial point and the `Fresh` state.
    fn reset(&mut self);

    /// Independent enumerator over the same dimensions, reset to the start.
    fn fresh_clone(&self) -> Self
    where
        Self: Sized;

    /// Boxed form of [`fresh_clone`](IndexEnumerator::fresh_clone) for trait objects.
    fn fresh_boxed(&self) -> Box<dyn IndexEnumerator>;
}

/// Lifecycle state derived from a cursor position.
pub(crate) fn state_of(position: Position, state_count: u64, started: bool) -> EnumeratorState {
    if position >= state_count {
        EnumeratorState::Exhausted
    } else if started {
        EnumeratorState::Iterating
    } else {
        EnumeratorState::Fresh
    }
}

/// `size_hint` for the `Iterator` impls of the enumerators.
pub(crate) fn remaining_hint(position: Position, state_count: u64) -> (usize, Option<usize>) {
    let remaining = state_count.saturating_sub(position);
    match usize::try_from(remaining) {
        Ok(n) => (n, Some(n)),
        Err(_) => (usize::MAX, None),
    }
}

/// Split `[0, state_count)` into at most `parts` contiguous, non-empty ranges.
///
/// Range lengths differ by at most one. `parts == 0` is treated as one part.
///
/// # Examples
///
/// ```
/// use tensync_core::abacus::split_ranges;
///
/// let ranges = split_ranges(10, 3);
/// assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
/// assert!(split_ranges(0, 3).is_empty());
/// ```
pub fn split_ranges(state_count: u64, parts: usize) -> Vec<Range<Position>> {
    let parts = (parts.max(1) as u64).min(state_count);
    if parts == 0 {
        return Vec::new();
    }

    let base = state_count / parts;
    let extra = state_count % parts;
    let mut ranges = Vec::with_capacity(parts as usize);
    let mut start = 0;
    for i in 0..parts {
        let len = base + u64::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}
