//! Precedence-reordering enumerator.

use super::locking::DimensionLockingAbacus;
use super::radix::{Abacus, EmptyAbacus};
use super::{remaining_hint, state_of, IndexEnumerator};
use crate::error::{BoundsError, ConstructionError, TensorError, TensorResult};
use crate::types::{Axis, EnumeratorState, Point, Position};

/// Enumerator that advances a chosen set of "shift" dimensions slowest.
///
/// Non-shift dimensions complete a full cycle, in their original relative order,
/// before any shift dimension moves. Among the shift dimensions the one listed
/// first advances slowest. The visit order is the same as a plain [`Abacus`] over
/// the *flattened* dimension vector `[shift dims in the given order..., non-shift
/// dims in original order...]`, with each point mapped back to the original axis
/// order.
///
/// Internally two enumerators are composed: an inner
/// [`DimensionLockingAbacus`] over the full rank with the shift dimensions
/// locked, and an outer [`Abacus`] over the shift-dimension sizes. When the
/// inner one runs out, the outer one steps and its digits become the new lock
/// values. With no shift dimensions the outer slot holds an [`EmptyAbacus`].
///
/// # Examples
///
/// ```
/// use tensync_core::{IndexEnumerator, LockShiftingAbacus};
///
/// // The size-5 axis moves only after axes 0 and 2 finish a full cycle
/// let abacus = LockShiftingAbacus::new(&[2, 5, 2], &[1]).unwrap();
/// let first: Vec<Vec<usize>> = abacus.take(5).map(|p| p.to_vec()).collect();
/// assert_eq!(
///     first,
///     vec![vec![0, 0, 0], vec![0, 0, 1], vec![1, 0, 0], vec![1, 0, 1], vec![0, 1, 0]]
/// );
/// ```
#[derive(Debug)]
pub struct LockShiftingAbacus {
    dimensions: Vec<usize>,
    shift_axes: Vec<Axis>,
    inner: DimensionLockingAbacus,
    outer: Box<dyn IndexEnumerator>,
    /// Abacus over the flattened dimension vector, used for seeking
    flat: Abacus,
    /// permutation[k] = original axis of flattened digit k
    permutation: Vec<Axis>,
    position: Position,
    started: bool,
}

impl LockShiftingAbacus {
    /// Create an enumerator over `dimensions` with `shift_axes` moved to the
    /// outermost precedence, first listed slowest.
    ///
    /// # Errors
    ///
    /// - any error of [`Abacus::new`] for `dimensions`
    /// - [`ConstructionError::ShiftDimensionOutOfRange`] for an axis `>= rank`
    /// - [`ConstructionError::DuplicateShiftDimension`] for a repeated axis
    pub fn new(dimensions: &[usize], shift_axes: &[Axis]) -> TensorResult<Self> {
        let rank = dimensions.len();
        let mut seen = vec![false; rank];
        for &axis in shift_axes {
            if axis >= rank {
                return Err(ConstructionError::ShiftDimensionOutOfRange { axis, rank }.into());
            }
            if seen[axis] {
                return Err(ConstructionError::DuplicateShiftDimension { axis }.into());
            }
            seen[axis] = true;
        }

        let mut inner = DimensionLockingAbacus::new(dimensions)?;
        for &axis in shift_axes {
            inner.lock(axis, 0)?;
        }

        let outer: Box<dyn IndexEnumerator> = if shift_axes.is_empty() {
            Box::new(EmptyAbacus::new())
        } else {
            let sizes: Vec<usize> = shift_axes.iter().map(|&a| dimensions[a]).collect();
            Box::new(Abacus::new(&sizes)?)
        };

        let permutation: Vec<Axis> = shift_axes
            .iter()
            .copied()
            .chain((0..rank).filter(|&axis| !seen[axis]))
            .collect();
        let flat_dims: Vec<usize> = permutation.iter().map(|&a| dimensions[a]).collect();
        let flat = Abacus::new(&flat_dims)?;

        tracing::debug!(
            rank,
            shift_axes = ?shift_axes,
            state_count = flat.state_count(),
            "lock-shifting abacus created"
        );

        let mut abacus = Self {
            dimensions: dimensions.to_vec(),
            shift_axes: shift_axes.to_vec(),
            inner,
            outer,
            flat,
            permutation,
            position: 0,
            started: false,
        };
        abacus.advance_outer();
        Ok(abacus)
    }

    /// Shift axes in the order they were given
    pub fn shift_axes(&self) -> &[Axis] {
        &self.shift_axes
    }

    /// The equivalent flattened dimension vector (shift dims first)
    pub fn flattened_dimensions(&self) -> &[usize] {
        self.flat.dimensions()
    }

    /// Original axis of each flattened digit
    pub fn permutation(&self) -> &[Axis] {
        &self.permutation
    }

    /// Step the outer digits and push them into the inner locks.
    ///
    /// Returns false when the outer enumerator has nothing left, which is
    /// always the case for the empty placeholder.
    fn advance_outer(&mut self) -> bool {
        match self.outer.next_point() {
            Ok(digits) => {
                for (&axis, &value) in self.shift_axes.iter().zip(digits.iter()) {
                    self.inner.set_locked_value(axis, value);
                }
                true
            }
            Err(_) => false,
        }
    }

    fn unflatten(&self, flat_point: &[usize]) -> Point {
        let mut point: Point = smallvec::smallvec![0; self.dimensions.len()];
        for (&axis, &value) in self.permutation.iter().zip(flat_point) {
            point[axis] = value;
        }
        point
    }
}

impl IndexEnumerator for LockShiftingAbacus {
    fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    fn state_count(&self) -> u64 {
        self.flat.state_count()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn state(&self) -> EnumeratorState {
        state_of(self.position, self.state_count(), self.started)
    }

    fn next_point(&mut self) -> TensorResult<Point> {
        if self.position >= self.state_count() || (!self.inner.has_next() && !self.advance_outer())
        {
            return Err(TensorError::Exhausted {
                state_count: self.state_count(),
            });
        }

        let point = self.inner.next_point()?;
        self.position += 1;
        self.started = true;
        Ok(point)
    }

    fn point_at(&self, position: Position) -> TensorResult<Point> {
        let flat_point = self.flat.point_at(position)?;
        Ok(self.unflatten(&flat_point))
    }

    fn set_position(&mut self, position: Position) -> TensorResult<()> {
        let state_count = self.state_count();
        if position > state_count {
            return Err(BoundsError::PositionOutOfRange {
                position,
                state_count,
            }
            .into());
        }

        tracing::trace!(position, "lock-shifting abacus seek");
        let inner_count = self.inner.state_count();
        if position == state_count {
            self.outer.set_position(self.outer.state_count())?;
            self.inner.set_position(inner_count)?;
        } else {
            self.outer.set_position(position / inner_count)?;
            self.advance_outer();
            self.inner.set_position(position % inner_count)?;
        }
        self.position = position;
        self.started = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.outer.reset();
        self.advance_outer();
        self.inner.reset();
        self.position = 0;
        self.started = false;
    }

    fn fresh_clone(&self) -> Self {
        let mut clone = Self {
            dimensions: self.dimensions.clone(),
            shift_axes: self.shift_axes.clone(),
            inner: self.inner.fresh_clone(),
            outer: self.outer.fresh_boxed(),
            flat: self.flat.fresh_clone(),
            permutation: self.permutation.clone(),
            position: 0,
            started: false,
        };
        clone.advance_outer();
        clone
    }

    fn fresh_boxed(&self) -> Box<dyn IndexEnumerator> {
        Box::new(self.fresh_clone())
    }
}

impl Iterator for LockShiftingAbacus {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        self.next_point().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining_hint(self.position, self.state_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn points(abacus: LockShiftingAbacus) -> Vec<Vec<usize>> {
        abacus.map(|p| p.to_vec()).collect()
    }

    #[test]
    fn test_shift_moves_axis_outermost() {
        let all = points(LockShiftingAbacus::new(&[2, 5, 2], &[1]).unwrap());
        assert_eq!(all.len(), 20);
        assert_eq!(
            &all[..4],
            &[vec![0, 0, 0], vec![0, 0, 1], vec![1, 0, 0], vec![1, 0, 1]]
        );
        assert_eq!(all[4], vec![0, 1, 0]);
        assert_eq!(all[19], vec![1, 4, 1]);
    }

    #[test]
    fn test_first_listed_shift_axis_is_slowest() {
        let all = points(LockShiftingAbacus::new(&[2, 3, 2], &[2, 0]).unwrap());
        // Axis 2 slowest, axis 0 next, axis 1 fastest
        assert_eq!(all[0], vec![0, 0, 0]);
        assert_eq!(all[1], vec![0, 1, 0]);
        assert_eq!(all[3], vec![1, 0, 0]);
        assert_eq!(all[6], vec![0, 0, 1]);
    }

    #[test]
    fn test_no_shift_axes_is_plain_order() {
        let shifted = points(LockShiftingAbacus::new(&[3, 2], &[]).unwrap());
        let plain: Vec<Vec<usize>> = Abacus::new(&[3, 2]).unwrap().map(|p| p.to_vec()).collect();
        assert_eq!(shifted, plain);
    }

    #[test]
    fn test_all_axes_shifted() {
        let abacus = LockShiftingAbacus::new(&[2, 3], &[1, 0]).unwrap();
        assert_eq!(abacus.flattened_dimensions(), &[3, 2]);
        let all = points(abacus);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![0, 0]);
        assert_eq!(all[1], vec![1, 0]);
        assert_eq!(all[2], vec![0, 1]);
    }

    #[test]
    fn test_visits_same_set_as_plain_abacus() {
        let dims = [3, 2, 4];
        let shifted: HashSet<Vec<usize>> =
            points(LockShiftingAbacus::new(&dims, &[2, 1]).unwrap()).into_iter().collect();
        let plain: HashSet<Vec<usize>> = Abacus::new(&dims).unwrap().map(|p| p.to_vec()).collect();
        assert_eq!(shifted.len(), 24);
        assert_eq!(shifted, plain);
    }

    #[test]
    fn test_point_at_matches_stepping() {
        let mut stepping = LockShiftingAbacus::new(&[2, 5, 2], &[1]).unwrap();
        let seeker = LockShiftingAbacus::new(&[2, 5, 2], &[1]).unwrap();
        for position in 0..seeker.state_count() {
            assert_eq!(stepping.next_point().unwrap(), seeker.point_at(position).unwrap());
        }
        assert!(stepping.next_point().unwrap_err().is_exhausted());
    }

    #[test]
    fn test_set_position_resumes_mid_sequence() {
        let reference = points(LockShiftingAbacus::new(&[3, 4, 2], &[0, 2]).unwrap());
        let mut abacus = LockShiftingAbacus::new(&[3, 4, 2], &[0, 2]).unwrap();

        for start in [0u64, 1, 5, 11, 23] {
            abacus.set_position(start).unwrap();
            let rest: Vec<Vec<usize>> = abacus.by_ref().map(|p| p.to_vec()).collect();
            assert_eq!(rest, reference[start as usize..].to_vec());
        }

        abacus.set_position(24).unwrap();
        assert!(!abacus.has_next());
        assert!(abacus.set_position(25).is_err());
    }

    #[test]
    fn test_duplicate_shift_axis_rejected() {
        let err = LockShiftingAbacus::new(&[2, 3, 4], &[1, 1]).unwrap_err();
        assert_eq!(
            err,
            TensorError::Construction(ConstructionError::DuplicateShiftDimension { axis: 1 })
        );
    }

    #[test]
    fn test_out_of_range_shift_axis_rejected() {
        let err = LockShiftingAbacus::new(&[2, 3], &[2]).unwrap_err();
        assert_eq!(
            err,
            TensorError::Construction(ConstructionError::ShiftDimensionOutOfRange {
                axis: 2,
                rank: 2
            })
        );
    }

    #[test]
    fn test_reset_and_fresh_clone() {
        let mut abacus = LockShiftingAbacus::new(&[2, 3], &[1]).unwrap();
        for _ in 0..4 {
            abacus.next_point().unwrap();
        }

        let mut clone = abacus.fresh_clone();
        assert_eq!(clone.state(), EnumeratorState::Fresh);
        assert_eq!(&clone.next_point().unwrap()[..], &[0, 0]);

        abacus.reset();
        assert_eq!(abacus.state(), EnumeratorState::Fresh);
        let all = points(abacus);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![0, 0]);
        assert_eq!(all[1], vec![1, 0]);
        assert_eq!(all[2], vec![0, 1]);
    }

    #[test]
    fn test_rank_zero() {
        let mut abacus = LockShiftingAbacus::new(&[], &[]).unwrap();
        assert_eq!(abacus.state_count(), 1);
        assert!(abacus.next_point().unwrap().is_empty());
        assert!(abacus.next_point().is_err());
    }
}
