//! Enumerator with frozen dimensions.

use super::radix::Abacus;
use super::{remaining_hint, IndexEnumerator};
use crate::error::{BoundsError, ConstructionError, TensorResult};
use crate::types::{Axis, EnumeratorState, Point, Position};

/// Abacus that pins a subset of dimensions at fixed values.
///
/// Free dimensions enumerate exactly as a plain [`Abacus`] over their own sizes;
/// locked dimensions always report their pinned value. Positions count free
/// states only, so `state_count()` is the product of the free dimensions.
///
/// Any change to the lock set resets the cursor. Re-locking an already locked
/// dimension to a new value only swaps the value and rewinds, without
/// rebuilding the free-dimension odometer.
///
/// # Examples
///
/// ```
/// use tensync_core::{DimensionLockingAbacus, IndexEnumerator};
///
/// let mut abacus = DimensionLockingAbacus::new(&[2, 3, 2]).unwrap();
/// abacus.lock(1, 2).unwrap();
/// assert_eq!(abacus.state_count(), 4);
///
/// let points: Vec<Vec<usize>> = abacus.map(|p| p.to_vec()).collect();
/// assert_eq!(points, vec![vec![0, 2, 0], vec![0, 2, 1], vec![1, 2, 0], vec![1, 2, 1]]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionLockingAbacus {
    dimensions: Vec<usize>,
    locks: Vec<Option<usize>>,
    free_axes: Vec<Axis>,
    free: Abacus,
}

impl DimensionLockingAbacus {
    /// Create an enumerator over `dimensions` with nothing locked.
    pub fn new(dimensions: &[usize]) -> TensorResult<Self> {
        // Validates the full vector; every free subset is then valid too
        let free = Abacus::new(dimensions)?;
        Ok(Self {
            dimensions: dimensions.to_vec(),
            locks: vec![None; dimensions.len()],
            free_axes: (0..dimensions.len()).collect(),
            free,
        })
    }

    /// Create an enumerator with the given `(axis, value)` pairs locked.
    pub fn with_locks(dimensions: &[usize], locks: &[(Axis, usize)]) -> TensorResult<Self> {
        let mut abacus = Self::new(dimensions)?;
        for &(axis, value) in locks {
            abacus.lock(axis, value)?;
        }
        Ok(abacus)
    }

    /// Pin `axis` at `value` and rewind the cursor.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::AxisOutOfRange`] if `axis >= rank`
    /// - [`BoundsError::LockedValueOutOfRange`] if `value` does not fit the dimension
    pub fn lock(&mut self, axis: Axis, value: usize) -> TensorResult<()> {
        self.check_axis(axis)?;
        let size = self.dimensions[axis];
        if value >= size {
            return Err(BoundsError::LockedValueOutOfRange { axis, value, size }.into());
        }

        let was_locked = self.locks[axis].replace(value).is_some();
        if was_locked {
            self.free.reset();
        } else {
            self.rebuild();
        }
        Ok(())
    }

    /// Release `axis` so it runs freely again from coordinate 0.
    ///
    /// Unlocking a dimension that is not locked is a no-op.
    pub fn unlock(&mut self, axis: Axis) -> TensorResult<()> {
        self.check_axis(axis)?;
        if self.locks[axis].take().is_some() {
            self.rebuild();
        }
        Ok(())
    }

    /// Release every locked dimension.
    pub fn unlock_all(&mut self) {
        self.locks.iter_mut().for_each(|lock| *lock = None);
        self.rebuild();
    }

    /// Whether `axis` is currently pinned
    pub fn is_locked(&self, axis: Axis) -> bool {
        self.locked_value(axis).is_some()
    }

    /// Value `axis` is pinned at, if any
    pub fn locked_value(&self, axis: Axis) -> Option<usize> {
        self.locks.get(axis).copied().flatten()
    }

    /// Axes that currently enumerate freely, in ascending order
    pub fn free_axes(&self) -> &[Axis] {
        &self.free_axes
    }

    /// Sizes of the free dimensions, in ascending axis order
    pub fn free_dimensions(&self) -> &[usize] {
        self.free.dimensions()
    }

    /// Swap the value of an axis already known to be locked and in range.
    pub(crate) fn set_locked_value(&mut self, axis: Axis, value: usize) {
        self.locks[axis] = Some(value);
        self.free.reset();
    }

    fn check_axis(&self, axis: Axis) -> TensorResult<()> {
        if axis >= self.dimensions.len() {
            return Err(ConstructionError::AxisOutOfRange {
                axis,
                rank: self.dimensions.len(),
            }
            .into());
        }
        Ok(())
    }

    fn rebuild(&mut self) {
        self.free_axes = (0..self.dimensions.len())
            .filter(|&axis| self.locks[axis].is_none())
            .collect();
        let free_dims = self.free_axes.iter().map(|&a| self.dimensions[a]).collect();
        self.free = Abacus::from_valid(free_dims);
    }

    /// Merge a free-dimension point with the locked values.
    fn compose(&self, free_point: &[usize]) -> Point {
        let mut free_digits = free_point.iter();
        self.locks
            .iter()
            .map(|lock| match lock {
                Some(value) => *value,
                None => free_digits.next().copied().unwrap_or(0),
            })
            .collect()
    }
}

impl IndexEnumerator for DimensionLockingAbacus {
    fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    fn state_count(&self) -> u64 {
        self.free.state_count()
    }

    fn position(&self) -> Position {
        self.free.position()
    }

    fn state(&self) -> EnumeratorState {
        self.free.state()
    }

    fn next_point(&mut self) -> TensorResult<Point> {
        let free_point = self.free.next_point()?;
        Ok(self.compose(&free_point))
    }

    fn point_at(&self, position: Position) -> TensorResult<Point> {
        let free_point = self.free.point_at(position)?;
        Ok(self.compose(&free_point))
    }

    fn set_position(&mut self, position: Position) -> TensorResult<()> {
        self.free.set_position(position)
    }

    fn reset(&mut self) {
        self.free.reset();
    }

    fn fresh_clone(&self) -> Self {
        Self {
            dimensions: self.dimensions.clone(),
            locks: self.locks.clone(),
            free_axes: self.free_axes.clone(),
            free: self.free.fresh_clone(),
        }
    }

    fn fresh_boxed(&self) -> Box<dyn IndexEnumerator> {
        Box::new(self.fresh_clone())
    }
}

impl Iterator for DimensionLockingAbacus {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        self.next_point().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining_hint(self.position(), self.state_count())
    }
}
