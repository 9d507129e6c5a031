//! Plain mixed-radix odometer and the zero-state placeholder.

use super::{remaining_hint, state_of, IndexEnumerator};
use crate::error::{check_coords, BoundsError, ConstructionError, TensorError, TensorResult};
use crate::types::{checked_state_count, EnumeratorState, Point, Position};
use smallvec::smallvec;

/// Mixed-radix odometer over a fixed dimension vector.
///
/// The last dimension varies fastest. A digit that reaches its dimension size
/// rolls over to zero and carries into its left neighbour. Position `p` maps to
/// a point by division and modulo against the cumulative dimension products, so
/// seeking is O(rank) no matter how far the target is.
///
/// A rank-0 abacus (empty dimension vector) has exactly one state: the empty
/// point.
///
/// # Examples
///
/// ```
/// use tensync_core::{Abacus, IndexEnumerator};
///
/// let mut abacus = Abacus::new(&[2, 3]).unwrap();
/// assert_eq!(abacus.state_count(), 6);
///
/// let points: Vec<Vec<usize>> = abacus.by_ref().map(|p| p.to_vec()).collect();
/// assert_eq!(points[0], vec![0, 0]);
/// assert_eq!(points[3], vec![1, 0]);
/// assert!(abacus.next_point().is_err());
///
/// // Direct seek
/// assert_eq!(&abacus.point_at(5).unwrap()[..], &[1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abacus {
    dimensions: Vec<usize>,
    /// strides[i] = product of dimensions[i + 1..]
    strides: Vec<u64>,
    state_count: u64,
    position: Position,
    digits: Point,
    started: bool,
}

impl Abacus {
    /// Create an abacus over `dimensions`.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::ZeroDimension`] if any dimension is 0
    /// - [`ConstructionError::StateCountOverflow`] if the product of all
    ///   dimensions does not fit in a `u64`
    pub fn new(dimensions: &[usize]) -> TensorResult<Self> {
        if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
            return Err(ConstructionError::ZeroDimension { axis }.into());
        }
        if checked_state_count(dimensions).is_none() {
            return Err(ConstructionError::StateCountOverflow {
                dimensions: dimensions.to_vec(),
            }
            .into());
        }

        let abacus = Self::from_valid(dimensions.to_vec());
        tracing::debug!(
            rank = abacus.dimensions.len(),
            state_count = abacus.state_count,
            "abacus created"
        );
        Ok(abacus)
    }

    /// Build from dimensions already known to be non-zero with a product that fits.
    pub(crate) fn from_valid(dimensions: Vec<usize>) -> Self {
        let rank = dimensions.len();
        let mut strides = vec![1u64; rank];
        for i in (0..rank.saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * dimensions[i + 1] as u64;
        }
        let state_count = dimensions.iter().map(|&d| d as u64).product();

        Self {
            digits: smallvec![0; rank],
            dimensions,
            strides,
            state_count,
            position: 0,
            started: false,
        }
    }

    /// Cumulative products used for seeking; `strides()[i]` is the number of
    /// positions between two consecutive values of dimension `i`.
    pub fn strides(&self) -> &[u64] {
        &self.strides
    }

    /// Linear position of `point`, the inverse of [`point_at`](IndexEnumerator::point_at).
    ///
    /// # Examples
    ///
    /// ```
    /// use tensync_core::{Abacus, IndexEnumerator};
    ///
    /// let abacus = Abacus::new(&[2, 5, 2]).unwrap();
    /// let position = abacus.position_of(&[1, 3, 1]).unwrap();
    /// assert_eq!(position, 17);
    /// assert_eq!(&abacus.point_at(position).unwrap()[..], &[1, 3, 1]);
    /// ```
    pub fn position_of(&self, point: &[usize]) -> TensorResult<Position> {
        check_coords(point, &self.dimensions)?;
        Ok(point
            .iter()
            .zip(&self.strides)
            .map(|(&digit, &stride)| digit as u64 * stride)
            .sum())
    }

    fn decode(&self, position: Position) -> Point {
        self.dimensions
            .iter()
            .zip(&self.strides)
            .map(|(&size, &stride)| ((position / stride) % size as u64) as usize)
            .collect()
    }

    fn advance_digits(&mut self) {
        for axis in (0..self.digits.len()).rev() {
            self.digits[axis] += 1;
            if self.digits[axis] < self.dimensions[axis] {
                return;
            }
            self.digits[axis] = 0;
        }
    }

    fn position_error(&self, position: Position) -> TensorError {
        BoundsError::PositionOutOfRange {
            position,
            state_count: self.state_count,
        }
        .into()
    }
}

impl IndexEnumerator for Abacus {
    fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    fn state_count(&self) -> u64 {
        self.state_count
    }

    fn position(&self) -> Position {
        self.position
    }

    fn state(&self) -> EnumeratorState {
        state_of(self.position, self.state_count, self.started)
    }

    fn next_point(&mut self) -> TensorResult<Point> {
        if self.position >= self.state_count {
            return Err(TensorError::Exhausted {
                state_count: self.state_count,
            });
        }

        let point = self.digits.clone();
        self.started = true;
        self.position += 1;
        if self.position < self.state_count {
            self.advance_digits();
        }
        Ok(point)
    }

    fn point_at(&self, position: Position) -> TensorResult<Point> {
        if position >= self.state_count {
            return Err(self.position_error(position));
        }
        Ok(self.decode(position))
    }

    fn set_position(&mut self, position: Position) -> TensorResult<()> {
        if position > self.state_count {
            return Err(self.position_error(position));
        }

        tracing::trace!(position, "abacus seek");
        self.position = position;
        self.started = true;
        if position < self.state_count {
            self.digits = self.decode(position);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.position = 0;
        self.started = false;
        self.digits.iter_mut().for_each(|d| *d = 0);
    }

    fn fresh_clone(&self) -> Self {
        let mut clone = self.clone();
        clone.reset();
        clone
    }

    fn fresh_boxed(&self) -> Box<dyn IndexEnumerator> {
        Box::new(self.fresh_clone())
    }
}

impl Iterator for Abacus {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        self.next_point().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining_hint(self.position, self.state_count)
    }
}

/// Enumerator with no states at all.
///
/// `has_next` is always false and `state_count` is 0. Used where a composition
/// needs an enumerator slot that contributes nothing, e.g. the outer digits of a
/// [`LockShiftingAbacus`](super::LockShiftingAbacus) with no shift dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyAbacus;

impl EmptyAbacus {
    /// Create the placeholder
    pub fn new() -> Self {
        Self
    }
}

impl IndexEnumerator for EmptyAbacus {
    fn dimensions(&self) -> &[usize] {
        &[]
    }

    fn state_count(&self) -> u64 {
        0
    }

    fn position(&self) -> Position {
        0
    }

    fn state(&self) -> EnumeratorState {
        EnumeratorState::Exhausted
    }

    fn next_point(&mut self) -> TensorResult<Point> {
        Err(TensorError::Exhausted { state_count: 0 })
    }

    fn point_at(&self, position: Position) -> TensorResult<Point> {
        Err(BoundsError::PositionOutOfRange {
            position,
            state_count: 0,
        }
        .into())
    }

    fn set_position(&mut self, position: Position) -> TensorResult<()> {
        if position == 0 {
            Ok(())
        } else {
            Err(BoundsError::PositionOutOfRange {
                position,
                state_count: 0,
            }
            .into())
        }
    }

    fn reset(&mut self) {}

    fn fresh_clone(&self) -> Self {
        Self
    }

    fn fresh_boxed(&self) -> Box<dyn IndexEnumerator> {
        Box::new(Self)
    }
}

impl Iterator for EmptyAbacus {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(0))
    }
}
