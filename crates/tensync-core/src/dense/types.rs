//! Dense tensor type definition and basic operations
//!
//! `DenseND<T>` is the owned, row-major snapshot type exchanged by bulk reads
//! and writes. Cell-level concurrent access goes through `tensync-sync`; this
//! type has no locking of its own.

use crate::abacus::Abacus;
use crate::error::{ConstructionError, TensorError, TensorResult};
use ndarray::{Array, ArrayView, IxDyn};
use num_traits::{One, Zero};

/// Dense N-dimensional tensor backed by an ndarray `ArrayD`.
///
/// # Memory Layout
///
/// Always C-contiguous (row-major), matching the visitation order of an
/// [`Abacus`] over the same shape: element `i` of [`as_slice`](Self::as_slice)
/// is the element at `abacus.point_at(i)`.
///
/// # Examples
///
/// ```
/// use tensync_core::DenseND;
///
/// let tensor = DenseND::<f64>::zeros(&[2, 3, 4]).unwrap();
/// assert_eq!(tensor.shape(), &[2, 3, 4]);
/// assert_eq!(tensor.rank(), 3);
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(serialize = "T: serde::Serialize")))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "T: serde::Deserialize<'de>"))
)]
pub struct DenseND<T> {
    pub(crate) data: Array<T, IxDyn>,
}

impl<T: Clone> DenseND<T> {
    /// Create a tensor from a vector with given shape
    ///
    /// # Arguments
    ///
    /// * `vec` - Flattened data in row-major order
    /// * `shape` - Target shape; every dimension must be at least 1
    ///
    /// # Examples
    ///
    /// ```
    /// use tensync_core::DenseND;
    ///
    /// let tensor = DenseND::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    /// assert_eq!(tensor[&[1, 0][..]], 4);
    ///
    /// assert!(DenseND::from_vec(vec![1, 2, 3], &[2, 2]).is_err());
    /// ```
    pub fn from_vec(vec: Vec<T>, shape: &[usize]) -> TensorResult<Self> {
        validate_shape(shape)?;
        let total: usize = shape.iter().product();
        if vec.len() != total {
            return Err(TensorError::shape_mismatch(&[total], &[vec.len()]));
        }
        let data = Array::from_shape_vec(IxDyn(shape), vec)
            .map_err(|_| TensorError::shape_mismatch(shape, &[total]))?;
        Ok(Self { data })
    }

    /// Create a tensor filled with a specific value
    pub fn from_elem(shape: &[usize], value: T) -> TensorResult<Self> {
        validate_shape(shape)?;
        Ok(Self {
            data: Array::from_elem(IxDyn(shape), value),
        })
    }

    /// Build a tensor by evaluating `f` at every coordinate, in abacus order
    ///
    /// # Examples
    ///
    /// ```
    /// use tensync_core::DenseND;
    ///
    /// let tensor = DenseND::from_fn(&[2, 3], |idx| idx[0] * 10 + idx[1]).unwrap();
    /// assert_eq!(tensor.to_vec(), vec![0, 1, 2, 10, 11, 12]);
    /// ```
    pub fn from_fn<F>(shape: &[usize], mut f: F) -> TensorResult<Self>
    where
        F: FnMut(&[usize]) -> T,
    {
        let abacus = Abacus::new(shape)?;
        let values: Vec<T> = abacus.map(|point| f(&point[..])).collect();
        Self::from_vec(values, shape)
    }

    /// Rank (number of dimensions)
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Shape of the tensor
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: every dimension is at least 1
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if two tensors have the same shape
    pub fn same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// Get an element by index without panicking
    ///
    /// Returns `None` when the index has the wrong rank or lies outside the shape.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.rank() {
            return None;
        }
        self.data.get(IxDyn(index))
    }

    /// Mutable counterpart of [`get`](Self::get)
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        if index.len() != self.rank() {
            return None;
        }
        self.data.get_mut(IxDyn(index))
    }

    /// Elements in row-major order.
    ///
    /// Every constructor produces standard layout, so this never fails; an
    /// empty slice is returned only if that invariant were broken.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice().unwrap_or(&[])
    }

    /// Elements in row-major order as an owned vector
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().cloned().collect()
    }

    /// Consume the tensor and return its elements in row-major order
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_iter().collect()
    }

    /// Iterator over all elements in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Mutable iterator over all elements in row-major order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }

    /// Immutable ndarray view
    pub fn view(&self) -> ArrayView<'_, T, IxDyn> {
        self.data.view()
    }

    /// Reference to the underlying ndarray
    pub fn as_array(&self) -> &Array<T, IxDyn> {
        &self.data
    }
}

impl<T: Clone + Zero> DenseND<T> {
    /// Create a tensor of zeros
    pub fn zeros(shape: &[usize]) -> TensorResult<Self> {
        validate_shape(shape)?;
        Ok(Self {
            data: Array::zeros(IxDyn(shape)),
        })
    }
}

impl<T: Clone + One> DenseND<T> {
    /// Create a tensor of ones
    pub fn ones(shape: &[usize]) -> TensorResult<Self> {
        validate_shape(shape)?;
        Ok(Self {
            data: Array::ones(IxDyn(shape)),
        })
    }
}

fn validate_shape(shape: &[usize]) -> TensorResult<()> {
    match shape.iter().position(|&d| d == 0) {
        Some(axis) => Err(ConstructionError::ZeroDimension { axis }.into()),
        None => Ok(()),
    }
}
