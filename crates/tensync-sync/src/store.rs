//! Dense backing stores for locked tensors
//!
//! A [`CellStore`] is a flat, row-major array of cells addressed by linear
//! offset. [`AtomicStore`] keeps each cell in an `AtomicU64` holding the
//! element's bit pattern (see [`CellBits`]), so a single-cell load or store can
//! never tear, even before any lock is considered.

use num_traits::Zero;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use tensync_core::{ConstructionError, DenseND, TensorError, TensorResult};

/// Element types that fit losslessly in 64 bits.
///
/// `from_cell_bits(to_cell_bits(x)) == x` for every value (bit-for-bit for
/// floats, so NaN payloads and signed zeros survive).
pub trait CellBits: Copy + Send + Sync + 'static {
    fn to_cell_bits(self) -> u64;
    fn from_cell_bits(bits: u64) -> Self;
}

macro_rules! impl_cell_bits_int {
    ($($t:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl CellBits for $t {
                #[inline]
                fn to_cell_bits(self) -> u64 {
                    self as $unsigned as u64
                }

                #[inline]
                fn from_cell_bits(bits: u64) -> Self {
                    bits as $unsigned as $t
                }
            }
        )*
    };
}

impl_cell_bits_int!(
    u8 => u8,
    i8 => u8,
    u16 => u16,
    i16 => u16,
    u32 => u32,
    i32 => u32,
    u64 => u64,
    i64 => u64,
);

impl CellBits for f32 {
    #[inline]
    fn to_cell_bits(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline]
    fn from_cell_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl CellBits for f64 {
    #[inline]
    fn to_cell_bits(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_cell_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

impl CellBits for bool {
    #[inline]
    fn to_cell_bits(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn from_cell_bits(bits: u64) -> Self {
        bits != 0
    }
}

impl CellBits for char {
    #[inline]
    fn to_cell_bits(self) -> u64 {
        u64::from(u32::from(self))
    }

    #[inline]
    fn from_cell_bits(bits: u64) -> Self {
        // Only ever fed bits produced by to_cell_bits
        char::from_u32(bits as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// Flat row-major cell storage shared by reference across threads.
///
/// Offsets are always validated by the caller; implementations may panic on an
/// offset `>= len()`.
pub trait CellStore<T>: Send + Sync {
    /// Shape the offsets are laid out for
    fn shape(&self) -> &[usize];

    /// Number of cells
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self, offset: usize) -> T;

    fn store(&self, offset: usize, value: T);
}

/// Store with one `AtomicU64` per cell.
pub struct AtomicStore<T: CellBits> {
    shape: Vec<usize>,
    cells: Box<[AtomicU64]>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: CellBits> AtomicStore<T> {
    /// Create a store of `shape` with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::ZeroDimension`] if any dimension is 0.
    pub fn filled(shape: &[usize], value: T) -> TensorResult<Self> {
        if let Some(axis) = shape.iter().position(|&d| d == 0) {
            return Err(ConstructionError::ZeroDimension { axis }.into());
        }
        let len = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).ok_or_else(
            || {
                TensorError::from(ConstructionError::StateCountOverflow {
                    dimensions: shape.to_vec(),
                })
            },
        )?;

        let bits = value.to_cell_bits();
        let cells = (0..len).map(|_| AtomicU64::new(bits)).collect();
        tracing::debug!(shape = ?shape, len, "atomic store allocated");
        Ok(Self {
            shape: shape.to_vec(),
            cells,
            _marker: PhantomData,
        })
    }

    /// Copy a dense snapshot into a new store.
    pub fn from_dense(dense: &DenseND<T>) -> Self {
        let cells = dense
            .iter()
            .map(|&value| AtomicU64::new(value.to_cell_bits()))
            .collect();
        Self {
            shape: dense.shape().to_vec(),
            cells,
            _marker: PhantomData,
        }
    }
}

impl<T: CellBits + Zero> AtomicStore<T> {
    /// Create a store of `shape` filled with zeros
    pub fn zeros(shape: &[usize]) -> TensorResult<Self> {
        Self::filled(shape, T::zero())
    }
}

impl<T: CellBits> CellStore<T> for AtomicStore<T> {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn load(&self, offset: usize) -> T {
        T::from_cell_bits(self.cells[offset].load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, offset: usize, value: T) {
        self.cells[offset].store(value.to_cell_bits(), Ordering::Release);
    }
}

impl<T: CellBits + fmt::Debug> fmt::Debug for AtomicStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicStore")
            .field("shape", &self.shape)
            .field("len", &self.cells.len())
            .finish()
    }
}
