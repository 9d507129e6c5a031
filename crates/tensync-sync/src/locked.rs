//! Coordinate-locked tensor wrapper

use crate::policy::{LockIntent, LockPolicy, StripedLockPolicy};
use crate::store::{AtomicStore, CellBits, CellStore};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tensync_core::{Abacus, DenseND, IndexEnumerator, TensorError, TensorResult};

/// Dense tensor whose cells are guarded by a [`LockPolicy`].
///
/// Single-cell operations take the policy's lock for that coordinate (shared
/// for [`get`](Self::get), exclusive for [`set`](Self::set) and
/// [`update`](Self::update)). Bulk operations take the whole-structure lock
/// exclusively, so they never overlap each other; whether they also exclude
/// cell operations is decided by [`LockPolicy::cells_exclude_bulk`].
///
/// Coordinates are validated before any lock is taken, so a bad request never
/// blocks. Guards are scoped and released on every exit path, including
/// unwinding out of an [`update`](Self::update) closure.
///
/// The wrapper owns its store; the policy is shared through an `Arc` and may
/// back several tensors at once.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tensync_sync::{LockedTensor, PerCellLockPolicy};
///
/// let tensor = LockedTensor::<i64, _>::zeros(&[2, 3], Arc::new(PerCellLockPolicy::new())).unwrap();
/// tensor.set(&[1, 2], 5).unwrap();
/// tensor.update(&[1, 2], |v| v + 1).unwrap();
/// assert_eq!(tensor.get(&[1, 2]).unwrap(), 6);
///
/// assert!(tensor.get(&[2, 0]).unwrap_err().is_bounds());
/// ```
pub struct LockedTensor<T, P = StripedLockPolicy, S = AtomicStore<T>>
where
    T: CellBits,
    P: LockPolicy + ?Sized,
    S: CellStore<T>,
{
    store: S,
    policy: Arc<P>,
    layout: Abacus,
    _marker: PhantomData<fn() -> T>,
}

impl<T, P, S> LockedTensor<T, P, S>
where
    T: CellBits,
    P: LockPolicy + ?Sized,
    S: CellStore<T>,
{
    /// Wrap `store`, taking ownership of it.
    ///
    /// # Errors
    ///
    /// Construction errors for an invalid store shape.
    pub fn new(store: S, policy: Arc<P>) -> TensorResult<Self> {
        let layout = Abacus::new(store.shape())?;
        tracing::debug!(
            shape = ?store.shape(),
            policy = policy.name(),
            "locked tensor created"
        );
        Ok(Self {
            store,
            policy,
            layout,
            _marker: PhantomData,
        })
    }

    pub fn shape(&self) -> &[usize] {
        self.store.shape()
    }

    pub fn rank(&self) -> usize {
        self.store.shape().len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Always false: every dimension is at least 1
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Policy shared by this tensor
    pub fn policy(&self) -> &Arc<P> {
        &self.policy
    }

    /// Read one cell under its read lock.
    pub fn get(&self, coords: &[usize]) -> TensorResult<T> {
        self.with_cell(coords, LockIntent::Read, |store, offset| store.load(offset))
    }

    /// Write one cell under its write lock.
    pub fn set(&self, coords: &[usize], value: T) -> TensorResult<()> {
        self.with_cell(coords, LockIntent::Write, |store, offset| {
            store.store(offset, value)
        })
    }

    /// Read-modify-write one cell under its write lock and return the new value.
    ///
    /// Concurrent updates of the same coordinate are serialized, so none is lost.
    pub fn update<F>(&self, coords: &[usize], f: F) -> TensorResult<T>
    where
        F: FnOnce(T) -> T,
    {
        self.with_cell(coords, LockIntent::Write, |store, offset| {
            let value = f(store.load(offset));
            store.store(offset, value);
            value
        })
    }

    /// Consistent snapshot of every cell, taken under the whole-structure lock.
    pub fn bulk_get(&self) -> TensorResult<DenseND<T>> {
        let whole = self.policy.lock_for(&[], LockIntent::Bulk);
        let values: Vec<T> = {
            let _guard = whole.write();
            (0..self.store.len()).map(|offset| self.store.load(offset)).collect()
        };
        tracing::trace!(len = values.len(), "bulk get");
        DenseND::from_vec(values, self.shape())
    }

    /// Overwrite every cell from `values` under the whole-structure lock.
    ///
    /// # Errors
    ///
    /// A shape mismatch is reported before the lock is taken and leaves the
    /// tensor untouched.
    pub fn bulk_set(&self, values: &DenseND<T>) -> TensorResult<()> {
        if values.shape() != self.shape() {
            return Err(TensorError::shape_mismatch(self.shape(), values.shape()));
        }

        let whole = self.policy.lock_for(&[], LockIntent::Bulk);
        let _guard = whole.write();
        for (offset, &value) in values.iter().enumerate() {
            self.store.store(offset, value);
        }
        tracing::trace!(len = values.len(), "bulk set");
        Ok(())
    }

    /// Drive `enumerator` to exhaustion, reading each visited cell under its
    /// read lock and handing it to `f`. Returns the number of cells visited.
    ///
    /// # Errors
    ///
    /// Shape mismatch if the enumerator's dimensions differ from the tensor's.
    pub fn for_each_cell<E, F>(&self, enumerator: &mut E, mut f: F) -> TensorResult<u64>
    where
        E: IndexEnumerator + ?Sized,
        F: FnMut(&[usize], T),
    {
        if enumerator.dimensions() != self.shape() {
            return Err(TensorError::shape_mismatch(
                self.shape(),
                enumerator.dimensions(),
            ));
        }

        let mut visited = 0;
        while enumerator.has_next() {
            let point = enumerator.next_point()?;
            let value = self.get(&point)?;
            f(&point, value);
            visited += 1;
        }
        Ok(visited)
    }

    fn with_cell<R, F>(&self, coords: &[usize], intent: LockIntent, op: F) -> TensorResult<R>
    where
        F: FnOnce(&S, usize) -> R,
    {
        // Validation happens before any lock is touched
        let offset = self.layout.position_of(coords)? as usize;

        let whole = self
            .policy
            .cells_exclude_bulk()
            .then(|| self.policy.lock_for(coords, LockIntent::Bulk));
        let _whole_guard = whole.as_ref().map(|lock| lock.read());

        let cell = self.policy.lock_for(coords, intent);
        let result = match intent {
            LockIntent::Read => {
                let _guard = cell.read();
                op(&self.store, offset)
            }
            LockIntent::Write | LockIntent::Bulk => {
                let _guard = cell.write();
                op(&self.store, offset)
            }
        };
        Ok(result)
    }
}

impl<T, P> LockedTensor<T, P, AtomicStore<T>>
where
    T: CellBits,
    P: LockPolicy + ?Sized,
{
    /// Tensor of `shape` with every cell set to `value`
    pub fn filled(shape: &[usize], value: T, policy: Arc<P>) -> TensorResult<Self> {
        Self::new(AtomicStore::filled(shape, value)?, policy)
    }

    /// Tensor holding a copy of `dense`
    pub fn from_dense(dense: &DenseND<T>, policy: Arc<P>) -> TensorResult<Self> {
        Self::new(AtomicStore::from_dense(dense), policy)
    }
}

impl<T, P> LockedTensor<T, P, AtomicStore<T>>
where
    T: CellBits + num_traits::Zero,
    P: LockPolicy + ?Sized,
{
    /// Tensor of `shape` filled with zeros
    pub fn zeros(shape: &[usize], policy: Arc<P>) -> TensorResult<Self> {
        Self::new(AtomicStore::zeros(shape)?, policy)
    }
}

impl<T, P, S> fmt::Debug for LockedTensor<T, P, S>
where
    T: CellBits,
    P: LockPolicy + ?Sized,
    S: CellStore<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedTensor")
            .field("shape", &self.shape())
            .field("policy", &self.policy)
            .finish()
    }
}
