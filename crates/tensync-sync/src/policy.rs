//! Locking policies
//!
//! A [`LockPolicy`] maps a coordinate tuple and an access intent to a lock.
//! Every policy must hand back the *same* lock object for the same coordinate
//! on every call; two logically equal but distinct locks would not exclude each
//! other and concurrent writes to one cell could interleave.
//!
//! Bulk intent always maps to the policy's whole-structure lock, whatever the
//! coordinates.
//!
//! | Policy | Cell granularity | Bulk vs cells |
//! |--------|------------------|---------------|
//! | [`GlobalLockPolicy`] | one lock for everything | same lock |
//! | [`StripedLockPolicy`] | fixed pool, hashed | cells hold whole lock shared |
//! | [`PerCellLockPolicy`] | one lock per coordinate | cells hold whole lock shared |
//! | [`DimensionLockPolicy`] | one lock per slice along an axis | cells hold whole lock shared |

use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tensync_core::{ConstructionError, Point, TensorResult};

/// Shared handle to a policy lock
pub type SharedLock = Arc<RwLock<()>>;

/// What the caller is about to do with the lock it asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockIntent {
    /// Single-cell read; acquired in shared mode
    Read,
    /// Single-cell write or read-modify-write; acquired exclusively
    Write,
    /// Whole-structure operation
    Bulk,
}

/// Strategy for handing out locks by coordinate.
///
/// Implementations are shared read-only by every tensor that references them,
/// so all methods take `&self`.
pub trait LockPolicy: Send + Sync + fmt::Debug {
    /// Lock guarding `coords` for `intent`.
    ///
    /// Must return the same lock (by identity) for equal coordinates and the
    /// same intent class. `coords` is already validated when called from a
    /// [`LockedTensor`](crate::LockedTensor).
    fn lock_for(&self, coords: &[usize], intent: LockIntent) -> SharedLock;

    /// Whether cell operations must also hold the whole-structure lock in
    /// shared mode, so bulk operations exclude them.
    ///
    /// Must be `false` when the cell locks and the whole-structure lock can be
    /// the same object.
    fn cells_exclude_bulk(&self) -> bool {
        true
    }

    /// Short name for diagnostics
    fn name(&self) -> &'static str;
}

fn new_lock() -> SharedLock {
    Arc::new(RwLock::new(()))
}

/// One lock for every cell and every bulk operation.
///
/// Fully serializes writers; useful as a baseline and for tiny tensors.
#[derive(Debug, Default)]
pub struct GlobalLockPolicy {
    lock: SharedLock,
}

impl GlobalLockPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockPolicy for GlobalLockPolicy {
    fn lock_for(&self, _coords: &[usize], _intent: LockIntent) -> SharedLock {
        Arc::clone(&self.lock)
    }

    fn cells_exclude_bulk(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "global"
    }
}

/// Fixed pool of locks selected by a deterministic hash of the coordinates.
///
/// Memory stays constant regardless of tensor size. Distinct coordinates may
/// share a stripe, which only costs concurrency, never correctness.
#[derive(Debug)]
pub struct StripedLockPolicy {
    stripes: Vec<SharedLock>,
    whole: SharedLock,
}

impl StripedLockPolicy {
    /// Stripe count used by `Default`
    pub const DEFAULT_STRIPES: usize = 64;

    /// Create a policy with `stripes` cell locks.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::InvalidStripeCount`] if `stripes == 0`.
    pub fn new(stripes: usize) -> TensorResult<Self> {
        if stripes == 0 {
            return Err(ConstructionError::InvalidStripeCount.into());
        }
        tracing::debug!(stripes, "striped lock policy created");
        Ok(Self {
            stripes: (0..stripes).map(|_| new_lock()).collect(),
            whole: new_lock(),
        })
    }

    /// Number of cell locks
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Stripe index for `coords`
    pub fn stripe_of(&self, coords: &[usize]) -> usize {
        (fnv1a(coords) % self.stripes.len() as u64) as usize
    }
}

impl Default for StripedLockPolicy {
    fn default() -> Self {
        Self {
            stripes: (0..Self::DEFAULT_STRIPES).map(|_| new_lock()).collect(),
            whole: new_lock(),
        }
    }
}

impl LockPolicy for StripedLockPolicy {
    fn lock_for(&self, coords: &[usize], intent: LockIntent) -> SharedLock {
        match intent {
            LockIntent::Bulk => Arc::clone(&self.whole),
            LockIntent::Read | LockIntent::Write => {
                Arc::clone(&self.stripes[self.stripe_of(coords)])
            }
        }
    }

    fn name(&self) -> &'static str {
        "striped"
    }
}

// FNV-1a over the coordinate words; stable across runs and platforms
fn fnv1a(coords: &[usize]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    coords.iter().fold(OFFSET, |hash, &c| {
        let hash = (hash ^ c as u64).wrapping_mul(PRIME);
        (hash ^ (c as u64 >> 32)).wrapping_mul(PRIME)
    })
}

/// One lock per coordinate, created on first use.
///
/// Locks live in a `DashMap` keyed by coordinate and are never replaced or
/// evicted, so identity is stable for the lifetime of the policy. Memory grows
/// with the number of distinct coordinates touched.
#[derive(Debug, Default)]
pub struct PerCellLockPolicy {
    cells: DashMap<Point, SharedLock>,
    whole: SharedLock,
}

impl PerCellLockPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cell locks created so far
    pub fn lock_count(&self) -> usize {
        self.cells.len()
    }
}

impl LockPolicy for PerCellLockPolicy {
    fn lock_for(&self, coords: &[usize], intent: LockIntent) -> SharedLock {
        if intent == LockIntent::Bulk {
            return Arc::clone(&self.whole);
        }
        if let Some(lock) = self.cells.get(coords) {
            return Arc::clone(lock.value());
        }
        // entry() holds the shard lock, so racing callers agree on one lock
        let entry = self
            .cells
            .entry(Point::from_slice(coords))
            .or_insert_with(new_lock);
        Arc::clone(entry.value())
    }

    fn name(&self) -> &'static str {
        "per-cell"
    }
}

/// One lock per index along a chosen axis.
///
/// Every cell in the same slice (same coordinate on `axis`) shares a lock.
/// Suits workloads where each worker owns a slice.
#[derive(Debug)]
pub struct DimensionLockPolicy {
    axis: usize,
    slices: Vec<SharedLock>,
    whole: SharedLock,
}

impl DimensionLockPolicy {
    /// Create a policy partitioning `shape` along `axis`.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::AxisOutOfRange`] if `axis >= shape.len()`
    /// - [`ConstructionError::ZeroDimension`] if that dimension is 0
    pub fn new(shape: &[usize], axis: usize) -> TensorResult<Self> {
        let size = *shape.get(axis).ok_or(ConstructionError::AxisOutOfRange {
            axis,
            rank: shape.len(),
        })?;
        if size == 0 {
            return Err(ConstructionError::ZeroDimension { axis }.into());
        }
        tracing::debug!(axis, slices = size, "dimension lock policy created");
        Ok(Self {
            axis,
            slices: (0..size).map(|_| new_lock()).collect(),
            whole: new_lock(),
        })
    }

    /// Axis the locks are partitioned along
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Number of slice locks
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }
}

impl LockPolicy for DimensionLockPolicy {
    fn lock_for(&self, coords: &[usize], intent: LockIntent) -> SharedLock {
        match intent {
            LockIntent::Bulk => Arc::clone(&self.whole),
            LockIntent::Read | LockIntent::Write => {
                let slice = coords.get(self.axis).copied().unwrap_or(0) % self.slices.len();
                Arc::clone(&self.slices[slice])
            }
        }
    }

    fn name(&self) -> &'static str {
        "dimension"
    }
}
