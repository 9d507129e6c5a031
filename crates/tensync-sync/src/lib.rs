//! # tensync-sync
//!
//! Coordinate-locked concurrent access to dense tensors.
//!
//! A [`LockedTensor`] pairs a dense [`CellStore`] with a [`LockPolicy`]. Point
//! reads and writes lock only what the policy maps the coordinate to, so
//! writers to distinct cells proceed in parallel; bulk reads and writes take a
//! separate whole-structure lock and see a consistent view.
//!
//! The policy must return the same lock for the same coordinate on every call.
//! All policies here do, and `tests/concurrent_stress.rs` checks it under load.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use tensync_sync::{LockedTensor, StripedLockPolicy};
//!
//! let tensor = Arc::new(
//!     LockedTensor::<u64, _>::zeros(&[4, 4], Arc::new(StripedLockPolicy::default())).unwrap(),
//! );
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let tensor = Arc::clone(&tensor);
//!         thread::spawn(move || {
//!             for _ in 0..100 {
//!                 tensor.update(&[0, 0], |v| v + 1).unwrap();
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(tensor.get(&[0, 0]).unwrap(), 400);
//! ```

#![deny(warnings)]

pub mod locked;
pub mod policy;
pub mod store;

#[cfg(test)]
mod property_tests;

pub use locked::LockedTensor;
pub use policy::{
    DimensionLockPolicy, GlobalLockPolicy, LockIntent, LockPolicy, PerCellLockPolicy,
    SharedLock, StripedLockPolicy,
};
pub use store::{AtomicStore, CellBits, CellStore};
