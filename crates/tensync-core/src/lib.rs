//! # tensync-core
//!
//! Index enumerators, error taxonomy and dense snapshots for tensync.
//!
//! This crate provides the building blocks every tensync tensor is addressed
//! through:
//!
//! - **Mixed-radix enumeration** ([`Abacus`]) with O(rank) random seek
//! - **Dimension locking** ([`DimensionLockingAbacus`]) to freeze axes at fixed values
//! - **Precedence reordering** ([`LockShiftingAbacus`]) to move axes to the
//!   slowest-varying position
//! - **Dense snapshots** ([`DenseND`]) exchanged by bulk reads and writes
//! - **Errors** ([`TensorError`]) split into construction, bounds and exhaustion
//!
//! ## Quick Start
//!
//! ```
//! use tensync_core::{Abacus, IndexEnumerator, LockShiftingAbacus};
//!
//! let mut abacus = Abacus::new(&[2, 3, 4]).unwrap();
//! assert_eq!(abacus.state_count(), 24);
//! assert_eq!(&abacus.next_point().unwrap()[..], &[0, 0, 0]);
//! assert_eq!(&abacus.next_point().unwrap()[..], &[0, 0, 1]);
//!
//! // Seek straight to any position
//! abacus.set_position(23).unwrap();
//! assert_eq!(&abacus.next_point().unwrap()[..], &[1, 2, 3]);
//!
//! // Walk axis 0 last
//! let shifted = LockShiftingAbacus::new(&[2, 3, 4], &[0]).unwrap();
//! assert_eq!(&shifted.point_at(12).unwrap()[..], &[1, 0, 0]);
//! ```
//!
//! ## Points
//!
//! Every enumerator returns an owned [`Point`] per step. Points are never
//! aliased with the enumerator's internal digits, so callers may keep them.
//!
//! ## Parallel Traversal
//!
//! Enumerators are cursors. To walk one dimension vector from several threads,
//! give each thread a [`fresh_clone`](IndexEnumerator::fresh_clone) and seek it
//! to the start of its slice from [`abacus::split_ranges`].
//!
//! ## Error Handling
//!
//! Construction errors surface from constructors, bounds errors surface before
//! any data is touched, and stepping past the end is reported as
//! [`TensorError::Exhausted`]:
//!
//! ```
//! use tensync_core::{Abacus, IndexEnumerator};
//!
//! assert!(Abacus::new(&[3, 0]).unwrap_err().is_construction());
//!
//! let mut abacus = Abacus::new(&[1]).unwrap();
//! abacus.next_point().unwrap();
//! assert!(abacus.next_point().unwrap_err().is_exhausted());
//! ```
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization of [`DenseND`]

#![deny(warnings)]

pub mod abacus;
pub mod dense;
pub mod error;
pub mod types;


pub use abacus::{
    split_ranges, Abacus, DimensionLockingAbacus, EmptyAbacus, IndexEnumerator,
    LockShiftingAbacus,
};
pub use dense::DenseND;
pub use error::{check_coords, BoundsError, ConstructionError, TensorError, TensorResult};
pub use types::{Axis, EnumeratorState, Point, Position, Rank};
