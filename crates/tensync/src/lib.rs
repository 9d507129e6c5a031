//! # tensync - Indexed, Locked and Aggregated Dense Tensors
//!
//! This is the **meta crate** that re-exports every tensync component.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tensync::prelude::*;
//!
//! // Walk a 2x3 tensor with axis 1 as the slowest axis
//! let order: Vec<Vec<usize>> = LockShiftingAbacus::new(&[2, 3], &[1])?
//!     .map(|p| p.to_vec())
//!     .collect();
//! assert_eq!(order[..3], [vec![0, 0], vec![1, 0], vec![0, 1]]);
//!
//! // Share a tensor between threads with per-cell locks
//! let tensor = LockedTensor::<f64, _>::zeros(&[2, 3], Arc::new(PerCellLockPolicy::new()))?;
//! tensor.set(&[1, 2], 4.0)?;
//!
//! // Aggregate its contents in parallel
//! let snapshot = tensor.bulk_get()?;
//! let total = aggregate(snapshot.as_slice(), Statistic::Sum, 2)?;
//! assert_eq!(total.as_f64(), 4.0);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Enumeration ([`core`])
//!
//! Mixed-radix odometers with O(rank) seek, dimension locking and precedence
//! reordering, plus the [`DenseND`](core::DenseND) snapshot type.
//!
//! ### Cell Access ([`sync`])
//!
//! [`LockedTensor`](sync::LockedTensor) with pluggable locking policies:
//! global, striped, per-cell and per-slice.
//!
//! ### Aggregation ([`stats`])
//!
//! Divide-and-conquer sum, average, variance, standard deviation, min, max
//! and count over lock-free CAS accumulators.
//!
//! ### Logging ([`tracing_support`])
//!
//! Subscriber setup for the `tracing` events the components emit.
//!
//! ## Features
//!
//! - `tracing` (default): `tracing-subscriber` based [`tracing_support::init_tracing`]
//! - `serde`: serialization of dense snapshots

#![deny(warnings)]

pub use tensync_core as core;
pub use tensync_stats as stats;
pub use tensync_sync as sync;

pub mod tracing_support;

/// Common imports
pub mod prelude {
    pub use tensync_core::{
        Abacus, DenseND, DimensionLockingAbacus, EmptyAbacus, EnumeratorState, IndexEnumerator,
        LockShiftingAbacus, Point, TensorError, TensorResult,
    };
    pub use tensync_stats::{
        aggregate, aggregate_with_config, AggregatorConfig, StatValue, Statistic, StatsError,
    };
    pub use tensync_sync::{
        DimensionLockPolicy, GlobalLockPolicy, LockIntent, LockPolicy, LockedTensor,
        PerCellLockPolicy, StripedLockPolicy,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_enumerate_lock_and_aggregate() {
        let policy = Arc::new(DimensionLockPolicy::new(&[3, 4], 0).unwrap());
        let tensor = LockedTensor::<i32, _>::zeros(&[3, 4], policy).unwrap();

        let mut abacus = Abacus::new(&[3, 4]).unwrap();
        while let Ok(point) = abacus.next_point() {
            tensor
                .set(&point, (point[0] * 4 + point[1]) as i32)
                .unwrap();
        }

        let mut row = DimensionLockingAbacus::with_locks(&[3, 4], &[(0, 1)]).unwrap();
        let mut row_values = Vec::new();
        tensor
            .for_each_cell(&mut row, |_, v| row_values.push(v))
            .unwrap();
        assert_eq!(
            aggregate(&row_values, Statistic::Sum, 1).unwrap(),
            StatValue::Int(4 + 5 + 6 + 7)
        );

        let all = tensor.bulk_get().unwrap();
        assert_eq!(
            aggregate(all.as_slice(), Statistic::Max, 3).unwrap(),
            StatValue::Int(11)
        );
    }

    #[test]
    fn test_errors_convert_to_anyhow() {
        fn run() -> anyhow::Result<()> {
            let tensor = LockedTensor::<u8, _>::zeros(&[2], Arc::new(GlobalLockPolicy::new()))?;
            tensor.get(&[3])?;
            Ok(())
        }
        let err = run().unwrap_err();
        assert!(err.downcast_ref::<TensorError>().is_some());
    }
}
