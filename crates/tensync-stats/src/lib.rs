//! # tensync-stats
//!
//! Parallel statistic aggregation with lock-free accumulators.
//!
//! [`aggregate`] splits its input with `rayon::join` until each leaf holds at
//! most `split_threshold` values, folds every leaf sequentially and commits
//! the partial results through compare-and-swap loops on a fresh
//! [`Accumulator`](accumulator::Accumulator). No mutex is taken anywhere.
//!
//! ## Numeric policy
//!
//! - Every element is accumulated as `f64`, whatever its width.
//! - Integral elements also keep an exact `i64` sum, reported as
//!   [`StatValue::Int`]; leaving the `i64` range is [`StatsError::Overflow`].
//! - Undefined statistics (an average of nothing, a sample standard deviation
//!   of one value) are [`StatsError::Domain`], never `NaN`.
//!
//! ## Example
//!
//! ```
//! use tensync_stats::{aggregate_with_config, AggregatorConfig, Statistic};
//!
//! let values: Vec<f32> = (0..10_000).map(|i| (i % 10) as f32).collect();
//! let config = AggregatorConfig::default().with_split_threshold(512);
//!
//! let mean = aggregate_with_config(&values, Statistic::Average, &config).unwrap();
//! assert_eq!(mean.as_f64(), 4.5);
//! ```

#![deny(warnings)]

pub mod accumulator;
pub mod aggregate;
pub mod element;
pub mod error;


pub use aggregate::{
    aggregate, aggregate_with_cancel, aggregate_with_config, AggregatorConfig, StatValue,
    Statistic,
};
pub use element::StatElement;
pub use error::{StatsError, StatsResult};
