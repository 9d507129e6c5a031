//! Divide-and-conquer statistic aggregation
//!
//! [`aggregate`] halves the input range with `rayon::join` until each leaf
//! holds at most `split_threshold` values. Leaves fold sequentially and commit
//! to one shared [`Accumulator`] created for the call; the final statistic is
//! derived from a snapshot taken once every leaf has returned.
//!
//! # Example
//!
//! ```
//! use tensync_stats::{aggregate, StatValue, Statistic};
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! assert_eq!(aggregate(&values, Statistic::Sum, 1).unwrap(), StatValue::Float(10.0));
//! assert_eq!(aggregate(&values, Statistic::Average, 1).unwrap().as_f64(), 2.5);
//! assert_eq!(aggregate(&values, Statistic::Variance, 1).unwrap().as_f64(), 1.25);
//!
//! // Integral input keeps an exact integer sum
//! assert_eq!(aggregate(&[1u8, 2, 3], Statistic::Sum, 2).unwrap(), StatValue::Int(6));
//! ```

use crate::accumulator::{Accumulator, AccumulatorSnapshot, LeafSummary};
use crate::element::StatElement;
use crate::error::{StatsError, StatsResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Statistic computed by [`aggregate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Sum,
    Average,
    /// Population variance, `E[x²] − E[x]²`
    Variance,
    /// Population standard deviation
    StdDev,
    /// `sqrt(variance · n / (n − 1))`; needs at least two values
    SampleStdDev,
    Min,
    Max,
    Count,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Variance => "variance",
            Self::StdDev => "standard deviation",
            Self::SampleStdDev => "sample standard deviation",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
        };
        f.write_str(name)
    }
}

/// Aggregation result.
///
/// Sums, minima and maxima of integral input are exact `Int`s; everything
/// else is a `Float`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
}

impl StatValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// The exact integer, if this is an `Int`
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

/// Configuration for parallel aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Largest range folded directly without splitting (default: 4096)
    pub split_threshold: usize,

    /// Threads for a dedicated pool (None = use the global rayon pool)
    pub num_threads: Option<usize>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            split_threshold: 4096,
            num_threads: None,
        }
    }
}

impl AggregatorConfig {
    pub fn with_split_threshold(mut self, split_threshold: usize) -> Self {
        self.split_threshold = split_threshold;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Reject a zero threshold or a zero-thread pool.
    pub fn validate(&self) -> StatsResult<()> {
        if self.split_threshold == 0 {
            return Err(StatsError::invalid_config(
                "split_threshold must be at least 1",
            ));
        }
        if self.num_threads == Some(0) {
            return Err(StatsError::invalid_config("num_threads must be at least 1"));
        }
        Ok(())
    }
}

/// Compute `statistic` over `values` on the global rayon pool.
///
/// Ranges of at most `split_threshold` values are folded directly; anything
/// larger is split in half and both halves run in parallel.
///
/// # Errors
///
/// - [`StatsError::InvalidConfig`] if `split_threshold == 0`
/// - [`StatsError::Domain`] for an average, variance or standard deviation
///   of no values, a min or max of no values, or a sample standard deviation
///   of fewer than two values
/// - [`StatsError::Overflow`] if the total of an integral sum, or an integral
///   min or max, lies outside the `i64` range
pub fn aggregate<T: StatElement>(
    values: &[T],
    statistic: Statistic,
    split_threshold: usize,
) -> StatsResult<StatValue> {
    let config = AggregatorConfig::default().with_split_threshold(split_threshold);
    aggregate_with_config(values, statistic, &config)
}

/// [`aggregate`] driven by a full [`AggregatorConfig`].
pub fn aggregate_with_config<T: StatElement>(
    values: &[T],
    statistic: Statistic,
    config: &AggregatorConfig,
) -> StatsResult<StatValue> {
    let never = AtomicBool::new(false);
    aggregate_with_cancel(values, statistic, config, &never)
}

/// [`aggregate_with_config`] that stops early once `cancel` is set.
///
/// The flag is checked before each split and each leaf, never inside a leaf
/// or a commit, so a leaf that has started always finishes.
///
/// # Errors
///
/// [`StatsError::Cancelled`] if the flag was observed set, plus everything
/// [`aggregate`] can return.
pub fn aggregate_with_cancel<T: StatElement>(
    values: &[T],
    statistic: Statistic,
    config: &AggregatorConfig,
    cancel: &AtomicBool,
) -> StatsResult<StatValue> {
    config.validate()?;

    let accumulator = Accumulator::new();
    let run = || fold_range(values, config.split_threshold, &accumulator, cancel);
    let leaves = match config.num_threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| StatsError::ThreadPool(e.to_string()))?
            .install(run)?,
        None => run()?,
    };

    tracing::debug!(
        %statistic,
        len = values.len(),
        split_threshold = config.split_threshold,
        leaves,
        "aggregation complete"
    );
    finish::<T>(statistic, &accumulator.snapshot())
}

fn fold_range<T: StatElement>(
    values: &[T],
    split_threshold: usize,
    accumulator: &Accumulator,
    cancel: &AtomicBool,
) -> StatsResult<usize> {
    if cancel.load(Ordering::Relaxed) {
        return Err(StatsError::Cancelled);
    }

    if values.len() <= split_threshold {
        accumulator.merge(&LeafSummary::fold(values));
        return Ok(1);
    }

    let (left, right) = values.split_at(values.len() / 2);
    let (left, right) = rayon::join(
        || fold_range(left, split_threshold, accumulator, cancel),
        || fold_range(right, split_threshold, accumulator, cancel),
    );
    Ok(left? + right?)
}

fn finish<T: StatElement>(
    statistic: Statistic,
    acc: &AccumulatorSnapshot,
) -> StatsResult<StatValue> {
    let n = acc.count;
    let domain = |min_count: u64| {
        if n < min_count {
            Err(StatsError::Domain {
                statistic,
                count: n,
            })
        } else {
            Ok(())
        }
    };
    let exact = |value: i64| {
        if acc.out_of_range {
            Err(StatsError::Overflow)
        } else {
            Ok(StatValue::Int(value))
        }
    };

    match statistic {
        Statistic::Count => Ok(StatValue::Int(n as i64)),
        Statistic::Sum if T::INTEGRAL => acc.int_sum.map(StatValue::Int).ok_or(StatsError::Overflow),
        Statistic::Sum => Ok(StatValue::Float(acc.sum)),
        Statistic::Min => {
            domain(1)?;
            if T::INTEGRAL {
                exact(acc.int_min)
            } else {
                Ok(StatValue::Float(acc.min))
            }
        }
        Statistic::Max => {
            domain(1)?;
            if T::INTEGRAL {
                exact(acc.int_max)
            } else {
                Ok(StatValue::Float(acc.max))
            }
        }
        Statistic::Average => {
            domain(1)?;
            Ok(StatValue::Float(acc.sum / n as f64))
        }
        Statistic::Variance => {
            domain(1)?;
            Ok(StatValue::Float(population_variance(acc)))
        }
        Statistic::StdDev => {
            domain(1)?;
            Ok(StatValue::Float(population_variance(acc).sqrt()))
        }
        Statistic::SampleStdDev => {
            domain(2)?;
            let n = n as f64;
            Ok(StatValue::Float(
                (population_variance(acc) * n / (n - 1.0)).sqrt(),
            ))
        }
    }
}

// E[x²] − E[x]², clamped at zero against rounding
fn population_variance(acc: &AccumulatorSnapshot) -> f64 {
    let n = acc.count as f64;
    let mean = acc.sum / n;
    (acc.sum_sq / n - mean * mean).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

    #[test]
    fn test_sum_full_split() {
        assert_eq!(
            aggregate(&VALUES, Statistic::Sum, 1).unwrap(),
            StatValue::Float(10.0)
        );
    }

    #[test]
    fn test_average_and_variance() {
        assert_eq!(aggregate(&VALUES, Statistic::Average, 1).unwrap().as_f64(), 2.5);
        assert_eq!(aggregate(&VALUES, Statistic::Variance, 1).unwrap().as_f64(), 1.25);
        let std = aggregate(&VALUES, Statistic::StdDev, 1).unwrap().as_f64();
        assert!((std - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_stddev() {
        let sample = aggregate(&VALUES, Statistic::SampleStdDev, 2).unwrap().as_f64();
        assert!((sample - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_stddev_single_value_is_domain_error() {
        let err = aggregate(&[42.0], Statistic::SampleStdDev, 1).unwrap_err();
        assert_eq!(
            err,
            StatsError::Domain {
                statistic: Statistic::SampleStdDev,
                count: 1
            }
        );
    }

    #[test]
    fn test_empty_input() {
        let empty: [f32; 0] = [];
        assert_eq!(aggregate(&empty, Statistic::Sum, 8).unwrap(), StatValue::Float(0.0));
        assert_eq!(aggregate(&empty, Statistic::Count, 8).unwrap(), StatValue::Int(0));
        assert!(aggregate(&empty, Statistic::Average, 8).unwrap_err().is_domain());
        assert!(aggregate(&empty, Statistic::Max, 8).unwrap_err().is_domain());
    }

    #[test]
    fn test_integral_sum_is_exact() {
        let values: Vec<i64> = vec![1 << 53, 1, 1];
        assert_eq!(
            aggregate(&values, Statistic::Sum, 1).unwrap(),
            StatValue::Int((1 << 53) + 2)
        );
    }

    #[test]
    fn test_integral_overflow() {
        let values = [i64::MAX, 1];
        assert_eq!(
            aggregate(&values, Statistic::Sum, 1).unwrap_err(),
            StatsError::Overflow
        );
        // Other statistics of the same input are still available
        assert!(aggregate(&values, Statistic::Average, 1).is_ok());
        assert_eq!(aggregate(&values, Statistic::Max, 1).unwrap(), StatValue::Int(i64::MAX));
        assert_eq!(
            aggregate(&[u64::MAX, 1], Statistic::Min, 1).unwrap_err(),
            StatsError::Overflow
        );
    }

    #[test]
    fn test_integral_sum_ignores_partial_overflow() {
        let orders = [
            [i64::MAX, 1, -1],
            [i64::MAX, -1, 1],
            [1, i64::MAX, -1],
            [1, -1, i64::MAX],
            [-1, i64::MAX, 1],
            [-1, 1, i64::MAX],
        ];
        for values in orders {
            for threshold in [1, 8] {
                assert_eq!(
                    aggregate(&values, Statistic::Sum, threshold).unwrap(),
                    StatValue::Int(i64::MAX),
                    "{values:?} at threshold {threshold}"
                );
            }
        }
        assert_eq!(
            aggregate(&[i64::MIN, -1, 1], Statistic::Sum, 1).unwrap(),
            StatValue::Int(i64::MIN)
        );
        assert_eq!(
            aggregate(&[u64::MAX, 0], Statistic::Sum, 1).unwrap_err(),
            StatsError::Overflow
        );
    }

    #[test]
    fn test_min_max_count() {
        let values = [3i32, -7, 12, 0];
        assert_eq!(aggregate(&values, Statistic::Min, 1).unwrap(), StatValue::Int(-7));
        assert_eq!(aggregate(&values, Statistic::Max, 3).unwrap(), StatValue::Int(12));
        assert_eq!(aggregate(&values, Statistic::Count, 2).unwrap(), StatValue::Int(4));
        let floats = [2.5f32, -1.5];
        assert_eq!(aggregate(&floats, Statistic::Min, 1).unwrap(), StatValue::Float(-1.5));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = aggregate(&VALUES, Statistic::Sum, 0).unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfig(_)));
    }

    #[test]
    fn test_threshold_does_not_change_result() {
        let values: Vec<u32> = (1..=1000).collect();
        for threshold in [1, 7, 64, 1000, 5000] {
            assert_eq!(
                aggregate(&values, Statistic::Sum, threshold).unwrap(),
                StatValue::Int(500_500)
            );
        }
    }

    #[test]
    fn test_dedicated_pool() {
        let config = AggregatorConfig::default()
            .with_split_threshold(16)
            .with_num_threads(2);
        let values: Vec<f64> = (0..1000).map(f64::from).collect();
        let avg = aggregate_with_config(&values, Statistic::Average, &config).unwrap();
        assert_eq!(avg.as_f64(), 499.5);

        let bad = AggregatorConfig::default().with_num_threads(0);
        assert!(aggregate_with_config(&values, Statistic::Sum, &bad).is_err());
    }

    #[test]
    fn test_cancel_before_start() {
        let cancel = AtomicBool::new(true);
        let err = aggregate_with_cancel(
            &VALUES,
            Statistic::Sum,
            &AggregatorConfig::default(),
            &cancel,
        )
        .unwrap_err();
        assert_eq!(err, StatsError::Cancelled);
    }

    #[test]
    fn test_stat_value_accessors() {
        assert_eq!(StatValue::Int(3).as_f64(), 3.0);
        assert_eq!(StatValue::Int(3).as_i64(), Some(3));
        assert_eq!(StatValue::Float(3.0).as_i64(), None);
    }
}
