//! Error types for statistic aggregation

use crate::aggregate::Statistic;
use thiserror::Error;

/// Errors raised by [`aggregate`](crate::aggregate) and its variants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Unusable [`AggregatorConfig`](crate::AggregatorConfig)
    #[error("Invalid aggregator configuration: {0}")]
    InvalidConfig(String),

    /// Statistic undefined for this many values, e.g. a sample standard
    /// deviation of one value
    #[error("{statistic} is undefined for {count} value(s)")]
    Domain { statistic: Statistic, count: u64 },

    /// An integral value or running sum left the `i64` range
    #[error("Integer accumulator overflowed i64")]
    Overflow,

    /// The cancellation flag was raised before every leaf finished
    #[error("Aggregation cancelled")]
    Cancelled,

    /// The dedicated thread pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl StatsError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for [`StatsError::Domain`]
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }
}

/// Result type alias for aggregation
pub type StatsResult<T> = Result<T, StatsError>;
