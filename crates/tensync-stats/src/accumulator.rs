//! Lock-free accumulators shared by aggregation leaves
//!
//! Each leaf folds its sub-range into a private [`LeafSummary`] and then
//! commits it to the shared [`Accumulator`] with compare-and-swap loops. The
//! loops retry until they succeed; contention only costs spins, never a lost
//! or stale contribution.
//!
//! Exact integral sums are kept as `i128` and committed as a wrapping low word
//! plus a carry word, so the committed total does not depend on the order in
//! which leaves arrive. The `i64` range is checked once, on the final total.

use crate::element::StatElement;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// `f64` stored as its bit pattern in an `AtomicU64`.
///
/// # Examples
///
/// ```
/// use tensync_stats::accumulator::AtomicF64;
///
/// let total = AtomicF64::new(1.5);
/// total.fetch_add(2.0);
/// assert_eq!(total.load(), 3.5);
/// ```
#[derive(Debug)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Apply `f` atomically and return the previous value.
    ///
    /// Retries until the swap succeeds. Skips the write when `f` leaves the bit
    /// pattern unchanged.
    pub fn fetch_update_with<F>(&self, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = f(f64::from_bits(current)).to_bits();
            if next == current {
                return f64::from_bits(current);
            }
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return f64::from_bits(previous),
                Err(actual) => current = actual,
            }
        }
    }

    pub fn fetch_add(&self, delta: f64) -> f64 {
        self.fetch_update_with(|current| current + delta)
    }

    pub fn fetch_min(&self, value: f64) -> f64 {
        self.fetch_update_with(|current| current.min(value))
    }

    pub fn fetch_max(&self, value: f64) -> f64 {
        self.fetch_update_with(|current| current.max(value))
    }
}

/// Partial statistics of one leaf range, folded without any sharing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafSummary {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
    pub min: f64,
    pub max: f64,
    /// Exact sum for integral elements
    pub int_sum: i128,
    pub int_min: i64,
    pub int_max: i64,
    /// Some integral value had no `i64` form
    pub out_of_range: bool,
}

impl LeafSummary {
    /// Fold `values` sequentially.
    pub fn fold<T: StatElement>(values: &[T]) -> Self {
        let mut leaf = Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            int_sum: 0,
            int_min: i64::MAX,
            int_max: i64::MIN,
            out_of_range: false,
        };

        for &value in values {
            let x = value.to_f64().unwrap_or(f64::NAN);
            leaf.count += 1;
            leaf.sum += x;
            leaf.sum_sq += x * x;
            leaf.min = leaf.min.min(x);
            leaf.max = leaf.max.max(x);

            if T::INTEGRAL {
                // Every primitive integer fits in i128
                leaf.int_sum += value.to_i128().unwrap_or(0);
                match value.to_i64() {
                    Some(exact) => {
                        leaf.int_min = leaf.int_min.min(exact);
                        leaf.int_max = leaf.int_max.max(exact);
                    }
                    None => leaf.out_of_range = true,
                }
            }
        }
        leaf
    }
}

/// Shared accumulator for one aggregation call.
///
/// Created fresh per call and discarded afterwards, so no state leaks between
/// calls.
#[derive(Debug)]
pub struct Accumulator {
    count: AtomicU64,
    sum: AtomicF64,
    sum_sq: AtomicF64,
    min: AtomicF64,
    max: AtomicF64,
    /// Low 64 bits of the exact integral sum, wrapping
    int_sum_lo: AtomicU64,
    /// High 64 bits, including carries out of `int_sum_lo`
    int_sum_hi: AtomicI64,
    int_min: AtomicI64,
    int_max: AtomicI64,
    out_of_range: AtomicBool,
}

/// Plain copy of an [`Accumulator`] read after every leaf committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorSnapshot {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
    pub min: f64,
    pub max: f64,
    /// `None` if the total integral sum is outside the `i64` range
    pub int_sum: Option<i64>,
    pub int_min: i64,
    pub int_max: i64,
    /// Some integral value had no `i64` form, so `int_min`/`int_max` are partial
    pub out_of_range: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
            sum_sq: AtomicF64::new(0.0),
            min: AtomicF64::new(f64::INFINITY),
            max: AtomicF64::new(f64::NEG_INFINITY),
            int_sum_lo: AtomicU64::new(0),
            int_sum_hi: AtomicI64::new(0),
            int_min: AtomicI64::new(i64::MAX),
            int_max: AtomicI64::new(i64::MIN),
            out_of_range: AtomicBool::new(false),
        }
    }

    /// Commit one leaf.
    pub fn merge(&self, leaf: &LeafSummary) {
        if leaf.count == 0 {
            return;
        }

        self.count.fetch_add(leaf.count, Ordering::AcqRel);
        self.sum.fetch_add(leaf.sum);
        self.sum_sq.fetch_add(leaf.sum_sq);
        self.min.fetch_min(leaf.min);
        self.max.fetch_max(leaf.max);

        self.int_min.fetch_min(leaf.int_min, Ordering::AcqRel);
        self.int_max.fetch_max(leaf.int_max, Ordering::AcqRel);
        self.add_int_sum(leaf.int_sum);
        if leaf.out_of_range {
            self.out_of_range.store(true, Ordering::Release);
        }
    }

    /// Add `partial` to the two-word sum. Both words wrap, so commits commute.
    fn add_int_sum(&self, partial: i128) {
        let lo = partial as u64;
        let hi = (partial >> 64) as i64;
        let previous = self.int_sum_lo.fetch_add(lo, Ordering::AcqRel);
        let carry = i64::from(previous.overflowing_add(lo).1);
        self.int_sum_hi.fetch_add(hi.wrapping_add(carry), Ordering::AcqRel);
    }

    /// Exact integral sum of every committed leaf
    pub fn int_sum(&self) -> i128 {
        let hi = self.int_sum_hi.load(Ordering::Acquire);
        let lo = self.int_sum_lo.load(Ordering::Acquire);
        (i128::from(hi) << 64) | i128::from(lo)
    }

    pub fn snapshot(&self) -> AccumulatorSnapshot {
        let int_sum = i64::try_from(self.int_sum()).ok();
        AccumulatorSnapshot {
            count: self.count.load(Ordering::Acquire),
            sum: self.sum.load(),
            sum_sq: self.sum_sq.load(),
            min: self.min.load(),
            max: self.max.load(),
            int_sum,
            int_min: self.int_min.load(Ordering::Acquire),
            int_max: self.int_max.load(Ordering::Acquire),
            out_of_range: self.out_of_range.load(Ordering::Acquire),
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}
