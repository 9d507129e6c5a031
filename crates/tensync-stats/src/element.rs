//! Element types accepted by the aggregator

use num_traits::ToPrimitive;

/// Numeric element that can be aggregated.
///
/// Every element contributes to the floating-point accumulators through
/// [`to_f64`](ToPrimitive::to_f64). Integral elements (`INTEGRAL == true`) also
/// feed an exact `i64` sum through [`to_i64`](ToPrimitive::to_i64), which
/// returns `None` for values outside the `i64` range.
pub trait StatElement: ToPrimitive + Copy + Send + Sync + 'static {
    const INTEGRAL: bool;
}

macro_rules! impl_stat_element {
    ($integral:expr => $($t:ty),*) => {
        $(
            impl StatElement for $t {
                const INTEGRAL: bool = $integral;
            }
        )*
    };
}

impl_stat_element!(true => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_stat_element!(false => f32, f64);
