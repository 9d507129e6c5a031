//! Property-based tests for locked tensors and policies

#[cfg(test)]
mod tests {
    use crate::{
        CellBits, LockIntent, LockPolicy, LockedTensor, PerCellLockPolicy, StripedLockPolicy,
    };
    use proptest::prelude::*;
    use std::sync::Arc;
    use tensync_core::DenseND;

    fn shape_and_values() -> impl Strategy<Value = (Vec<usize>, Vec<i64>)> {
        prop::collection::vec(1usize..5, 1..=3).prop_flat_map(|shape| {
            let len = shape.iter().product::<usize>();
            (Just(shape), prop::collection::vec(any::<i64>(), len))
        })
    }

    proptest! {
        #[test]
        fn prop_bulk_get_after_bulk_set_is_identity((shape, values) in shape_and_values()) {
            let tensor = LockedTensor::<i64, _>::zeros(&shape, Arc::new(StripedLockPolicy::default())).unwrap();
            let dense = DenseND::from_vec(values, &shape).unwrap();
            tensor.bulk_set(&dense).unwrap();
            prop_assert_eq!(tensor.bulk_get().unwrap(), dense);
        }

        #[test]
        fn prop_cell_writes_visible_in_snapshot((shape, values) in shape_and_values()) {
            let tensor = LockedTensor::<i64, _>::zeros(&shape, Arc::new(PerCellLockPolicy::new())).unwrap();
            let expected = DenseND::from_vec(values, &shape).unwrap();
            let points: Vec<Vec<usize>> = tensync_core::Abacus::new(&shape).unwrap().map(|p| p.to_vec()).collect();
            for point in &points {
                tensor.set(point, expected[&point[..]]).unwrap();
            }
            prop_assert_eq!(tensor.bulk_get().unwrap(), expected);
        }

        #[test]
        fn prop_striped_lock_identity_is_stable(
            stripes in 1usize..128,
            coords in prop::collection::vec(0usize..1000, 0..6),
        ) {
            let policy = StripedLockPolicy::new(stripes).unwrap();
            let a = policy.lock_for(&coords, LockIntent::Write);
            let b = policy.lock_for(&coords.clone(), LockIntent::Read);
            prop_assert!(Arc::ptr_eq(&a, &b));
        }

        #[test]
        fn prop_f64_bits_roundtrip(value in any::<f64>()) {
            prop_assert_eq!(f64::from_cell_bits(value.to_cell_bits()).to_bits(), value.to_bits());
        }

        #[test]
        fn prop_i16_bits_roundtrip(value in any::<i16>()) {
            prop_assert_eq!(i16::from_cell_bits(value.to_cell_bits()), value);
        }
    }
}
