//! # DenseND - Trait Implementations
//!
//! - `Index` / `IndexMut` by coordinate slice (panics on a bad index, like slices)
//! - `PartialEq` (same shape and same elements)
//! - `Debug`

use super::types::DenseND;
use ndarray::IxDyn;
use std::fmt;

impl<T> std::ops::Index<&[usize]> for DenseND<T> {
    type Output = T;
    fn index(&self, index: &[usize]) -> &Self::Output {
        &self.data[IxDyn(index)]
    }
}

impl<T> std::ops::IndexMut<&[usize]> for DenseND<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut Self::Output {
        &mut self.data[IxDyn(index)]
    }
}

impl<T: PartialEq> PartialEq for DenseND<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: fmt::Debug + Clone> fmt::Debug for DenseND<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseND")
            .field("shape", &self.shape())
            .field("rank", &self.rank())
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_and_index_mut() {
        let mut tensor = DenseND::<f64>::zeros(&[2, 3]).unwrap();
        tensor[&[1, 2][..]] = 42.0;
        assert_eq!(tensor[&[1, 2][..]], 42.0);
    }

    #[test]
    fn test_equality_depends_on_shape() {
        let a = DenseND::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let b = DenseND::from_vec(vec![1, 2, 3, 4], &[4]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
