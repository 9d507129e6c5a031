//! Dense tensor snapshot type
//!
//! `DenseND<T>` carries whole-tensor values in and out of bulk operations.

pub mod types;

pub mod densend_traits;

pub use types::DenseND;
