//! `mathlib-array` - N-dimensional array backend for the mathlib dispatch layer.
//!
//! This crate provides:
//! - An `NdArray` type backed by contiguous, row-major storage
//! - numpy-style dtypes with `result_type` promotion and `same_kind` casting
//! - Shape utilities and N-ary broadcasting
//! - A `ComputeBackend` trait and the reference `CpuBackend` elementwise kernels
//! - A configurable policy for floating point conditions

pub mod array;
pub mod backend;
pub mod dtype;
pub mod error;
pub mod kernels;
pub mod policy;
pub mod shape;
pub mod storage;

// Re-export primary types at the crate root for convenience.
pub use array::NdArray;
pub use backend::ComputeBackend;
pub use dtype::{DType, DTypeKind};
pub use error::{ArrayError, FloatCondition, Result};
pub use kernels::float::frexp;
pub use kernels::{BinaryLoop, BinaryOp, CpuBackend, UnaryLoop, UnaryOp};
pub use policy::{ErrorAction, NumericErrorPolicy};
pub use shape::Shape;
pub use storage::{Element, Storage};
