//! `mathlib` - Common-interface math dispatch for numeric arrays and custom
//! array-like types.
//!
//! This crate provides:
//! - A fixed registry of named operations (`Op`) with calling conventions and flags
//! - The `MathLibrary` capability trait implemented once per operand family
//! - Provider resolution (`library_for`) with a fast path for plain arrays
//! - Free dispatch functions (`sin`, `add`, `add_into`, ...) and operator overloads on `Value`
//! - The `TidyLibrary` adapter so custom libraries only implement equal-shaped, ≥1-d kernels
//! - `NativeLibrary`, the default library over the `mathlib-array` CPU kernels

pub mod broadcast;
pub mod dispatch;
pub mod error;
pub mod library;
pub mod native;
pub mod ops;
pub mod registry;
pub mod resolve;
pub mod tidy;
pub mod value;

// Re-export primary types at the crate root for convenience.
pub use broadcast::broadcast_shapes;
pub use dispatch::*;
pub use error::{MathError, Result};
pub use library::MathLibrary;
pub use native::{init_native_library, native_library, NativeLibrary};
pub use registry::{Flags, Op, OpSpec, Signature, ALIASES};
pub use resolve::library_for;
pub use tidy::{Tidied, TidyLibrary};
pub use value::{ArrayObject, Value};

pub use mathlib_array::{
    ArrayError, DType, DTypeKind, ErrorAction, NdArray, NumericErrorPolicy, Shape,
};
