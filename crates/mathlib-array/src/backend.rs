use std::fmt::Debug;

use crate::array::NdArray;
use crate::dtype::DType;
use crate::error::Result;
use crate::kernels::{BinaryLoop, BinaryOp, UnaryLoop, UnaryOp};

/// Trait for pluggable elementwise compute backends.
///
/// Inputs arrive with equal shapes; broadcasting happens before a backend
/// is called. Results are written into a caller-provided `out` array whose
/// shape must equal the input shape. A backend must validate everything
/// (loop dtypes, casting into `out`, floating point conditions under its
/// error policy) before it writes a single element of `out`.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu").
    fn name(&self) -> &str;

    /// The loop `op` would run for an input of dtype `x`.
    fn unary_loop(&self, op: UnaryOp, x: DType) -> Result<UnaryLoop>;

    /// The loop `op` would run for inputs of dtypes `x` and `y`.
    fn binary_loop(&self, op: BinaryOp, x: DType, y: DType) -> Result<BinaryLoop>;

    /// Elementwise `out[i] = op(x[i])`.
    fn unary(&self, op: UnaryOp, x: &NdArray, out: &mut NdArray) -> Result<()>;

    /// Elementwise `out[i] = op(x[i], y[i])`.
    fn binary(&self, op: BinaryOp, x: &NdArray, y: &NdArray, out: &mut NdArray) -> Result<()>;
}
