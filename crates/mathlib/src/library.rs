use std::fmt::Debug;

use mathlib_array::{DType, Shape};

use crate::error::{MathError, Result};
use crate::registry::{Op, Signature};
use crate::value::Value;

/// A capability provider: one implementation of the common interface for a
/// family of operand representations.
///
/// Libraries are stateless singletons apart from configuration fixed at
/// construction. Every common-interface method has a default that fails
/// with [`MathError::NotImplemented`]; a library overrides only what it
/// supports and never falls back to another library.
pub trait MathLibrary: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Whether this library can operate on `x`.
    fn accepts(&self, x: &Value) -> bool {
        let _ = x;
        false
    }

    /// Allocate a new zero-filled result container.
    fn new_empty(&self, shape: &Shape, dtype: DType) -> Result<Value> {
        let _ = shape;
        Err(MathError::NotImplemented {
            op: "new_empty".to_string(),
            type_name: dtype.name().to_string(),
            library: self.name().to_string(),
        })
    }

    /// Convert `x` into this library's standard representation.
    fn typeconvert(&self, x: &Value) -> Result<Value> {
        Ok(x.clone())
    }

    fn get_dtype(&self, x: &Value) -> Result<DType> {
        x.array_dtype()
            .ok_or_else(|| not_implemented(self.name(), "get_dtype", x))
    }

    fn shape(&self, x: &Value) -> Result<Shape> {
        x.array_shape()
            .cloned()
            .ok_or_else(|| not_implemented(self.name(), "shape", x))
    }

    fn get_size(&self, x: &Value) -> Result<usize> {
        Ok(self.shape(x)?.numel())
    }

    fn reshape(&self, x: &Value, shape: &Shape) -> Result<Value> {
        let _ = shape;
        Err(not_implemented(self.name(), Op::Reshape.name(), x))
    }

    fn broadcast_to(&self, x: &Value, shape: &Shape) -> Result<Value> {
        let _ = shape;
        Err(not_implemented(self.name(), Op::BroadcastTo.name(), x))
    }

    /// Boolean mask of the "good" elements of `x`. `welldefined` excludes
    /// NaNs and `finite` excludes infinities as well.
    fn cmask(&self, x: &Value, welldefined: bool, finite: bool) -> Result<Value> {
        let _ = (welldefined, finite);
        Err(not_implemented(self.name(), Op::Cmask.name(), x))
    }

    /// Split into mantissa and base-2 exponent.
    fn frexp(&self, x: &Value) -> Result<(Value, Value)> {
        Err(not_implemented(self.name(), Op::Frexp.name(), x))
    }

    /// Split into fractional and integral parts.
    fn modf(&self, x: &Value) -> Result<(Value, Value)> {
        Err(not_implemented(self.name(), Op::Modf.name(), x))
    }

    fn unary(&self, op: Op, x: &Value) -> Result<Value> {
        Err(not_implemented(self.name(), op.name(), x))
    }

    /// Compute `op(x)` into `out`, returning `out`.
    fn unary_into<'a>(&self, op: Op, x: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
        let _ = out;
        Err(not_implemented(self.name(), op.name(), x))
    }

    fn binary(&self, op: Op, x: &Value, y: &Value) -> Result<Value> {
        let _ = y;
        Err(not_implemented(self.name(), op.name(), x))
    }

    /// Compute `op(x, y)` into `out`, returning `out`.
    fn binary_into<'a>(
        &self,
        op: Op,
        x: &Value,
        y: &Value,
        out: &'a mut Value,
    ) -> Result<&'a mut Value> {
        let _ = (y, out);
        Err(not_implemented(self.name(), op.name(), x))
    }
}

pub(crate) fn not_implemented(library: &str, op: &str, x: &Value) -> MathError {
    MathError::NotImplemented {
        op: op.to_string(),
        type_name: x.type_name().to_string(),
        library: library.to_string(),
    }
}

pub(crate) fn expect_signature(op: Op, expected: Signature) -> Result<()> {
    if op.signature() == expected {
        Ok(())
    } else {
        Err(MathError::WrongSignature {
            op: op.name().to_string(),
            expected: expected.name().to_string(),
        })
    }
}
