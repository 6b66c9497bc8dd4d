//! The tidying adapter.
//!
//! A [`TidyLibrary`] implements each standard operation in "tidy" form only:
//! the output always exists, every operand and the output are in the
//! library's own representation, all of them have one common shape, and
//! none of them is zero-dimensional. Wrapping it in [`Tidied`] yields a full
//! [`MathLibrary`] that handles the general calling convention:
//!
//! 1. every operand (and the output, when given) is normalized with
//!    [`TidyLibrary::typeconvert`];
//! 2. the broadcast shape of the inputs, plus the output when given, is
//!    computed; a supplied output must already have exactly that shape;
//! 3. without an output, a result container is allocated with
//!    [`TidyLibrary::result_dtype`];
//! 4. inputs are broadcast up to the common shape, or, when that shape is
//!    zero-dimensional, everything is viewed as shape `(1,)` for the call
//!    and the result is viewed back as `()` afterwards.
//!
//! All validation happens before the tidy implementation sees the output,
//! so a failed call never writes a partial result.

use std::fmt::Debug;

use mathlib_array::{DType, Shape};
use tracing::trace;

use crate::broadcast::broadcast_shapes;
use crate::error::{MathError, Result};
use crate::library::{expect_signature, MathLibrary};
use crate::registry::{Flags, Op, Signature};
use crate::value::Value;

/// The minimal set of callbacks a custom provider supplies.
pub trait TidyLibrary: Send + Sync + Debug {
    /// The library's own array representation.
    type Array: Debug;

    fn name(&self) -> &'static str;

    fn accepts(&self, x: &Value) -> bool;

    fn new_empty(&self, shape: &Shape, dtype: DType) -> Result<Self::Array>;

    fn typeconvert(&self, x: &Value) -> Result<Self::Array>;

    fn shape(&self, x: &Self::Array) -> Shape;

    fn dtype(&self, x: &Self::Array) -> DType;

    /// Change the shape of `x` without changing its elements.
    fn reshape_in_place(&self, x: &mut Self::Array, shape: &Shape) -> Result<()>;

    fn broadcast_to(&self, x: &Self::Array, shape: &Shape) -> Result<Self::Array>;

    fn wrap(&self, x: Self::Array) -> Value;

    /// Borrow the representation inside `x` without converting it. Metadata
    /// queries use this to skip [`TidyLibrary::typeconvert`].
    fn as_array<'a>(&self, x: &'a Value) -> Option<&'a Self::Array> {
        let _ = x;
        None
    }

    /// Borrow the representation inside `x` directly, when `x` already is
    /// one. Writes through the returned reference land in the caller's
    /// buffer.
    fn as_array_mut<'a>(&self, x: &'a mut Value) -> Option<&'a mut Self::Array>;

    /// Store a result computed in a converted copy back into `out`.
    fn write_back(&self, result: Self::Array, out: &mut Value) -> Result<()>;

    /// Dtype of a freshly allocated result.
    ///
    /// Boolean for operations flagged [`Flags::BOOL_RESULT`], otherwise the
    /// promoted type of the inputs.
    fn result_dtype(&self, op: Op, inputs: &[DType]) -> Result<DType> {
        if op.has_flag(Flags::BOOL_RESULT) {
            return Ok(DType::Bool);
        }
        DType::result_type_of(inputs).ok_or_else(|| MathError::WrongSignature {
            op: op.name().to_string(),
            expected: "at least one input".to_string(),
        })
    }

    fn tidy_unary(&self, op: Op, x: &Self::Array, out: &mut Self::Array) -> Result<()> {
        let _ = (x, out);
        Err(tidy_not_implemented(self, op))
    }

    fn tidy_binary(
        &self,
        op: Op,
        x: &Self::Array,
        y: &Self::Array,
        out: &mut Self::Array,
    ) -> Result<()> {
        let _ = (x, y, out);
        Err(tidy_not_implemented(self, op))
    }

    fn cmask(&self, x: &Self::Array, welldefined: bool, finite: bool) -> Result<Self::Array> {
        let _ = (x, welldefined, finite);
        Err(array_not_implemented(self, Op::Cmask.name()))
    }

    fn frexp(&self, x: &Self::Array) -> Result<(Self::Array, Self::Array)> {
        let _ = x;
        Err(array_not_implemented(self, Op::Frexp.name()))
    }

    fn modf(&self, x: &Self::Array) -> Result<(Self::Array, Self::Array)> {
        let _ = x;
        Err(array_not_implemented(self, Op::Modf.name()))
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn array_not_implemented<L: TidyLibrary + ?Sized>(lib: &L, op: &str) -> MathError {
    MathError::NotImplemented {
        op: op.to_string(),
        type_name: short_type_name::<L::Array>().to_string(),
        library: lib.name().to_string(),
    }
}

fn tidy_not_implemented<L: TidyLibrary + ?Sized>(lib: &L, op: Op) -> MathError {
    array_not_implemented(lib, &format!("tidy_{}", op.name()))
}

fn check_out_shape(op: Op, broadcast: &Shape, out: &Shape) -> Result<()> {
    if broadcast != out {
        return Err(MathError::OutputShape {
            op: op.name().to_string(),
            expected: broadcast.dims().to_vec(),
            got: out.dims().to_vec(),
        });
    }
    Ok(())
}

/// A [`MathLibrary`] built from a [`TidyLibrary`].
#[derive(Debug, Default)]
pub struct Tidied<L>(L);

impl<L> Tidied<L> {
    pub const fn new(inner: L) -> Self {
        Tidied(inner)
    }

    pub fn inner(&self) -> &L {
        &self.0
    }
}

impl<L: TidyLibrary> Tidied<L> {
    fn one() -> Shape {
        Shape::new(vec![1])
    }

    /// Bring `x` to `target`, the common non-scalar shape.
    fn conform(&self, x: L::Array, from: &Shape, target: &Shape) -> Result<L::Array> {
        if from == target {
            Ok(x)
        } else {
            self.0.broadcast_to(&x, target)
        }
    }

    /// Run `f` on the representation of `out`, writing back if `out` had to
    /// be converted.
    fn with_out<F>(&self, out: &mut Value, f: F) -> Result<()>
    where
        F: FnOnce(&mut L::Array) -> Result<()>,
    {
        if let Some(arr) = self.0.as_array_mut(out) {
            return f(arr);
        }
        let mut arr = self.0.typeconvert(out)?;
        f(&mut arr)?;
        self.0.write_back(arr, out)
    }

    /// Run `f` on `out` viewed as `(1,)` when `zerod`, restoring `()` after.
    fn in_tidy_shape<F>(&self, out: &mut L::Array, zerod: bool, f: F) -> Result<()>
    where
        F: FnOnce(&mut L::Array) -> Result<()>,
    {
        if !zerod {
            return f(out);
        }
        self.0.reshape_in_place(out, &Self::one())?;
        let result = f(out);
        self.0.reshape_in_place(out, &Shape::scalar())?;
        result
    }

    fn tidy_unary_new(&self, op: Op, x: &Value) -> Result<Value> {
        let lib = &self.0;
        let mut x = lib.typeconvert(x)?;
        let xsh = lib.shape(&x);
        let dtype = lib.result_dtype(op, &[lib.dtype(&x)])?;
        let mut out = lib.new_empty(&xsh, dtype)?;
        let zerod = xsh.is_scalar();
        if zerod {
            lib.reshape_in_place(&mut x, &Self::one())?;
        }
        trace!(library = lib.name(), op = %op, shape = %xsh, %dtype, "tidy unary");

        self.in_tidy_shape(&mut out, zerod, |out| lib.tidy_unary(op, &x, out))?;
        Ok(lib.wrap(out))
    }

    fn tidy_unary_into<'a>(&self, op: Op, x: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
        let lib = &self.0;
        let x = lib.typeconvert(x)?;
        let xsh = lib.shape(&x);

        self.with_out(out, |out| {
            let osh = lib.shape(out);
            let bsh = broadcast_shapes(op.name(), &[&xsh, &osh])?;
            check_out_shape(op, &bsh, &osh)?;

            // Both x and out are zero-dimensional here.
            let zerod = bsh.is_scalar();
            let x = if zerod {
                let mut x = x;
                lib.reshape_in_place(&mut x, &Self::one())?;
                x
            } else {
                self.conform(x, &xsh, &bsh)?
            };
            trace!(library = lib.name(), op = %op, shape = %bsh, "tidy unary into");

            self.in_tidy_shape(out, zerod, |out| lib.tidy_unary(op, &x, out))
        })?;
        Ok(out)
    }

    fn tidy_binary_new(&self, op: Op, x: &Value, y: &Value) -> Result<Value> {
        let lib = &self.0;
        let x = lib.typeconvert(x)?;
        let y = lib.typeconvert(y)?;
        let (xsh, ysh) = (lib.shape(&x), lib.shape(&y));
        let bsh = broadcast_shapes(op.name(), &[&xsh, &ysh])?;
        let dtype = lib.result_dtype(op, &[lib.dtype(&x), lib.dtype(&y)])?;
        let mut out = lib.new_empty(&bsh, dtype)?;

        let zerod = bsh.is_scalar();
        let (x, y) = if zerod {
            let (mut x, mut y) = (x, y);
            lib.reshape_in_place(&mut x, &Self::one())?;
            lib.reshape_in_place(&mut y, &Self::one())?;
            (x, y)
        } else {
            (self.conform(x, &xsh, &bsh)?, self.conform(y, &ysh, &bsh)?)
        };
        trace!(library = lib.name(), op = %op, shape = %bsh, %dtype, "tidy binary");

        self.in_tidy_shape(&mut out, zerod, |out| lib.tidy_binary(op, &x, &y, out))?;
        Ok(lib.wrap(out))
    }

    fn tidy_binary_into<'a>(
        &self,
        op: Op,
        x: &Value,
        y: &Value,
        out: &'a mut Value,
    ) -> Result<&'a mut Value> {
        let lib = &self.0;
        let x = lib.typeconvert(x)?;
        let y = lib.typeconvert(y)?;
        let (xsh, ysh) = (lib.shape(&x), lib.shape(&y));

        self.with_out(out, |out| {
            let osh = lib.shape(out);
            let bsh = broadcast_shapes(op.name(), &[&xsh, &ysh, &osh])?;
            check_out_shape(op, &bsh, &osh)?;

            let zerod = bsh.is_scalar();
            let (x, y) = if zerod {
                let (mut x, mut y) = (x, y);
                lib.reshape_in_place(&mut x, &Self::one())?;
                lib.reshape_in_place(&mut y, &Self::one())?;
                (x, y)
            } else {
                (self.conform(x, &xsh, &bsh)?, self.conform(y, &ysh, &bsh)?)
            };
            trace!(library = lib.name(), op = %op, shape = %bsh, "tidy binary into");

            self.in_tidy_shape(out, zerod, |out| lib.tidy_binary(op, &x, &y, out))
        })?;
        Ok(out)
    }
}

impl<L: TidyLibrary> MathLibrary for Tidied<L> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn accepts(&self, x: &Value) -> bool {
        self.0.accepts(x)
    }

    fn new_empty(&self, shape: &Shape, dtype: DType) -> Result<Value> {
        Ok(self.0.wrap(self.0.new_empty(shape, dtype)?))
    }

    fn typeconvert(&self, x: &Value) -> Result<Value> {
        Ok(self.0.wrap(self.0.typeconvert(x)?))
    }

    fn get_dtype(&self, x: &Value) -> Result<DType> {
        match self.0.as_array(x) {
            Some(arr) => Ok(self.0.dtype(arr)),
            None => Ok(self.0.dtype(&self.0.typeconvert(x)?)),
        }
    }

    fn shape(&self, x: &Value) -> Result<Shape> {
        match self.0.as_array(x) {
            Some(arr) => Ok(self.0.shape(arr)),
            None => Ok(self.0.shape(&self.0.typeconvert(x)?)),
        }
    }

    fn reshape(&self, x: &Value, shape: &Shape) -> Result<Value> {
        let mut arr = self.0.typeconvert(x)?;
        self.0.reshape_in_place(&mut arr, shape)?;
        Ok(self.0.wrap(arr))
    }

    fn broadcast_to(&self, x: &Value, shape: &Shape) -> Result<Value> {
        let arr = self.0.typeconvert(x)?;
        Ok(self.0.wrap(self.0.broadcast_to(&arr, shape)?))
    }

    fn cmask(&self, x: &Value, welldefined: bool, finite: bool) -> Result<Value> {
        let arr = self.0.typeconvert(x)?;
        Ok(self.0.wrap(self.0.cmask(&arr, welldefined, finite)?))
    }

    fn frexp(&self, x: &Value) -> Result<(Value, Value)> {
        let arr = self.0.typeconvert(x)?;
        let (mantissa, exponent) = self.0.frexp(&arr)?;
        Ok((self.0.wrap(mantissa), self.0.wrap(exponent)))
    }

    fn modf(&self, x: &Value) -> Result<(Value, Value)> {
        let arr = self.0.typeconvert(x)?;
        let (fractional, integral) = self.0.modf(&arr)?;
        Ok((self.0.wrap(fractional), self.0.wrap(integral)))
    }

    fn unary(&self, op: Op, x: &Value) -> Result<Value> {
        expect_signature(op, Signature::StdUnary)?;
        self.tidy_unary_new(op, x)
    }

    fn unary_into<'a>(&self, op: Op, x: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
        expect_signature(op, Signature::StdUnary)?;
        self.tidy_unary_into(op, x, out)
    }

    fn binary(&self, op: Op, x: &Value, y: &Value) -> Result<Value> {
        expect_signature(op, Signature::StdBinary)?;
        self.tidy_binary_new(op, x, y)
    }

    fn binary_into<'a>(
        &self,
        op: Op,
        x: &Value,
        y: &Value,
        out: &'a mut Value,
    ) -> Result<&'a mut Value> {
        expect_signature(op, Signature::StdBinary)?;
        self.tidy_binary_into(op, x, y, out)
    }
}
