use std::sync::OnceLock;

use mathlib_array::{
    frexp, BinaryOp, ComputeBackend, CpuBackend, DType, NdArray, NumericErrorPolicy, Shape,
    UnaryOp,
};
use tracing::debug;

use crate::error::{MathError, Result};
use crate::registry::Op;
use crate::tidy::{Tidied, TidyLibrary};
use crate::value::Value;

/// The default library for plain numeric operands, backed by the
/// `mathlib-array` CPU kernels.
///
/// Result dtypes follow numpy's ufunc loop selection (so `sin` of an
/// integer array is `float64`), and floating point conditions are handled
/// by the configured [`NumericErrorPolicy`].
#[derive(Debug, Clone, Default)]
pub struct NativeLibrary {
    backend: CpuBackend,
}

impl NativeLibrary {
    pub fn new() -> Self {
        NativeLibrary::default()
    }

    pub fn with_policy(policy: NumericErrorPolicy) -> Self {
        NativeLibrary {
            backend: CpuBackend::with_policy(policy),
        }
    }

    pub fn policy(&self) -> &NumericErrorPolicy {
        self.backend.policy()
    }
}

static NATIVE: OnceLock<Tidied<NativeLibrary>> = OnceLock::new();

/// The process-wide native library used for plain numeric operands.
pub fn native_library() -> &'static Tidied<NativeLibrary> {
    NATIVE.get_or_init(|| Tidied::new(NativeLibrary::new()))
}

/// Configure the process-wide native library before its first use.
///
/// Returns `false`, leaving the existing configuration in place, if the
/// library has already been initialized.
pub fn init_native_library(policy: NumericErrorPolicy) -> bool {
    let installed = NATIVE
        .set(Tidied::new(NativeLibrary::with_policy(policy)))
        .is_ok();
    if !installed {
        debug!("native library already initialized; policy unchanged");
    }
    installed
}

/// Kernel implementing a standard unary operation, if any.
pub(crate) fn unary_kernel(op: Op) -> Option<UnaryOp> {
    Some(match op {
        Op::Absolute => UnaryOp::Absolute,
        Op::Arccos => UnaryOp::Arccos,
        Op::Arccosh => UnaryOp::Arccosh,
        Op::Arcsin => UnaryOp::Arcsin,
        Op::Arcsinh => UnaryOp::Arcsinh,
        Op::Arctan => UnaryOp::Arctan,
        Op::Arctanh => UnaryOp::Arctanh,
        Op::Cbrt => UnaryOp::Cbrt,
        Op::Ceil => UnaryOp::Ceil,
        Op::Conjugate => UnaryOp::Conjugate,
        Op::Cos => UnaryOp::Cos,
        Op::Cosh => UnaryOp::Cosh,
        Op::Deg2rad => UnaryOp::Deg2rad,
        Op::Exp => UnaryOp::Exp,
        Op::Exp2 => UnaryOp::Exp2,
        Op::Expm1 => UnaryOp::Expm1,
        Op::Fabs => UnaryOp::Fabs,
        Op::Floor => UnaryOp::Floor,
        Op::Invert => UnaryOp::Invert,
        Op::Isfinite => UnaryOp::Isfinite,
        Op::Isinf => UnaryOp::Isinf,
        Op::Isnan => UnaryOp::Isnan,
        Op::Log => UnaryOp::Log,
        Op::Log10 => UnaryOp::Log10,
        Op::Log1p => UnaryOp::Log1p,
        Op::Log2 => UnaryOp::Log2,
        Op::LogicalNot => UnaryOp::LogicalNot,
        Op::Negative => UnaryOp::Negative,
        Op::Rad2deg => UnaryOp::Rad2deg,
        Op::Reciprocal => UnaryOp::Reciprocal,
        Op::Repvals => UnaryOp::Repvals,
        Op::Rint => UnaryOp::Rint,
        Op::Sign => UnaryOp::Sign,
        Op::Signbit => UnaryOp::Signbit,
        Op::Sin => UnaryOp::Sin,
        Op::Sinh => UnaryOp::Sinh,
        Op::Spacing => UnaryOp::Spacing,
        Op::Sqrt => UnaryOp::Sqrt,
        Op::Square => UnaryOp::Square,
        Op::Tan => UnaryOp::Tan,
        Op::Tanh => UnaryOp::Tanh,
        Op::Trunc => UnaryOp::Trunc,
        _ => return None,
    })
}

/// Kernel implementing a standard binary operation, if any.
pub(crate) fn binary_kernel(op: Op) -> Option<BinaryOp> {
    Some(match op {
        Op::Add => BinaryOp::Add,
        Op::Arctan2 => BinaryOp::Arctan2,
        Op::BitwiseAnd => BinaryOp::BitwiseAnd,
        Op::BitwiseOr => BinaryOp::BitwiseOr,
        Op::BitwiseXor => BinaryOp::BitwiseXor,
        Op::Copysign => BinaryOp::Copysign,
        Op::Divide => BinaryOp::Divide,
        Op::Equal => BinaryOp::Equal,
        Op::FloorDivide => BinaryOp::FloorDivide,
        Op::Fmax => BinaryOp::Fmax,
        Op::Fmin => BinaryOp::Fmin,
        Op::Fmod => BinaryOp::Fmod,
        Op::Greater => BinaryOp::Greater,
        Op::GreaterEqual => BinaryOp::GreaterEqual,
        Op::Hypot => BinaryOp::Hypot,
        Op::Ldexp => BinaryOp::Ldexp,
        Op::LeftShift => BinaryOp::LeftShift,
        Op::Less => BinaryOp::Less,
        Op::LessEqual => BinaryOp::LessEqual,
        Op::Logaddexp => BinaryOp::Logaddexp,
        Op::Logaddexp2 => BinaryOp::Logaddexp2,
        Op::LogicalAnd => BinaryOp::LogicalAnd,
        Op::LogicalOr => BinaryOp::LogicalOr,
        Op::LogicalXor => BinaryOp::LogicalXor,
        Op::Maximum => BinaryOp::Maximum,
        Op::Minimum => BinaryOp::Minimum,
        Op::Multiply => BinaryOp::Multiply,
        Op::Nextafter => BinaryOp::Nextafter,
        Op::NotEqual => BinaryOp::NotEqual,
        Op::Power => BinaryOp::Power,
        Op::Remainder => BinaryOp::Remainder,
        Op::RightShift => BinaryOp::RightShift,
        Op::Subtract => BinaryOp::Subtract,
        Op::TrueDivide => BinaryOp::TrueDivide,
        _ => return None,
    })
}

impl NativeLibrary {
    fn missing(&self, op: Op) -> MathError {
        MathError::NotImplemented {
            op: format!("tidy_{}", op.name()),
            type_name: "NdArray".to_string(),
            library: self.name().to_string(),
        }
    }

    /// Element values as `f64` after conversion to the float loop dtype.
    fn float_values(x: &NdArray) -> (DType, Vec<f64>) {
        let dtype = x.dtype().float_type();
        (dtype, x.astype(dtype).to_f64_vec())
    }
}

impl TidyLibrary for NativeLibrary {
    type Array = NdArray;

    fn name(&self) -> &'static str {
        "NativeLibrary"
    }

    fn accepts(&self, x: &Value) -> bool {
        x.is_native()
    }

    fn new_empty(&self, shape: &Shape, dtype: DType) -> Result<NdArray> {
        Ok(NdArray::empty(shape.clone(), dtype))
    }

    /// Only boolean, integer and float data count as arrays.
    fn typeconvert(&self, x: &Value) -> Result<NdArray> {
        x.as_array()
            .cloned()
            .ok_or_else(|| MathError::NotArray(x.describe()))
    }

    fn shape(&self, x: &NdArray) -> Shape {
        x.shape().clone()
    }

    fn dtype(&self, x: &NdArray) -> DType {
        x.dtype()
    }

    fn reshape_in_place(&self, x: &mut NdArray, shape: &Shape) -> Result<()> {
        Ok(x.reshape_in_place(shape.clone())?)
    }

    fn broadcast_to(&self, x: &NdArray, shape: &Shape) -> Result<NdArray> {
        Ok(x.broadcast_to(shape)?)
    }

    fn wrap(&self, x: NdArray) -> Value {
        Value::Array(x)
    }

    fn as_array<'a>(&self, x: &'a Value) -> Option<&'a NdArray> {
        x.as_array()
    }

    fn as_array_mut<'a>(&self, x: &'a mut Value) -> Option<&'a mut NdArray> {
        x.as_array_mut()
    }

    fn write_back(&self, result: NdArray, out: &mut Value) -> Result<()> {
        *out = Value::Array(result);
        Ok(())
    }

    fn result_dtype(&self, op: Op, inputs: &[DType]) -> Result<DType> {
        match inputs {
            [x] => match unary_kernel(op) {
                Some(k) => Ok(self.backend.unary_loop(k, *x)?.output),
                None => Err(self.missing(op)),
            },
            [x, y] => match binary_kernel(op) {
                Some(k) => Ok(self.backend.binary_loop(k, *x, *y)?.output),
                None => Err(self.missing(op)),
            },
            _ => Err(MathError::WrongSignature {
                op: op.name().to_string(),
                expected: op.signature().name().to_string(),
            }),
        }
    }

    fn tidy_unary(&self, op: Op, x: &NdArray, out: &mut NdArray) -> Result<()> {
        let kernel = unary_kernel(op).ok_or_else(|| self.missing(op))?;
        Ok(self.backend.unary(kernel, x, out)?)
    }

    fn tidy_binary(&self, op: Op, x: &NdArray, y: &NdArray, out: &mut NdArray) -> Result<()> {
        let kernel = binary_kernel(op).ok_or_else(|| self.missing(op))?;
        Ok(self.backend.binary(kernel, x, y, out)?)
    }

    fn cmask(&self, x: &NdArray, welldefined: bool, finite: bool) -> Result<NdArray> {
        let mask: Vec<bool> = x
            .to_f64_vec()
            .into_iter()
            .map(|v| (!welldefined || !v.is_nan()) && (!finite || v.is_finite()))
            .collect();
        Ok(NdArray::new(mask, x.shape().clone()))
    }

    fn frexp(&self, x: &NdArray) -> Result<(NdArray, NdArray)> {
        let (dtype, values) = Self::float_values(x);
        let (mantissa, exponent): (Vec<f64>, Vec<i64>) = values.into_iter().map(frexp).unzip();
        let mantissa = NdArray::new(mantissa, x.shape().clone()).astype(dtype);
        Ok((mantissa, NdArray::new(exponent, x.shape().clone())))
    }

    fn modf(&self, x: &NdArray) -> Result<(NdArray, NdArray)> {
        let (dtype, values) = Self::float_values(x);
        let (fractional, integral): (Vec<f64>, Vec<f64>) = values
            .into_iter()
            .map(|v| {
                let int = v.trunc();
                let frac = if v.is_infinite() { 0.0f64.copysign(v) } else { v - int };
                (frac, int)
            })
            .unzip();
        let shape = x.shape().clone();
        Ok((
            NdArray::new(fractional, shape.clone()).astype(dtype),
            NdArray::new(integral, shape).astype(dtype),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MathLibrary;
    use crate::registry::{Flags, Signature};
    use approx::assert_relative_eq;
    use mathlib_array::ErrorAction;

    fn arr(v: Vec<f64>, dims: &[usize]) -> Value {
        Value::from(NdArray::new(v, Shape::from_slice(dims)))
    }

    #[test]
    fn test_every_native_op_has_a_kernel() {
        for op in Op::ALL {
            if !op.has_flag(Flags::HAS_NATIVE_IMPL) {
                continue;
            }
            let covered = match op.signature() {
                Signature::StdUnary => unary_kernel(*op).is_some(),
                Signature::StdBinary => binary_kernel(*op).is_some(),
                Signature::Other => true,
            };
            assert!(covered, "{op} has no kernel");
        }
    }

    #[test]
    fn test_sin_of_ints_is_float64() {
        let r = native_library()
            .unary(Op::Sin, &Value::from(vec![0i64, 1]))
            .unwrap();
        let r = r.as_array().unwrap();
        assert_eq!(r.dtype(), DType::Float64);
        assert_relative_eq!(r.as_slice::<f64>().unwrap()[1], 1f64.sin());
    }

    #[test]
    fn test_comparison_is_bool() {
        let r = native_library()
            .binary(Op::Less, &Value::from(vec![1i64, 5]), &Value::from(3.0f64))
            .unwrap();
        let r = r.as_array().unwrap();
        assert_eq!(r.as_slice::<bool>().unwrap(), &[true, false]);
    }

    #[test]
    fn test_divide_by_zero_raise_policy() {
        let lib = Tidied::new(NativeLibrary::with_policy(NumericErrorPolicy::uniform(
            ErrorAction::Raise,
        )));
        let err = lib
            .binary(Op::Divide, &Value::from(1.0f64), &Value::from(0.0f64))
            .unwrap_err();
        assert!(matches!(err, MathError::Array(_)));
    }

    #[test]
    fn test_cast_into_int_out_rejected() {
        let mut out = Value::from(vec![0i64, 0]);
        let err = native_library()
            .binary_into(Op::TrueDivide, &Value::from(vec![1i64, 2]), &Value::from(2i64), &mut out)
            .unwrap_err();
        assert!(matches!(err, MathError::Array(_)));
        assert_eq!(out, Value::from(vec![0i64, 0]));
    }

    #[test]
    fn test_cmask() {
        let lib = native_library();
        let x = arr(vec![1.0, f64::NAN, f64::INFINITY], &[3]);
        let all = lib.cmask(&x, false, false).unwrap();
        assert_eq!(all.as_array().unwrap().as_slice::<bool>().unwrap(), &[true, true, true]);
        let wd = lib.cmask(&x, true, false).unwrap();
        assert_eq!(wd.as_array().unwrap().as_slice::<bool>().unwrap(), &[true, false, true]);
        let fin = lib.cmask(&x, false, true).unwrap();
        assert_eq!(fin.as_array().unwrap().as_slice::<bool>().unwrap(), &[true, false, false]);
        let zerod = lib.cmask(&Value::from(2.0f64), true, true).unwrap();
        assert!(zerod.array_shape().unwrap().is_scalar());
    }

    #[test]
    fn test_frexp_and_modf() {
        let lib = native_library();
        let (m, e) = lib.frexp(&arr(vec![6.0, 0.5], &[2])).unwrap();
        assert_eq!(m.as_array().unwrap().as_slice::<f64>().unwrap(), &[0.75, 0.5]);
        assert_eq!(e.as_array().unwrap().as_slice::<i64>().unwrap(), &[3, 0]);

        let (f, i) = lib.modf(&Value::from(vec![2.5f32, -1.25])).unwrap();
        assert_eq!(f.array_dtype(), Some(DType::Float32));
        assert_eq!(f.as_array().unwrap().as_slice::<f32>().unwrap(), &[0.5, -0.25]);
        assert_eq!(i.as_array().unwrap().as_slice::<f32>().unwrap(), &[2.0, -1.0]);
    }

    #[test]
    fn test_repvals_copies() {
        let x = Value::from(vec![1i64, 2]);
        let r = native_library().unary(Op::Repvals, &x).unwrap();
        assert_eq!(r, x);
    }

    #[test]
    fn test_reshape_and_broadcast_to() {
        let lib = native_library();
        let x = Value::from(vec![1.0f64, 2.0, 3.0]);
        let r = lib.reshape(&x, &Shape::new(vec![3, 1])).unwrap();
        assert_eq!(r.array_shape().unwrap().dims(), &[3, 1]);
        let b = lib.broadcast_to(&x, &Shape::new(vec![2, 3])).unwrap();
        assert_eq!(lib.get_size(&b).unwrap(), 6);
        assert!(lib.broadcast_to(&x, &Shape::new(vec![4])).is_err());
    }
}
