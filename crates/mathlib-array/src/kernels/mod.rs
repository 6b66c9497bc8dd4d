pub mod binary;
pub mod float;
pub mod unary;

use tracing::trace;

use crate::array::NdArray;
use crate::backend::ComputeBackend;
use crate::dtype::DType;
use crate::error::{ArrayError, Result};
use crate::policy::{Conditions, NumericErrorPolicy};

/// Elementwise operations taking one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Absolute,
    Arccos,
    Arccosh,
    Arcsin,
    Arcsinh,
    Arctan,
    Arctanh,
    Cbrt,
    Ceil,
    Conjugate,
    Cos,
    Cosh,
    Deg2rad,
    Exp,
    Exp2,
    Expm1,
    Fabs,
    Floor,
    Invert,
    Isfinite,
    Isinf,
    Isnan,
    Log,
    Log10,
    Log1p,
    Log2,
    LogicalNot,
    Negative,
    Rad2deg,
    Reciprocal,
    Repvals,
    Rint,
    Sign,
    Signbit,
    Sin,
    Sinh,
    Spacing,
    Sqrt,
    Square,
    Tan,
    Tanh,
    Trunc,
}

/// Elementwise operations taking two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Arctan2,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Copysign,
    Divide,
    Equal,
    FloorDivide,
    Fmax,
    Fmin,
    Fmod,
    Greater,
    GreaterEqual,
    Hypot,
    Ldexp,
    LeftShift,
    Less,
    LessEqual,
    Logaddexp,
    Logaddexp2,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Maximum,
    Minimum,
    Multiply,
    Nextafter,
    NotEqual,
    Power,
    Remainder,
    RightShift,
    Subtract,
    TrueDivide,
}

/// Dtypes a unary loop runs in and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnaryLoop {
    pub input: DType,
    pub output: DType,
}

/// Dtypes a binary loop runs in and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryLoop {
    pub inputs: (DType, DType),
    pub output: DType,
}

impl UnaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Absolute => "absolute",
            UnaryOp::Arccos => "arccos",
            UnaryOp::Arccosh => "arccosh",
            UnaryOp::Arcsin => "arcsin",
            UnaryOp::Arcsinh => "arcsinh",
            UnaryOp::Arctan => "arctan",
            UnaryOp::Arctanh => "arctanh",
            UnaryOp::Cbrt => "cbrt",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Conjugate => "conjugate",
            UnaryOp::Cos => "cos",
            UnaryOp::Cosh => "cosh",
            UnaryOp::Deg2rad => "deg2rad",
            UnaryOp::Exp => "exp",
            UnaryOp::Exp2 => "exp2",
            UnaryOp::Expm1 => "expm1",
            UnaryOp::Fabs => "fabs",
            UnaryOp::Floor => "floor",
            UnaryOp::Invert => "invert",
            UnaryOp::Isfinite => "isfinite",
            UnaryOp::Isinf => "isinf",
            UnaryOp::Isnan => "isnan",
            UnaryOp::Log => "log",
            UnaryOp::Log10 => "log10",
            UnaryOp::Log1p => "log1p",
            UnaryOp::Log2 => "log2",
            UnaryOp::LogicalNot => "logical_not",
            UnaryOp::Negative => "negative",
            UnaryOp::Rad2deg => "rad2deg",
            UnaryOp::Reciprocal => "reciprocal",
            UnaryOp::Repvals => "repvals",
            UnaryOp::Rint => "rint",
            UnaryOp::Sign => "sign",
            UnaryOp::Signbit => "signbit",
            UnaryOp::Sin => "sin",
            UnaryOp::Sinh => "sinh",
            UnaryOp::Spacing => "spacing",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Square => "square",
            UnaryOp::Tan => "tan",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Trunc => "trunc",
        }
    }

    /// Boolean-valued tests that accept every dtype.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            UnaryOp::Isfinite
                | UnaryOp::Isinf
                | UnaryOp::Isnan
                | UnaryOp::Signbit
                | UnaryOp::LogicalNot
        )
    }

    /// Select the loop for an input of dtype `x`, following numpy's ufunc
    /// type resolution.
    pub fn resolve(&self, x: DType) -> Result<UnaryLoop> {
        let same = |d: DType| UnaryLoop {
            input: d,
            output: d,
        };
        let unsupported = || ArrayError::UnsupportedDType {
            op: self.name().to_string(),
            dtype: x,
        };
        Ok(match self {
            UnaryOp::LogicalNot => UnaryLoop {
                input: DType::Bool,
                output: DType::Bool,
            },
            op if op.is_predicate() => UnaryLoop {
                input: x,
                output: DType::Bool,
            },
            UnaryOp::Absolute | UnaryOp::Conjugate | UnaryOp::Repvals => same(x),
            UnaryOp::Invert => {
                if x.is_float() {
                    return Err(unsupported());
                }
                same(x)
            }
            UnaryOp::Negative | UnaryOp::Sign => {
                if x.is_bool() {
                    return Err(unsupported());
                }
                same(x)
            }
            UnaryOp::Square | UnaryOp::Reciprocal => {
                if x.is_bool() {
                    same(DType::Int64)
                } else {
                    same(x)
                }
            }
            _ => same(x.float_type()),
        })
    }
}

impl BinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Arctan2 => "arctan2",
            BinaryOp::BitwiseAnd => "bitwise_and",
            BinaryOp::BitwiseOr => "bitwise_or",
            BinaryOp::BitwiseXor => "bitwise_xor",
            BinaryOp::Copysign => "copysign",
            BinaryOp::Divide => "divide",
            BinaryOp::Equal => "equal",
            BinaryOp::FloorDivide => "floor_divide",
            BinaryOp::Fmax => "fmax",
            BinaryOp::Fmin => "fmin",
            BinaryOp::Fmod => "fmod",
            BinaryOp::Greater => "greater",
            BinaryOp::GreaterEqual => "greater_equal",
            BinaryOp::Hypot => "hypot",
            BinaryOp::Ldexp => "ldexp",
            BinaryOp::LeftShift => "left_shift",
            BinaryOp::Less => "less",
            BinaryOp::LessEqual => "less_equal",
            BinaryOp::Logaddexp => "logaddexp",
            BinaryOp::Logaddexp2 => "logaddexp2",
            BinaryOp::LogicalAnd => "logical_and",
            BinaryOp::LogicalOr => "logical_or",
            BinaryOp::LogicalXor => "logical_xor",
            BinaryOp::Maximum => "maximum",
            BinaryOp::Minimum => "minimum",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Nextafter => "nextafter",
            BinaryOp::NotEqual => "not_equal",
            BinaryOp::Power => "power",
            BinaryOp::Remainder => "remainder",
            BinaryOp::RightShift => "right_shift",
            BinaryOp::Subtract => "subtract",
            BinaryOp::TrueDivide => "true_divide",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    /// Select the loop for inputs of dtypes `x` and `y`, following numpy's
    /// ufunc type resolution.
    pub fn resolve(&self, x: DType, y: DType) -> Result<BinaryLoop> {
        let common = DType::result_type(x, y);
        let same = |d: DType| BinaryLoop {
            inputs: (d, d),
            output: d,
        };
        let unsupported = |dtype: DType| ArrayError::UnsupportedDType {
            op: self.name().to_string(),
            dtype,
        };
        let first_float = if x.is_float() { x } else { y };

        Ok(match self {
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => BinaryLoop {
                inputs: (common, common),
                output: DType::Bool,
            },
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::LogicalXor => {
                same(DType::Bool)
            }
            BinaryOp::BitwiseAnd | BinaryOp::BitwiseOr | BinaryOp::BitwiseXor => {
                if common.is_float() {
                    return Err(unsupported(first_float));
                }
                same(common)
            }
            BinaryOp::LeftShift | BinaryOp::RightShift => {
                if common.is_float() {
                    return Err(unsupported(first_float));
                }
                same(DType::Int64)
            }
            BinaryOp::Add
            | BinaryOp::Multiply
            | BinaryOp::Maximum
            | BinaryOp::Minimum
            | BinaryOp::Fmax
            | BinaryOp::Fmin => same(common),
            BinaryOp::Subtract => {
                if common.is_bool() {
                    return Err(unsupported(DType::Bool));
                }
                same(common)
            }
            BinaryOp::Power | BinaryOp::FloorDivide | BinaryOp::Remainder | BinaryOp::Fmod => {
                if common.is_bool() {
                    same(DType::Int64)
                } else {
                    same(common)
                }
            }
            BinaryOp::Divide | BinaryOp::TrueDivide => {
                if common.is_float() {
                    same(common)
                } else {
                    same(DType::Float64)
                }
            }
            BinaryOp::Ldexp => {
                if y.is_float() {
                    return Err(unsupported(y));
                }
                let f = x.float_type();
                BinaryLoop {
                    inputs: (f, DType::Int64),
                    output: f,
                }
            }
            BinaryOp::Arctan2
            | BinaryOp::Copysign
            | BinaryOp::Hypot
            | BinaryOp::Logaddexp
            | BinaryOp::Logaddexp2
            | BinaryOp::Nextafter => same(common.float_type()),
        })
    }
}

/// Pure-Rust CPU compute backend.
///
/// Implements all operations with straightforward loops optimized for
/// correctness rather than peak performance. Floating point conditions are
/// handled according to the configured [`NumericErrorPolicy`].
#[derive(Debug, Clone, Default)]
pub struct CpuBackend {
    policy: NumericErrorPolicy,
}

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend::default()
    }

    pub fn with_policy(policy: NumericErrorPolicy) -> Self {
        CpuBackend { policy }
    }

    pub fn policy(&self) -> &NumericErrorPolicy {
        &self.policy
    }

    fn check_out(x: &NdArray, out: &NdArray, output: DType) -> Result<()> {
        if x.shape() != out.shape() {
            return Err(ArrayError::ShapeMismatch {
                expected: out.shape().dims().to_vec(),
                got: x.shape().dims().to_vec(),
            });
        }
        if !DType::can_cast_same_kind(output, out.dtype()) {
            return Err(ArrayError::CastError {
                from: output,
                to: out.dtype(),
            });
        }
        Ok(())
    }

    fn store(result: crate::storage::Storage, out: &mut NdArray) -> Result<()> {
        out.storage_mut().assign_from(&result)
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn unary_loop(&self, op: UnaryOp, x: DType) -> Result<UnaryLoop> {
        op.resolve(x)
    }

    fn binary_loop(&self, op: BinaryOp, x: DType, y: DType) -> Result<BinaryLoop> {
        op.resolve(x, y)
    }

    fn unary(&self, op: UnaryOp, x: &NdArray, out: &mut NdArray) -> Result<()> {
        let lp = op.resolve(x.dtype())?;
        Self::check_out(x, out, lp.output)?;
        trace!(op = op.name(), input = %lp.input, output = %lp.output, "unary loop");

        let input = x.storage().cast(lp.input);
        let mut seen = Conditions::default();
        let result = unary::apply(op, &input, &mut seen)?;
        self.policy.check(op.name(), &seen)?;
        Self::store(result, out)
    }

    fn binary(&self, op: BinaryOp, x: &NdArray, y: &NdArray, out: &mut NdArray) -> Result<()> {
        let lp = op.resolve(x.dtype(), y.dtype())?;
        Self::check_out(x, out, lp.output)?;
        Self::check_out(y, out, lp.output)?;
        trace!(
            op = op.name(),
            x = %lp.inputs.0,
            y = %lp.inputs.1,
            output = %lp.output,
            "binary loop"
        );

        let a = x.storage().cast(lp.inputs.0);
        let b = y.storage().cast(lp.inputs.1);
        let mut seen = Conditions::default();
        let result = binary::apply(op, &a, &b, &mut seen)?;
        self.policy.check(op.name(), &seen)?;
        Self::store(result, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ErrorAction;
    use crate::shape::Shape;
    use approx::assert_relative_eq;

    fn backend() -> CpuBackend {
        CpuBackend::new()
    }

    fn run_binary(op: BinaryOp, x: &NdArray, y: &NdArray) -> Result<NdArray> {
        let b = backend();
        let lp = b.binary_loop(op, x.dtype(), y.dtype())?;
        let mut out = NdArray::empty(x.shape().clone(), lp.output);
        b.binary(op, x, y, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_unary_loop_resolution() {
        assert_eq!(UnaryOp::Sin.resolve(DType::Int64).unwrap().output, DType::Float64);
        assert_eq!(UnaryOp::Sin.resolve(DType::Bool).unwrap().output, DType::Float16);
        assert_eq!(UnaryOp::Sin.resolve(DType::Float32).unwrap().output, DType::Float32);
        assert_eq!(UnaryOp::Isnan.resolve(DType::Int64).unwrap().output, DType::Bool);
        assert_eq!(UnaryOp::Absolute.resolve(DType::Int64).unwrap().output, DType::Int64);
        assert!(UnaryOp::Invert.resolve(DType::Float64).is_err());
        assert!(UnaryOp::Negative.resolve(DType::Bool).is_err());
    }

    #[test]
    fn test_binary_loop_resolution() {
        let lp = BinaryOp::Add.resolve(DType::Int64, DType::Float32).unwrap();
        assert_eq!(lp.output, DType::Float64);
        let lp = BinaryOp::TrueDivide.resolve(DType::Int64, DType::Int64).unwrap();
        assert_eq!(lp.output, DType::Float64);
        let lp = BinaryOp::Less.resolve(DType::Int64, DType::Float64).unwrap();
        assert_eq!(lp.inputs, (DType::Float64, DType::Float64));
        assert_eq!(lp.output, DType::Bool);
        let lp = BinaryOp::Ldexp.resolve(DType::Float32, DType::Int64).unwrap();
        assert_eq!(lp.inputs, (DType::Float32, DType::Int64));
        assert!(BinaryOp::BitwiseAnd.resolve(DType::Float64, DType::Int64).is_err());
        assert!(BinaryOp::LeftShift.resolve(DType::Int64, DType::Float16).is_err());
        assert!(BinaryOp::Subtract.resolve(DType::Bool, DType::Bool).is_err());
        assert!(BinaryOp::Ldexp.resolve(DType::Float64, DType::Float64).is_err());
    }

    #[test]
    fn test_comparison_loops_are_boolean() {
        let ops = [
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::Less,
            BinaryOp::LessEqual,
            BinaryOp::Greater,
            BinaryOp::GreaterEqual,
        ];
        for op in ops {
            assert!(op.is_comparison());
            let lp = op.resolve(DType::Bool, DType::Int64).unwrap();
            assert_eq!(lp.inputs, (DType::Int64, DType::Int64));
            assert_eq!(lp.output, DType::Bool);
            let lp = op.resolve(DType::Float16, DType::Float32).unwrap();
            assert_eq!(lp.inputs, (DType::Float32, DType::Float32));
            assert_eq!(lp.output, DType::Bool);
        }
        assert!(!BinaryOp::Add.is_comparison());
    }

    #[test]
    fn test_add() {
        let x = NdArray::from_vec(vec![1.0f64, 2.0]);
        let y = NdArray::from_vec(vec![3.0f64, 4.0]);
        let r = run_binary(BinaryOp::Add, &x, &y).unwrap();
        assert_eq!(r.as_slice::<f64>().unwrap(), &[4.0, 6.0]);
    }

    #[test]
    fn test_mixed_dtype_multiply() {
        let x = NdArray::from_vec(vec![2i64, 3]);
        let y = NdArray::from_vec(vec![0.5f32, 2.0]);
        let r = run_binary(BinaryOp::Multiply, &x, &y).unwrap();
        assert_eq!(r.dtype(), DType::Float64);
        assert_eq!(r.as_slice::<f64>().unwrap(), &[1.0, 6.0]);
    }

    #[test]
    fn test_unary_sqrt() {
        let b = backend();
        let x = NdArray::from_vec(vec![4i64, 9]);
        let mut out = NdArray::empty(Shape::new(vec![2]), DType::Float64);
        b.unary(UnaryOp::Sqrt, &x, &mut out).unwrap();
        assert_eq!(out.as_slice::<f64>().unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn test_unary_into_wider_out() {
        let b = backend();
        let x = NdArray::from_vec(vec![0.5f32]);
        let mut out = NdArray::empty(Shape::new(vec![1]), DType::Float64);
        b.unary(UnaryOp::Exp, &x, &mut out).unwrap();
        assert_relative_eq!(
            out.as_slice::<f64>().unwrap()[0],
            0.5f32.exp() as f64,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_out_cast_rejected_before_write() {
        let b = backend();
        let x = NdArray::from_vec(vec![1.0f64, 2.0]);
        let mut out = NdArray::from_vec(vec![9i64, 9]);
        assert!(b.unary(UnaryOp::Sin, &x, &mut out).is_err());
        assert_eq!(out.as_slice::<i64>().unwrap(), &[9, 9]);
    }

    #[test]
    fn test_out_shape_mismatch() {
        let b = backend();
        let x = NdArray::from_vec(vec![1.0f64, 2.0]);
        let mut out = NdArray::empty(Shape::new(vec![3]), DType::Float64);
        assert!(b.unary(UnaryOp::Sin, &x, &mut out).is_err());
    }

    #[test]
    fn test_raise_policy_leaves_out_untouched() {
        let b = CpuBackend::with_policy(NumericErrorPolicy {
            divide: ErrorAction::Raise,
            ..NumericErrorPolicy::ignore_all()
        });
        let x = NdArray::from_vec(vec![1.0f64, 2.0]);
        let y = NdArray::from_vec(vec![1.0f64, 0.0]);
        let mut out = NdArray::from_vec(vec![-1.0f64, -1.0]);
        let err = b.binary(BinaryOp::Divide, &x, &y, &mut out).unwrap_err();
        assert!(matches!(err, ArrayError::FloatingPoint { .. }));
        assert_eq!(out.as_slice::<f64>().unwrap(), &[-1.0, -1.0]);
    }

    #[test]
    fn test_ignore_policy_produces_ieee_values() {
        let b = CpuBackend::with_policy(NumericErrorPolicy::ignore_all());
        let x = NdArray::from_vec(vec![0.0f64, -1.0]);
        let mut out = NdArray::empty(Shape::new(vec![2]), DType::Float64);
        b.unary(UnaryOp::Log, &x, &mut out).unwrap();
        let r = out.as_slice::<f64>().unwrap();
        assert_eq!(r[0], f64::NEG_INFINITY);
        assert!(r[1].is_nan());
    }

    #[test]
    fn test_bool_arithmetic() {
        let x = NdArray::from_vec(vec![true, false, true]);
        let y = NdArray::from_vec(vec![true, false, false]);
        let r = run_binary(BinaryOp::Add, &x, &y).unwrap();
        assert_eq!(r.as_slice::<bool>().unwrap(), &[true, false, true]);
        assert!(run_binary(BinaryOp::Subtract, &x, &y).is_err());
    }
}
