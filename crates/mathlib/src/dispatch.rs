//! Free functions of the common interface.
//!
//! Each function resolves the library for its operands (including the
//! output buffer, when one is given) and delegates to it with the arguments
//! unchanged. `name(x)` allocates a result; `name_into(x, out)` writes into
//! `out` and returns it.

use mathlib_array::{DType, Shape};

use crate::error::Result;
use crate::library::expect_signature;
use crate::registry::{Op, Signature};
use crate::resolve::library_for;
use crate::value::Value;

/// Apply a standard unary operation.
pub fn unary(op: Op, x: &Value) -> Result<Value> {
    expect_signature(op, Signature::StdUnary)?;
    library_for(&[x])?.unary(op, x)
}

/// Apply a standard unary operation into `out`.
pub fn unary_into<'a>(op: Op, x: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
    expect_signature(op, Signature::StdUnary)?;
    let library = library_for(&[x, &*out])?;
    library.unary_into(op, x, out)
}

/// Apply a standard binary operation.
pub fn binary(op: Op, x: &Value, y: &Value) -> Result<Value> {
    expect_signature(op, Signature::StdBinary)?;
    library_for(&[x, y])?.binary(op, x, y)
}

/// Apply a standard binary operation into `out`.
pub fn binary_into<'a>(op: Op, x: &Value, y: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
    expect_signature(op, Signature::StdBinary)?;
    let library = library_for(&[x, y, &*out])?;
    library.binary_into(op, x, y, out)
}

macro_rules! unary_functions {
    ($($name:ident, $into:ident => $op:ident;)*) => {
        $(
            pub fn $name(x: &Value) -> Result<Value> {
                unary(Op::$op, x)
            }

            pub fn $into<'a>(x: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
                unary_into(Op::$op, x, out)
            }
        )*
    };
}

macro_rules! binary_functions {
    ($($name:ident, $into:ident => $op:ident;)*) => {
        $(
            pub fn $name(x: &Value, y: &Value) -> Result<Value> {
                binary(Op::$op, x, y)
            }

            pub fn $into<'a>(x: &Value, y: &Value, out: &'a mut Value) -> Result<&'a mut Value> {
                binary_into(Op::$op, x, y, out)
            }
        )*
    };
}

unary_functions! {
    absolute, absolute_into => Absolute;
    arccos, arccos_into => Arccos;
    arccosh, arccosh_into => Arccosh;
    arcsin, arcsin_into => Arcsin;
    arcsinh, arcsinh_into => Arcsinh;
    arctan, arctan_into => Arctan;
    arctanh, arctanh_into => Arctanh;
    cbrt, cbrt_into => Cbrt;
    ceil, ceil_into => Ceil;
    conjugate, conjugate_into => Conjugate;
    cos, cos_into => Cos;
    cosh, cosh_into => Cosh;
    deg2rad, deg2rad_into => Deg2rad;
    exp, exp_into => Exp;
    exp2, exp2_into => Exp2;
    expm1, expm1_into => Expm1;
    fabs, fabs_into => Fabs;
    floor, floor_into => Floor;
    invert, invert_into => Invert;
    isfinite, isfinite_into => Isfinite;
    isinf, isinf_into => Isinf;
    isnan, isnan_into => Isnan;
    log, log_into => Log;
    log10, log10_into => Log10;
    log1p, log1p_into => Log1p;
    log2, log2_into => Log2;
    logical_not, logical_not_into => LogicalNot;
    negative, negative_into => Negative;
    rad2deg, rad2deg_into => Rad2deg;
    reciprocal, reciprocal_into => Reciprocal;
    repvals, repvals_into => Repvals;
    rint, rint_into => Rint;
    sign, sign_into => Sign;
    signbit, signbit_into => Signbit;
    sin, sin_into => Sin;
    sinh, sinh_into => Sinh;
    spacing, spacing_into => Spacing;
    sqrt, sqrt_into => Sqrt;
    square, square_into => Square;
    tan, tan_into => Tan;
    tanh, tanh_into => Tanh;
    trunc, trunc_into => Trunc;

    abs, abs_into => Absolute;
    bitwise_not, bitwise_not_into => Invert;
    conj, conj_into => Conjugate;
    degrees, degrees_into => Rad2deg;
    radians, radians_into => Deg2rad;
}

binary_functions! {
    add, add_into => Add;
    arctan2, arctan2_into => Arctan2;
    bitwise_and, bitwise_and_into => BitwiseAnd;
    bitwise_or, bitwise_or_into => BitwiseOr;
    bitwise_xor, bitwise_xor_into => BitwiseXor;
    copysign, copysign_into => Copysign;
    divide, divide_into => Divide;
    equal, equal_into => Equal;
    floor_divide, floor_divide_into => FloorDivide;
    fmax, fmax_into => Fmax;
    fmin, fmin_into => Fmin;
    fmod, fmod_into => Fmod;
    greater, greater_into => Greater;
    greater_equal, greater_equal_into => GreaterEqual;
    hypot, hypot_into => Hypot;
    ldexp, ldexp_into => Ldexp;
    left_shift, left_shift_into => LeftShift;
    less, less_into => Less;
    less_equal, less_equal_into => LessEqual;
    logaddexp, logaddexp_into => Logaddexp;
    logaddexp2, logaddexp2_into => Logaddexp2;
    logical_and, logical_and_into => LogicalAnd;
    logical_or, logical_or_into => LogicalOr;
    logical_xor, logical_xor_into => LogicalXor;
    maximum, maximum_into => Maximum;
    minimum, minimum_into => Minimum;
    multiply, multiply_into => Multiply;
    nextafter, nextafter_into => Nextafter;
    not_equal, not_equal_into => NotEqual;
    power, power_into => Power;
    remainder, remainder_into => Remainder;
    right_shift, right_shift_into => RightShift;
    subtract, subtract_into => Subtract;
    true_divide, true_divide_into => TrueDivide;

    r#mod, mod_into => Remainder;
}

pub fn broadcast_to(x: &Value, shape: &Shape) -> Result<Value> {
    library_for(&[x])?.broadcast_to(x, shape)
}

pub fn cmask(x: &Value, welldefined: bool, finite: bool) -> Result<Value> {
    library_for(&[x])?.cmask(x, welldefined, finite)
}

pub fn get_dtype(x: &Value) -> Result<DType> {
    library_for(&[x])?.get_dtype(x)
}

pub fn get_size(x: &Value) -> Result<usize> {
    library_for(&[x])?.get_size(x)
}

pub fn shape(x: &Value) -> Result<Shape> {
    library_for(&[x])?.shape(x)
}

pub fn reshape(x: &Value, shape: &Shape) -> Result<Value> {
    library_for(&[x])?.reshape(x, shape)
}

/// Mantissa and exponent such that `x == mantissa * 2**exponent`.
pub fn frexp(x: &Value) -> Result<(Value, Value)> {
    library_for(&[x])?.frexp(x)
}

/// Fractional and integral parts, both carrying the sign of `x`.
pub fn modf(x: &Value) -> Result<(Value, Value)> {
    library_for(&[x])?.modf(x)
}
