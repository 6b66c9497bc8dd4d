// Elementwise unary loops. Inputs arrive already cast to the loop dtype.

use super::float::{self, NextToward};
use super::UnaryOp;
use crate::error::{ArrayError, Result};
use crate::policy::Conditions;
use crate::storage::{Element, Storage};

pub(crate) fn float_unary<T: NextToward>(op: UnaryOp, x: T) -> T {
    match op {
        UnaryOp::Absolute | UnaryOp::Fabs => x.abs(),
        UnaryOp::Arccos => x.acos(),
        UnaryOp::Arccosh => x.acosh(),
        UnaryOp::Arcsin => x.asin(),
        UnaryOp::Arcsinh => x.asinh(),
        UnaryOp::Arctan => x.atan(),
        UnaryOp::Arctanh => x.atanh(),
        UnaryOp::Cbrt => x.cbrt(),
        UnaryOp::Ceil => x.ceil(),
        UnaryOp::Conjugate | UnaryOp::Repvals => x,
        UnaryOp::Cos => x.cos(),
        UnaryOp::Cosh => x.cosh(),
        UnaryOp::Deg2rad => x.to_radians(),
        UnaryOp::Exp => x.exp(),
        UnaryOp::Exp2 => x.exp2(),
        UnaryOp::Expm1 => x.exp_m1(),
        UnaryOp::Floor => x.floor(),
        UnaryOp::Log => x.ln(),
        UnaryOp::Log10 => x.log10(),
        UnaryOp::Log1p => x.ln_1p(),
        UnaryOp::Log2 => x.log2(),
        UnaryOp::Negative => -x,
        UnaryOp::Rad2deg => x.to_degrees(),
        UnaryOp::Reciprocal => x.recip(),
        UnaryOp::Rint => float::rint(x),
        UnaryOp::Sign => float::sign(x),
        UnaryOp::Sin => x.sin(),
        UnaryOp::Sinh => x.sinh(),
        UnaryOp::Spacing => float::spacing(x),
        UnaryOp::Sqrt => x.sqrt(),
        UnaryOp::Square => x * x,
        UnaryOp::Tan => x.tan(),
        UnaryOp::Tanh => x.tanh(),
        UnaryOp::Trunc => x.trunc(),
        // Predicates and bit operations never select a float loop.
        UnaryOp::Invert
        | UnaryOp::Isfinite
        | UnaryOp::Isinf
        | UnaryOp::Isnan
        | UnaryOp::LogicalNot
        | UnaryOp::Signbit => T::nan(),
    }
}

pub(crate) fn int_unary(op: UnaryOp, x: i64, seen: &mut Conditions) -> Result<i64> {
    Ok(match op {
        UnaryOp::Absolute => x.wrapping_abs(),
        UnaryOp::Conjugate | UnaryOp::Repvals => x,
        UnaryOp::Invert => !x,
        UnaryOp::Negative => x.wrapping_neg(),
        UnaryOp::Sign => x.signum(),
        UnaryOp::Square => x.wrapping_mul(x),
        UnaryOp::Reciprocal => {
            if x == 0 {
                seen.divide += 1;
                0
            } else {
                1i64.wrapping_div(x)
            }
        }
        other => return Err(unsupported(other, crate::DType::Int64)),
    })
}

pub(crate) fn bool_unary(op: UnaryOp, x: bool) -> Result<bool> {
    match op {
        UnaryOp::Absolute | UnaryOp::Conjugate | UnaryOp::Repvals => Ok(x),
        UnaryOp::Invert | UnaryOp::LogicalNot => Ok(!x),
        other => Err(unsupported(other, crate::DType::Bool)),
    }
}

/// Boolean-valued tests, valid on every dtype.
pub(crate) fn predicate<T: Element>(op: UnaryOp, x: T) -> bool {
    let v = x.to_f64();
    match op {
        UnaryOp::Isfinite => v.is_finite(),
        UnaryOp::Isinf => v.is_infinite(),
        UnaryOp::Isnan => v.is_nan(),
        UnaryOp::Signbit => v.is_sign_negative(),
        UnaryOp::LogicalNot => !x.is_nonzero(),
        _ => false,
    }
}

fn unsupported(op: UnaryOp, dtype: crate::DType) -> ArrayError {
    ArrayError::UnsupportedDType {
        op: op.name().to_string(),
        dtype,
    }
}

fn map_float<T: NextToward + Element>(op: UnaryOp, x: &[T], seen: &mut Conditions) -> Vec<T> {
    x.iter()
        .map(|&v| {
            let r = float_unary(op, v);
            seen.note(&[v], r);
            r
        })
        .collect()
}

/// Run `op` over storage already in the loop dtype.
pub(crate) fn apply(op: UnaryOp, x: &Storage, seen: &mut Conditions) -> Result<Storage> {
    if op.is_predicate() {
        let out: Vec<bool> = crate::with_storage!(x, v => v.iter().map(|&e| predicate(op, e)).collect());
        return Ok(Storage::Bool(out));
    }
    Ok(match x {
        Storage::Float16(v) => Storage::Float16(map_float(op, v, seen)),
        Storage::Float32(v) => Storage::Float32(map_float(op, v, seen)),
        Storage::Float64(v) => Storage::Float64(map_float(op, v, seen)),
        Storage::Int64(v) => Storage::Int64(
            v.iter()
                .map(|&e| int_unary(op, e, seen))
                .collect::<Result<Vec<_>>>()?,
        ),
        Storage::Bool(v) => Storage::Bool(
            v.iter()
                .map(|&e| bool_unary(op, e))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}
