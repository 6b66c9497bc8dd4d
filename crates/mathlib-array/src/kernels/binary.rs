// Elementwise binary loops. Inputs arrive already cast to the loop dtypes
// and have equal lengths.

use super::float::{self, NextToward};
use super::BinaryOp;
use crate::dtype::DType;
use crate::error::{ArrayError, Result};
use crate::policy::Conditions;
use crate::storage::{Element, Storage};

pub(crate) fn float_binary<T: NextToward>(op: BinaryOp, x: T, y: T) -> T {
    match op {
        BinaryOp::Add => x + y,
        BinaryOp::Subtract => x - y,
        BinaryOp::Multiply => x * y,
        BinaryOp::Divide | BinaryOp::TrueDivide => x / y,
        BinaryOp::FloorDivide => float::floor_divide(x, y),
        BinaryOp::Remainder => float::remainder(x, y),
        BinaryOp::Fmod => x % y,
        BinaryOp::Power => x.powf(y),
        BinaryOp::Maximum => float::maximum(x, y),
        BinaryOp::Minimum => float::minimum(x, y),
        BinaryOp::Fmax => x.max(y),
        BinaryOp::Fmin => x.min(y),
        BinaryOp::Arctan2 => x.atan2(y),
        BinaryOp::Copysign => x.copysign(y),
        BinaryOp::Hypot => x.hypot(y),
        BinaryOp::Logaddexp => float::logaddexp(x, y),
        BinaryOp::Logaddexp2 => float::logaddexp2(x, y),
        BinaryOp::Nextafter => x.next_toward(y),
        // Comparisons, logical, bitwise and shift operations never select a
        // float loop; ldexp has its own mixed loop.
        _ => T::nan(),
    }
}

pub(crate) fn int_binary(op: BinaryOp, x: i64, y: i64, seen: &mut Conditions) -> Result<i64> {
    Ok(match op {
        BinaryOp::Add => x.wrapping_add(y),
        BinaryOp::Subtract => x.wrapping_sub(y),
        BinaryOp::Multiply => x.wrapping_mul(y),
        BinaryOp::Maximum | BinaryOp::Fmax => x.max(y),
        BinaryOp::Minimum | BinaryOp::Fmin => x.min(y),
        BinaryOp::BitwiseAnd => x & y,
        BinaryOp::BitwiseOr => x | y,
        BinaryOp::BitwiseXor => x ^ y,
        BinaryOp::LeftShift => {
            if (0..64).contains(&y) {
                x << y
            } else {
                0
            }
        }
        BinaryOp::RightShift => {
            if (0..64).contains(&y) {
                x >> y
            } else if x < 0 {
                -1
            } else {
                0
            }
        }
        BinaryOp::FloorDivide => {
            if y == 0 {
                seen.divide += 1;
                return Ok(0);
            }
            let q = x.wrapping_div(y);
            if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinaryOp::Remainder => {
            if y == 0 {
                seen.divide += 1;
                return Ok(0);
            }
            let r = x.wrapping_rem(y);
            if r != 0 && ((r < 0) != (y < 0)) {
                r + y
            } else {
                r
            }
        }
        BinaryOp::Fmod => {
            if y == 0 {
                seen.divide += 1;
                return Ok(0);
            }
            x.wrapping_rem(y)
        }
        BinaryOp::Power => {
            if y < 0 {
                return Err(ArrayError::Other(
                    "power: integers to negative integer powers are not allowed".to_string(),
                ));
            }
            x.wrapping_pow(u32::try_from(y).unwrap_or(u32::MAX))
        }
        other => {
            return Err(ArrayError::UnsupportedDType {
                op: other.name().to_string(),
                dtype: DType::Int64,
            })
        }
    })
}

pub(crate) fn bool_binary(op: BinaryOp, x: bool, y: bool) -> Result<bool> {
    match op {
        BinaryOp::Add
        | BinaryOp::Maximum
        | BinaryOp::Fmax
        | BinaryOp::BitwiseOr
        | BinaryOp::LogicalOr => Ok(x || y),
        BinaryOp::Multiply
        | BinaryOp::Minimum
        | BinaryOp::Fmin
        | BinaryOp::BitwiseAnd
        | BinaryOp::LogicalAnd => Ok(x && y),
        BinaryOp::BitwiseXor | BinaryOp::LogicalXor => Ok(x ^ y),
        other => Err(ArrayError::UnsupportedDType {
            op: other.name().to_string(),
            dtype: DType::Bool,
        }),
    }
}

pub(crate) fn compare<T: PartialOrd>(op: BinaryOp, x: T, y: T) -> bool {
    match op {
        BinaryOp::Equal => x == y,
        BinaryOp::NotEqual => x != y,
        BinaryOp::Less => x < y,
        BinaryOp::LessEqual => x <= y,
        BinaryOp::Greater => x > y,
        BinaryOp::GreaterEqual => x >= y,
        _ => false,
    }
}

fn zip_float<T: NextToward + Element>(
    op: BinaryOp,
    x: &[T],
    y: &[T],
    seen: &mut Conditions,
) -> Vec<T> {
    x.iter()
        .zip(y)
        .map(|(&a, &b)| {
            let r = float_binary(op, a, b);
            seen.note(&[a, b], r);
            r
        })
        .collect()
}

fn zip_ldexp<T: NextToward + Element>(x: &[T], n: &[i64], seen: &mut Conditions) -> Vec<T> {
    x.iter()
        .zip(n)
        .map(|(&a, &e)| {
            let r = float::ldexp(a, e);
            seen.note(&[a], r);
            r
        })
        .collect()
}

fn zip_compare<T: Element + PartialOrd>(op: BinaryOp, x: &[T], y: &[T]) -> Vec<bool> {
    x.iter().zip(y).map(|(&a, &b)| compare(op, a, b)).collect()
}

fn mismatch(op: BinaryOp, x: &Storage, y: &Storage) -> ArrayError {
    ArrayError::Other(format!(
        "{}: no loop for dtypes ({}, {})",
        op.name(),
        x.dtype(),
        y.dtype()
    ))
}

/// Run `op` over storages already cast to the loop dtypes.
pub(crate) fn apply(
    op: BinaryOp,
    x: &Storage,
    y: &Storage,
    seen: &mut Conditions,
) -> Result<Storage> {
    if x.len() != y.len() {
        return Err(ArrayError::ShapeMismatch {
            expected: vec![x.len()],
            got: vec![y.len()],
        });
    }

    if op.is_comparison() {
        let out = match (x, y) {
            (Storage::Bool(a), Storage::Bool(b)) => zip_compare(op, a, b),
            (Storage::Int64(a), Storage::Int64(b)) => zip_compare(op, a, b),
            (Storage::Float16(a), Storage::Float16(b)) => zip_compare(op, a, b),
            (Storage::Float32(a), Storage::Float32(b)) => zip_compare(op, a, b),
            (Storage::Float64(a), Storage::Float64(b)) => zip_compare(op, a, b),
            _ => return Err(mismatch(op, x, y)),
        };
        return Ok(Storage::Bool(out));
    }

    if op == BinaryOp::Ldexp {
        let n = y.typed::<i64>(op.name())?;
        return Ok(match x {
            Storage::Float16(a) => Storage::Float16(zip_ldexp(a, n, seen)),
            Storage::Float32(a) => Storage::Float32(zip_ldexp(a, n, seen)),
            Storage::Float64(a) => Storage::Float64(zip_ldexp(a, n, seen)),
            _ => return Err(mismatch(op, x, y)),
        });
    }

    Ok(match (x, y) {
        (Storage::Float16(a), Storage::Float16(b)) => Storage::Float16(zip_float(op, a, b, seen)),
        (Storage::Float32(a), Storage::Float32(b)) => Storage::Float32(zip_float(op, a, b, seen)),
        (Storage::Float64(a), Storage::Float64(b)) => Storage::Float64(zip_float(op, a, b, seen)),
        (Storage::Int64(a), Storage::Int64(b)) => Storage::Int64(
            a.iter()
                .zip(b)
                .map(|(&p, &q)| int_binary(op, p, q, seen))
                .collect::<Result<Vec<_>>>()?,
        ),
        (Storage::Bool(a), Storage::Bool(b)) => Storage::Bool(
            a.iter()
                .zip(b)
                .map(|(&p, &q)| bool_binary(op, p, q))
                .collect::<Result<Vec<_>>>()?,
        ),
        _ => return Err(mismatch(op, x, y)),
    })
}
