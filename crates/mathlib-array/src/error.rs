use thiserror::Error;

use crate::dtype::DType;

/// Floating point conditions tracked by a [`NumericErrorPolicy`](crate::NumericErrorPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatCondition {
    DivideByZero,
    Invalid,
    Overflow,
}

impl std::fmt::Display for FloatCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloatCondition::DivideByZero => f.write_str("divide by zero"),
            FloatCondition::Invalid => f.write_str("invalid value"),
            FloatCondition::Overflow => f.write_str("overflow"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArrayError {
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("shape mismatch: objects cannot be broadcast to a single shape: {shapes:?}")]
    BroadcastError { shapes: Vec<Vec<usize>> },
    #[error("cannot broadcast array of shape {from:?} to shape {to:?}")]
    BroadcastTo { from: Vec<usize>, to: Vec<usize> },
    #[error("{op}: unsupported dtype {dtype}")]
    UnsupportedDType { op: String, dtype: DType },
    #[error("cannot cast {from} to {to} under the same_kind rule")]
    CastError { from: DType, to: DType },
    #[error("{op}: {kind} encountered")]
    FloatingPoint { op: String, kind: FloatCondition },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ArrayError>;
