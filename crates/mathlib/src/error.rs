use mathlib_array::ArrayError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("{op}: shape mismatch: objects cannot be broadcast to a single shape: {shapes:?}")]
    ShapeMismatch { op: String, shapes: Vec<Vec<usize>> },
    #[error("cannot identify math function library for input(s): {}", .operands.join(", "))]
    NoLibrary { operands: Vec<String> },
    #[error("{op}: output parameter must have final broadcasted shape {expected:?}, got {got:?}")]
    OutputShape {
        op: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("math function \"{op}\" not implemented for objects of type \"{type_name}\" in {library}")]
    NotImplemented {
        op: String,
        type_name: String,
        library: String,
    },
    #[error("math function \"{op}\" does not have the {expected} calling convention")]
    WrongSignature { op: String, expected: String },
    #[error("cannot treat {0} as a data array")]
    NotArray(String),
    #[error(transparent)]
    Array(#[from] ArrayError),
}

pub type Result<T> = std::result::Result<T, MathError>;
