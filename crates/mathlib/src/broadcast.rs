use mathlib_array::{ArrayError, Shape};

use crate::error::{MathError, Result};

/// Shape that `shapes` broadcast to, under numpy rules.
///
/// Shorter shapes are padded on the left with 1s; at each position the
/// result is 1 only when every input is 1, otherwise the unique non-1 size.
/// A disagreement between two non-1 sizes fails with
/// [`MathError::ShapeMismatch`] naming `op`.
pub fn broadcast_shapes(op: &str, shapes: &[&Shape]) -> Result<Shape> {
    Shape::broadcast_shapes(shapes).map_err(|e| match e {
        ArrayError::BroadcastError { shapes } => MathError::ShapeMismatch {
            op: op.to_string(),
            shapes,
        },
        other => MathError::Array(other),
    })
}
