use crate::error::{ArrayError, Result};
use std::fmt;

/// An array shape, wrapping a vector of dimension sizes.
///
/// The empty shape `()` describes a zero-dimensional (scalar) array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// The zero-dimensional shape `()`.
    pub fn scalar() -> Self {
        Shape { dims: Vec::new() }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Returns true for the zero-dimensional shape.
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Computes row-major contiguous strides for this shape.
    ///
    /// For a shape [d0, d1, d2], the strides are [d1*d2, d2, 1].
    pub fn strides(&self) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        let mut strides = vec![0usize; self.dims.len()];
        strides[self.dims.len() - 1] = 1;
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }


    /// Compute the broadcast shape of `a` and `b` using numpy-style broadcasting rules.
    pub fn broadcast_shape(a: &Shape, b: &Shape) -> Result<Shape> {
        Shape::broadcast_shapes(&[a, b])
    }

    /// Compute the shape that any number of shapes mutually broadcast to.
    ///
    /// Rules:
    /// 1. Shorter shapes are padded with ones on the left until every shape
    ///    has the same number of dimensions.
    /// 2. At each position the result is 1 if every input is 1, otherwise it
    ///    is the single size among the inputs that are not 1. Two different
    ///    non-1 sizes at the same position are an error.
    ///
    /// An empty slice broadcasts to the zero-dimensional shape.
    pub fn broadcast_shapes(shapes: &[&Shape]) -> Result<Shape> {
        let max_ndim = shapes.iter().map(|s| s.ndim()).max().unwrap_or(0);
        let mut result = vec![1usize; max_ndim];

        for shape in shapes {
            let pad = max_ndim - shape.ndim();
            for (i, &d) in shape.dims.iter().enumerate() {
                let slot = &mut result[pad + i];
                if d == 1 {
                    continue;
                }
                if *slot == 1 {
                    *slot = d;
                } else if *slot != d {
                    return Err(ArrayError::BroadcastError {
                        shapes: shapes.iter().map(|s| s.dims.clone()).collect(),
                    });
                }
            }
        }

        Ok(Shape::new(result))
    }

    /// Strides for reading an array of this shape as if it had shape
    /// `target`: broadcast (padded or size-1) dimensions get stride 0.
    ///
    /// The caller must have checked that `self` broadcasts to `target`.
    pub(crate) fn broadcast_strides(&self, target: &Shape) -> Vec<usize> {
        let own = self.strides();
        let pad = target.ndim() - self.ndim();
        let mut strides = vec![0usize; target.ndim()];
        for i in 0..self.ndim() {
            if self.dims[i] != 1 {
                strides[pad + i] = own[i];
            }
        }
        strides
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::new(dims.to_vec())
    }
}
