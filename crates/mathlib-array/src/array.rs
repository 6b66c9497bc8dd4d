use crate::dtype::DType;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;
use crate::storage::{Element, Storage};

/// An N-dimensional numeric array.
///
/// Holds contiguous, row-major elements of a single [`DType`] with an
/// associated shape. A zero-dimensional array (shape `()`) holds exactly one
/// element and stands in for a plain scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    storage: Storage,
    shape: Shape,
}

impl NdArray {
    /// Create a new array from typed data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new<T: Element>(data: Vec<T>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        NdArray {
            storage: Storage::from_vec(data),
            shape,
        }
    }

    /// A one-dimensional array holding `data`.
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        let shape = Shape::new(vec![data.len()]);
        NdArray {
            storage: Storage::from_vec(data),
            shape,
        }
    }

    /// A zero-dimensional array holding `value`.
    pub fn scalar<T: Element>(value: T) -> Self {
        NdArray {
            storage: Storage::from_vec(vec![value]),
            shape: Shape::scalar(),
        }
    }

    /// Allocate an array of the given shape and dtype. Elements are zeroed.
    pub fn empty(shape: Shape, dtype: DType) -> Self {
        NdArray {
            storage: Storage::zeros(dtype, shape.numel()),
            shape,
        }
    }

    /// Create a zero-filled f64 array with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        NdArray::empty(shape, DType::Float64)
    }

    /// Returns a reference to the array's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the array's element type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// Returns the underlying storage reference.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Typed view of the elements, or `None` if `T` does not match the dtype.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        self.storage.as_slice()
    }

    pub fn as_mut_slice<T: Element>(&mut self) -> Option<&mut [T]> {
        self.storage.as_mut_slice()
    }

    /// Element at flat (row-major) index `i`, converted to f64.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        if i < self.size() {
            Some(self.storage.get_f64(i))
        } else {
            None
        }
    }

    /// All elements converted to f64.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.storage.get_f64(i)).collect()
    }

    /// Reshape the array, returning a new array with the same data but
    /// a different shape.
    ///
    /// The total number of elements must remain the same.
    pub fn reshape(&self, new_shape: Shape) -> Result<NdArray> {
        let mut copy = self.clone();
        copy.reshape_in_place(new_shape)?;
        Ok(copy)
    }

    /// Reinterpret the array with a new shape without touching the data.
    pub fn reshape_in_place(&mut self, new_shape: Shape) -> Result<()> {
        if self.shape.numel() != new_shape.numel() {
            return Err(ArrayError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: new_shape.dims().to_vec(),
            });
        }
        self.shape = new_shape;
        Ok(())
    }

    /// Materialize this array broadcast up to `target`.
    ///
    /// Fails unless broadcasting `self.shape()` with `target` yields exactly
    /// `target`.
    pub fn broadcast_to(&self, target: &Shape) -> Result<NdArray> {
        let compatible = target.ndim() >= self.ndim()
            && Shape::broadcast_shape(&self.shape, target)
                .map(|s| &s == target)
                .unwrap_or(false);
        if !compatible {
            return Err(ArrayError::BroadcastTo {
                from: self.shape.dims().to_vec(),
                to: target.dims().to_vec(),
            });
        }
        if &self.shape == target {
            return Ok(self.clone());
        }

        let src_strides = self.shape.broadcast_strides(target);
        let dims = target.dims();
        let mut index = vec![0usize; dims.len()];
        let mut offsets = Vec::with_capacity(target.numel());

        for _ in 0..target.numel() {
            offsets.push(
                index
                    .iter()
                    .zip(&src_strides)
                    .map(|(i, s)| i * s)
                    .sum::<usize>(),
            );
            // Advance the row-major multi-index.
            for axis in (0..dims.len()).rev() {
                index[axis] += 1;
                if index[axis] < dims[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }

        Ok(NdArray {
            storage: self.storage.gather(&offsets),
            shape: target.clone(),
        })
    }

    /// A copy of this array converted to `dtype`.
    pub fn astype(&self, dtype: DType) -> NdArray {
        NdArray {
            storage: self.storage.cast(dtype),
            shape: self.shape.clone(),
        }
    }

    /// Write this array's elements into `out`, converting to `out`'s dtype.
    ///
    /// Shapes must be equal and the conversion must be allowed under the
    /// `same_kind` rule. Nothing is written on failure.
    pub fn cast_into(&self, out: &mut NdArray) -> Result<()> {
        if self.shape != out.shape {
            return Err(ArrayError::ShapeMismatch {
                expected: out.shape.dims().to_vec(),
                got: self.shape.dims().to_vec(),
            });
        }
        if !DType::can_cast_same_kind(self.dtype(), out.dtype()) {
            return Err(ArrayError::CastError {
                from: self.dtype(),
                to: out.dtype(),
            });
        }
        out.storage.assign_from(&self.storage)
    }
}

macro_rules! impl_from_element {
    ($($t:ty),*) => {
        $(
            impl From<$t> for NdArray {
                fn from(value: $t) -> Self {
                    NdArray::scalar(value)
                }
            }

            impl From<Vec<$t>> for NdArray {
                fn from(data: Vec<$t>) -> Self {
                    NdArray::from_vec(data)
                }
            }
        )*
    };
}

impl_from_element!(bool, i64, half::f16, f32, f64);
