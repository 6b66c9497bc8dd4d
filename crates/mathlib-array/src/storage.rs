use half::f16;

use crate::dtype::DType;
use crate::error::{ArrayError, Result};

/// Contiguous, row-major element storage. One variant per [`DType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Runs `$body` with `$v` bound to the typed vector inside a [`Storage`].
#[macro_export]
macro_rules! with_storage {
    ($storage:expr, $v:ident => $body:expr) => {
        match $storage {
            $crate::Storage::Bool($v) => $body,
            $crate::Storage::Int64($v) => $body,
            $crate::Storage::Float16($v) => $body,
            $crate::Storage::Float32($v) => $body,
            $crate::Storage::Float64($v) => $body,
        }
    };
}

/// A scalar type that can live in a [`Storage`].
///
/// Conversions between element types follow C/numpy `astype` semantics:
/// floats truncate toward zero when converted to integers, and any nonzero
/// value converts to `true`.
pub trait Element: Copy + std::fmt::Debug + PartialEq + Send + Sync + 'static {
    const DTYPE: DType;

    fn slice(storage: &Storage) -> Option<&[Self]>;
    fn slice_mut(storage: &mut Storage) -> Option<&mut [Self]>;
    fn into_storage(data: Vec<Self>) -> Storage;

    fn to_f64(self) -> f64;
    fn to_i64(self) -> i64;
    fn is_nonzero(self) -> bool;

    fn from_element<T: Element>(value: T) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident, to_f64: |$a:ident| $to_f64:expr, to_i64: |$b:ident| $to_i64:expr, from: |$c:ident| $from:expr) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn slice(storage: &Storage) -> Option<&[Self]> {
                match storage {
                    Storage::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(storage: &mut Storage) -> Option<&mut [Self]> {
                match storage {
                    Storage::$variant(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }

            fn into_storage(data: Vec<Self>) -> Storage {
                Storage::$variant(data)
            }

            fn to_f64(self) -> f64 {
                let $a = self;
                $to_f64
            }

            fn to_i64(self) -> i64 {
                let $b = self;
                $to_i64
            }

            fn is_nonzero(self) -> bool {
                self.to_f64() != 0.0
            }

            fn from_element<T: Element>(value: T) -> Self {
                let $c = value;
                $from
            }
        }
    };
}

impl_element!(bool, Bool,
    to_f64: |v| if v { 1.0 } else { 0.0 },
    to_i64: |v| v as i64,
    from: |v| v.is_nonzero());
impl_element!(i64, Int64,
    to_f64: |v| v as f64,
    to_i64: |v| v,
    from: |v| v.to_i64());
impl_element!(f16, Float16,
    to_f64: |v| v.to_f64(),
    to_i64: |v| v.to_f64() as i64,
    from: |v| f16::from_f64(v.to_f64()));
impl_element!(f32, Float32,
    to_f64: |v| v as f64,
    to_i64: |v| v as i64,
    from: |v| v.to_f64() as f32);
impl_element!(f64, Float64,
    to_f64: |v| v,
    to_i64: |v| v as i64,
    from: |v| v.to_f64());

fn convert<T: Element, U: Element>(data: &[T]) -> Vec<U> {
    data.iter().map(|&v| U::from_element(v)).collect()
}

impl Storage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        with_storage!(self, v => v.len())
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            Storage::Bool(_) => DType::Bool,
            Storage::Int64(_) => DType::Int64,
            Storage::Float16(_) => DType::Float16,
            Storage::Float32(_) => DType::Float32,
            Storage::Float64(_) => DType::Float64,
        }
    }

    /// Create zero-filled storage for the given dtype and element count.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::Bool => Storage::Bool(vec![false; n]),
            DType::Int64 => Storage::Int64(vec![0; n]),
            DType::Float16 => Storage::Float16(vec![f16::ZERO; n]),
            DType::Float32 => Storage::Float32(vec![0.0; n]),
            DType::Float64 => Storage::Float64(vec![0.0; n]),
        }
    }

    /// Create storage from a typed vector.
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        T::into_storage(data)
    }

    /// Typed view of the elements, or `None` if `T` is not this storage's type.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Mutable typed view of the elements.
    pub fn as_mut_slice<T: Element>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(self)
    }

    /// Typed view, failing with `UnsupportedDType` on a type mismatch.
    pub fn typed<T: Element>(&self, op: &str) -> Result<&[T]> {
        T::slice(self).ok_or_else(|| ArrayError::UnsupportedDType {
            op: op.to_string(),
            dtype: self.dtype(),
        })
    }

    /// Element `i` converted to f64.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    pub fn get_f64(&self, i: usize) -> f64 {
        with_storage!(self, v => v[i].to_f64())
    }

    /// Convert every element to `dtype`. Returns a clone when the dtype
    /// already matches.
    pub fn cast(&self, dtype: DType) -> Storage {
        if self.dtype() == dtype {
            return self.clone();
        }
        with_storage!(self, v => match dtype {
            DType::Bool => Storage::Bool(convert(v)),
            DType::Int64 => Storage::Int64(convert(v)),
            DType::Float16 => Storage::Float16(convert(v)),
            DType::Float32 => Storage::Float32(convert(v)),
            DType::Float64 => Storage::Float64(convert(v)),
        })
    }

    /// Copy elements from `src` into `self`, converting to this storage's
    /// dtype. Lengths must match.
    pub fn assign_from(&mut self, src: &Storage) -> Result<()> {
        if self.len() != src.len() {
            return Err(ArrayError::ShapeMismatch {
                expected: vec![self.len()],
                got: vec![src.len()],
            });
        }
        let converted = src.cast(self.dtype());
        with_storage!(self, dst => copy_into(dst, &converted))
    }

    /// Build new storage by reading `self` at each of `indices`.
    pub(crate) fn gather(&self, indices: &[usize]) -> Storage {
        with_storage!(self, v => {
            Storage::from_vec(indices.iter().map(|&i| v[i]).collect::<Vec<_>>())
        })
    }
}

/// Overwrite `dst` in place with the same-typed elements of `src`.
fn copy_into<T: Element>(dst: &mut [T], src: &Storage) -> Result<()> {
    let src = T::slice(src).ok_or_else(|| ArrayError::CastError {
        from: src.dtype(),
        to: T::DTYPE,
    })?;
    dst.copy_from_slice(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec() {
        let s = Storage::from_vec(vec![1.0f32, 2.0, 3.0]);
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.dtype(), DType::Float32);
        assert_eq!(s.as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0]);
        assert!(s.as_slice::<f64>().is_none());
    }

    #[test]
    fn test_zeros() {
        for dtype in DType::ALL {
            let s = Storage::zeros(dtype, 4);
            assert_eq!(s.len(), 4);
            assert_eq!(s.dtype(), dtype);
            assert_eq!(s.get_f64(3), 0.0);
        }
    }

    #[test]
    fn test_cast_float_to_int_truncates() {
        let s = Storage::from_vec(vec![1.7f64, -2.9, 0.0]);
        let c = s.cast(DType::Int64);
        assert_eq!(c.as_slice::<i64>().unwrap(), &[1, -2, 0]);
    }

    #[test]
    fn test_cast_to_bool() {
        let s = Storage::from_vec(vec![0i64, 3, -1]);
        let c = s.cast(DType::Bool);
        assert_eq!(c.as_slice::<bool>().unwrap(), &[false, true, true]);

        let f = Storage::from_vec(vec![0.0f64, 0.25, f64::NAN]);
        let c = f.cast(DType::Bool);
        assert_eq!(c.as_slice::<bool>().unwrap(), &[false, true, true]);
    }

    #[test]
    fn test_cast_half() {
        let s = Storage::from_vec(vec![true, false]);
        let c = s.cast(DType::Float16);
        assert_eq!(
            c.as_slice::<f16>().unwrap(),
            &[f16::from_f32(1.0), f16::ZERO]
        );
    }

    #[test]
    fn test_mut_slice() {
        let mut s = Storage::from_vec(vec![1i64, 2]);
        let slice = s.as_mut_slice::<i64>().unwrap();
        slice[0] = 42;
        assert_eq!(s.as_slice::<i64>().unwrap()[0], 42);
    }

    #[test]
    fn test_assign_from_converts() {
        let mut dst = Storage::zeros(DType::Float64, 2);
        dst.assign_from(&Storage::from_vec(vec![3i64, 4])).unwrap();
        assert_eq!(dst.as_slice::<f64>().unwrap(), &[3.0, 4.0]);
        assert!(dst.assign_from(&Storage::zeros(DType::Bool, 3)).is_err());
    }

    #[test]
    fn test_gather() {
        let s = Storage::from_vec(vec![10i64, 20, 30]);
        let g = s.gather(&[2, 0, 0]);
        assert_eq!(g.as_slice::<i64>().unwrap(), &[30, 10, 10]);
    }
}
