use std::any::Any;
use std::fmt;

use mathlib_array::{DType, NdArray, Shape};

use crate::library::MathLibrary;
use crate::native::native_library;

/// A custom array-like type that carries its own math library.
///
/// Implementors advertise the library able to operate on them through
/// [`ArrayObject::library`]; provider resolution consults it whenever an
/// operand is not a plain [`NdArray`].
pub trait ArrayObject: fmt::Debug + Any + Send + Sync {
    /// The library this object advertises.
    fn library(&self) -> &'static dyn MathLibrary;

    /// Concrete type name used in error messages.
    fn type_name(&self) -> &'static str;

    fn clone_box(&self) -> Box<dyn ArrayObject>;

    /// Elementwise-identical comparison against another object.
    fn eq_object(&self, other: &dyn ArrayObject) -> bool;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An operand of a dispatched operation.
///
/// Plain numbers and arrays are [`Value::Array`] (scalars are
/// zero-dimensional arrays); anything else is a boxed [`ArrayObject`].
#[derive(Debug)]
pub enum Value {
    Array(NdArray),
    Object(Box<dyn ArrayObject>),
}

impl Value {
    pub fn object<T: ArrayObject>(obj: T) -> Self {
        Value::Object(Box::new(obj))
    }

    /// Whether this operand belongs to the plain numeric family.
    pub fn is_native(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Concrete type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Array(_) => "NdArray",
            Value::Object(obj) => obj.type_name(),
        }
    }

    /// The library this operand advertises; plain arrays use the native one.
    pub fn library(&self) -> &'static dyn MathLibrary {
        match self {
            Value::Array(_) => native_library(),
            Value::Object(obj) => obj.library(),
        }
    }

    /// The library an object operand advertises, if any.
    pub fn advertised_library(&self) -> Option<&'static dyn MathLibrary> {
        match self {
            Value::Array(_) => None,
            Value::Object(obj) => Some(obj.library()),
        }
    }

    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Value::Array(a) => Some(a),
            Value::Object(_) => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut NdArray> {
        match self {
            Value::Array(a) => Some(a),
            Value::Object(_) => None,
        }
    }

    pub fn into_array(self) -> Option<NdArray> {
        match self {
            Value::Array(a) => Some(a),
            Value::Object(_) => None,
        }
    }

    pub fn downcast_ref<T: ArrayObject>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.as_any().downcast_ref::<T>(),
            Value::Array(_) => None,
        }
    }

    pub fn downcast_mut<T: ArrayObject>(&mut self) -> Option<&mut T> {
        match self {
            Value::Object(obj) => obj.as_any_mut().downcast_mut::<T>(),
            Value::Array(_) => None,
        }
    }

    /// Shape of an array operand, without consulting any library.
    pub fn array_shape(&self) -> Option<&Shape> {
        self.as_array().map(NdArray::shape)
    }

    /// Dtype of an array operand, without consulting any library.
    pub fn array_dtype(&self) -> Option<DType> {
        self.as_array().map(NdArray::dtype)
    }

    /// `"<value> (<type>)"`, as used in resolution errors.
    pub(crate) fn describe(&self) -> String {
        format!("{} ({})", self, self.type_name())
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Array(a) => Value::Array(a.clone()),
            Value::Object(obj) => Value::Object(obj.clone_box()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.eq_object(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(a) => write!(f, "array(shape={}, dtype={})", a.shape(), a.dtype()),
            Value::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

impl From<NdArray> for Value {
    fn from(a: NdArray) -> Self {
        Value::Array(a)
    }
}

macro_rules! impl_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Array(NdArray::from(v))
                }
            }

            impl From<Vec<$t>> for Value {
                fn from(v: Vec<$t>) -> Self {
                    Value::Array(NdArray::from(v))
                }
            }
        )*
    };
}

impl_value_from!(bool, i64, half::f16, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_are_zero_dimensional() {
        let v = Value::from(2.5f64);
        assert!(v.is_native());
        assert_eq!(v.array_shape().unwrap().ndim(), 0);
        assert_eq!(v.array_dtype(), Some(DType::Float64));
    }

    #[test]
    fn test_vec_conversion() {
        let v = Value::from(vec![1i64, 2, 3]);
        assert_eq!(v.array_shape().unwrap().dims(), &[3]);
        assert_eq!(v.type_name(), "NdArray");
        assert!(v.advertised_library().is_none());
    }

    #[test]
    fn test_describe() {
        let v = Value::from(vec![1.0f32, 2.0]);
        assert_eq!(v.describe(), "array(shape=(2,), dtype=float32) (NdArray)");
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::from(vec![1.0f64, 2.0]), Value::from(vec![1.0f64, 2.0]));
        assert_ne!(Value::from(vec![1.0f64, 2.0]), Value::from(vec![1.0f32, 2.0]));
    }
}
