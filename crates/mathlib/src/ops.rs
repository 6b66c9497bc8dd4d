//! Operator delegation for [`Value`].
//!
//! Every operator routes through provider resolution to the corresponding
//! common-interface operation, so `&a + &b` is `add(a, b)` on whichever
//! library accepts both operands. Operators return `Result<Value>`.
//!
//! ```
//! use mathlib::Value;
//!
//! let a = Value::from(vec![1.0f64, 2.0]);
//! let b = Value::from(10.0f64);
//! let c = (&a + &b).unwrap();
//! assert_eq!(c, Value::from(vec![11.0f64, 12.0]));
//! ```

use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Shl, Shr, Sub};

use crate::dispatch::{binary, binary_into, unary};
use crate::error::{MathError, Result};
use crate::library::MathLibrary;
use crate::registry::Op;
use crate::resolve::library_for;
use crate::value::Value;

macro_rules! binary_operator {
    ($($trait:ident, $method:ident => $op:ident;)*) => {
        $(
            impl $trait<&Value> for &Value {
                type Output = Result<Value>;

                fn $method(self, rhs: &Value) -> Self::Output {
                    binary(Op::$op, self, rhs)
                }
            }

            impl $trait for Value {
                type Output = Result<Value>;

                fn $method(self, rhs: Value) -> Self::Output {
                    binary(Op::$op, &self, &rhs)
                }
            }
        )*
    };
}

binary_operator! {
    Add, add => Add;
    Sub, sub => Subtract;
    Mul, mul => Multiply;
    Div, div => TrueDivide;
    Rem, rem => Remainder;
    BitAnd, bitand => BitwiseAnd;
    BitOr, bitor => BitwiseOr;
    BitXor, bitxor => BitwiseXor;
    Shl, shl => LeftShift;
    Shr, shr => RightShift;
}

impl Neg for &Value {
    type Output = Result<Value>;

    fn neg(self) -> Self::Output {
        unary(Op::Negative, self)
    }
}

impl Neg for Value {
    type Output = Result<Value>;

    fn neg(self) -> Self::Output {
        unary(Op::Negative, &self)
    }
}

/// Bitwise inversion (logical not for booleans).
impl Not for &Value {
    type Output = Result<Value>;

    fn not(self) -> Self::Output {
        unary(Op::Invert, self)
    }
}

impl Not for Value {
    type Output = Result<Value>;

    fn not(self) -> Self::Output {
        unary(Op::Invert, &self)
    }
}

macro_rules! named_binary {
    ($($method:ident, $reflected:ident, $in_place:ident => $op:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($op), "(self, other)`.")]
            pub fn $method(&self, other: &Value) -> Result<Value> {
                binary(Op::$op, self, other)
            }

            #[doc = concat!("Reflected form: `", stringify!($op), "(other, self)`.")]
            pub fn $reflected(&self, other: &Value) -> Result<Value> {
                binary(Op::$op, other, self)
            }

            #[doc = concat!("In-place form: `", stringify!($op), "(self, other, out=self)`.")]
            pub fn $in_place(&mut self, other: &Value) -> Result<&mut Value> {
                self.binary_in_place(Op::$op, other)
            }
        )*
    };
}

impl Value {
    /// Compute `op(self, other)` into `self`'s own buffer and return it.
    ///
    /// The left operand is read from a snapshot taken before the call, so
    /// evaluation sees the original values even though `self` is also the
    /// output.
    pub fn binary_in_place(&mut self, op: Op, other: &Value) -> Result<&mut Value> {
        let lhs = self.clone();
        binary_into(op, &lhs, other, self)
    }

    named_binary! {
        add_value, radd, add_assign_value => Add;
        sub_value, rsub, sub_assign_value => Subtract;
        mul_value, rmul, mul_assign_value => Multiply;
        div_value, rdiv, div_assign_value => Divide;
        true_div, rtrue_div, true_div_assign_value => TrueDivide;
        floor_div, rfloor_div, floor_div_assign_value => FloorDivide;
        rem_value, rrem, rem_assign_value => Remainder;
        shl_value, rshl, shl_assign_value => LeftShift;
        shr_value, rshr, shr_assign_value => RightShift;
        bitand_value, rbitand, bitand_assign_value => BitwiseAnd;
        bitor_value, rbitor, bitor_assign_value => BitwiseOr;
        bitxor_value, rbitxor, bitxor_assign_value => BitwiseXor;
    }

    /// Elementwise `self < other`.
    pub fn lt(&self, other: &Value) -> Result<Value> {
        binary(Op::Less, self, other)
    }

    /// Elementwise `self <= other`.
    pub fn le(&self, other: &Value) -> Result<Value> {
        binary(Op::LessEqual, self, other)
    }

    /// Elementwise `self == other`.
    pub fn eq_elem(&self, other: &Value) -> Result<Value> {
        binary(Op::Equal, self, other)
    }

    /// Elementwise `self != other`.
    pub fn ne_elem(&self, other: &Value) -> Result<Value> {
        binary(Op::NotEqual, self, other)
    }

    /// Elementwise `self > other`.
    pub fn gt(&self, other: &Value) -> Result<Value> {
        binary(Op::Greater, self, other)
    }

    /// Elementwise `self >= other`.
    pub fn ge(&self, other: &Value) -> Result<Value> {
        binary(Op::GreaterEqual, self, other)
    }

    /// `power(self, other)`.
    pub fn pow(&self, other: &Value) -> Result<Value> {
        binary(Op::Power, self, other)
    }

    /// Reflected form: `power(other, self)`.
    ///
    /// Unlike the other reflected forms, the library is resolved with `self`
    /// first.
    pub fn rpow(&self, other: &Value) -> Result<Value> {
        let library: &dyn MathLibrary = library_for(&[self, other])?;
        library.binary(Op::Power, other, self)
    }

    /// In-place form: `power(self, other, out=self)`.
    pub fn pow_assign_value(&mut self, other: &Value) -> Result<&mut Value> {
        self.binary_in_place(Op::Power, other)
    }

    pub fn abs(&self) -> Result<Value> {
        unary(Op::Absolute, self)
    }

    /// Three-argument `pow` with a modulus is not supported.
    pub fn pow_mod(&self, other: &Value, modulo: Option<&Value>) -> Result<Value> {
        if modulo.is_some() {
            return Err(MathError::NotImplemented {
                op: "power with modulo".to_string(),
                type_name: self.type_name().to_string(),
                library: self.library().name().to_string(),
            });
        }
        self.pow(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayObject;
    use mathlib_array::{NdArray, Shape};
    use std::any::Any;

    /// Two object families whose libraries both accept either family and
    /// answer every binary call with their own tag.
    #[derive(Debug)]
    struct Tagging(i64);

    static FIRST: Tagging = Tagging(1);
    static SECOND: Tagging = Tagging(2);

    impl MathLibrary for Tagging {
        fn name(&self) -> &'static str {
            "Tagging"
        }

        fn accepts(&self, x: &Value) -> bool {
            x.downcast_ref::<Tagged>().is_some()
        }

        fn binary(&self, _op: Op, _x: &Value, _y: &Value) -> Result<Value> {
            Ok(Value::from(self.0))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Tagged(&'static Tagging);

    impl ArrayObject for Tagged {
        fn library(&self) -> &'static dyn MathLibrary {
            self.0
        }

        fn type_name(&self) -> &'static str {
            "Tagged"
        }

        fn clone_box(&self) -> Box<dyn ArrayObject> {
            Box::new(self.clone())
        }

        fn eq_object(&self, other: &dyn ArrayObject) -> bool {
            other.as_any().downcast_ref::<Tagged>().is_some_and(|o| o == self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl PartialEq for Tagging {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }

    #[test]
    fn test_arithmetic_operators() {
        let a = Value::from(vec![6i64, 7]);
        let b = Value::from(vec![4i64, 2]);
        assert_eq!((&a + &b).unwrap(), Value::from(vec![10i64, 9]));
        assert_eq!((&a - &b).unwrap(), Value::from(vec![2i64, 5]));
        assert_eq!((&a * &b).unwrap(), Value::from(vec![24i64, 14]));
        assert_eq!((&a / &b).unwrap(), Value::from(vec![1.5f64, 3.5]));
        assert_eq!((&a % &b).unwrap(), Value::from(vec![2i64, 1]));
        assert_eq!(a.floor_div(&b).unwrap(), Value::from(vec![1i64, 3]));
        assert_eq!(a.pow(&b).unwrap(), Value::from(vec![1296i64, 49]));
        assert_eq!((a.clone() + b.clone()).unwrap(), Value::from(vec![10i64, 9]));
    }

    #[test]
    fn test_bitwise_operators() {
        let a = Value::from(vec![0b1100i64, 1]);
        let b = Value::from(vec![0b1010i64, 3]);
        assert_eq!((&a & &b).unwrap(), Value::from(vec![0b1000i64, 1]));
        assert_eq!((&a | &b).unwrap(), Value::from(vec![0b1110i64, 3]));
        assert_eq!((&a ^ &b).unwrap(), Value::from(vec![0b0110i64, 2]));
        assert_eq!((&a << &b).unwrap(), Value::from(vec![0b1100i64 << 10, 8]));
        assert_eq!((&a >> &Value::from(2i64)).unwrap(), Value::from(vec![3i64, 0]));
        assert_eq!((!&Value::from(vec![true, false])).unwrap(), Value::from(vec![false, true]));
    }

    #[test]
    fn test_unary_operators() {
        let a = Value::from(vec![1.5f64, -2.0]);
        assert_eq!((-&a).unwrap(), Value::from(vec![-1.5f64, 2.0]));
        assert_eq!(a.abs().unwrap(), Value::from(vec![1.5f64, 2.0]));
    }

    #[test]
    fn test_comparisons() {
        let a = Value::from(vec![1.0f64, 2.0, 3.0]);
        let b = Value::from(2.0f64);
        assert_eq!(a.lt(&b).unwrap(), Value::from(vec![true, false, false]));
        assert_eq!(a.le(&b).unwrap(), Value::from(vec![true, true, false]));
        assert_eq!(a.eq_elem(&b).unwrap(), Value::from(vec![false, true, false]));
        assert_eq!(a.ne_elem(&b).unwrap(), Value::from(vec![true, false, true]));
        assert_eq!(a.gt(&b).unwrap(), Value::from(vec![false, false, true]));
        assert_eq!(a.ge(&b).unwrap(), Value::from(vec![false, true, true]));
    }

    #[test]
    fn test_reflected_forms_swap_operands() {
        let a = Value::from(vec![1.0f64, 4.0]);
        let b = Value::from(8.0f64);
        assert_eq!(a.rsub(&b).unwrap(), Value::from(vec![7.0f64, 4.0]));
        assert_eq!(a.rtrue_div(&b).unwrap(), Value::from(vec![8.0f64, 2.0]));
        assert_eq!(a.rpow(&Value::from(2.0f64)).unwrap(), Value::from(vec![2.0f64, 16.0]));
    }

    #[test]
    fn test_reflected_library_order() {
        let a = Value::object(Tagged(&FIRST));
        let b = Value::object(Tagged(&SECOND));
        // rpow resolves with the receiver first; other reflected forms put
        // the other operand first.
        assert_eq!(a.rpow(&b).unwrap(), Value::from(1i64));
        assert_eq!(a.rsub(&b).unwrap(), Value::from(2i64));
        assert_eq!(a.pow(&b).unwrap(), Value::from(1i64));
    }

    #[test]
    fn test_in_place_add_reuses_buffer() {
        let mut a = Value::from(vec![1.0f64, 2.0, 3.0]);
        let ptr = a.as_array().unwrap().as_slice::<f64>().unwrap().as_ptr();
        let r = a.add_assign_value(&Value::from(10.0f64)).unwrap();
        assert_eq!(r.as_array().unwrap().as_slice::<f64>().unwrap().as_ptr(), ptr);
        assert_eq!(a, Value::from(vec![11.0f64, 12.0, 13.0]));
    }

    #[test]
    fn test_in_place_cannot_grow_left_operand() {
        let mut a = Value::from(vec![1.0f64, 2.0]);
        let b = Value::from(NdArray::new(vec![1.0f64, 2.0, 3.0, 4.0], Shape::new(vec![2, 2])));
        let err = a.add_assign_value(&b).unwrap_err();
        assert!(matches!(err, MathError::OutputShape { .. }));
        assert_eq!(a, Value::from(vec![1.0f64, 2.0]));
    }

    #[test]
    fn test_in_place_true_divide_into_int_rejected() {
        let mut a = Value::from(vec![3i64, 4]);
        assert!(a.true_div_assign_value(&Value::from(2i64)).is_err());
        assert_eq!(a, Value::from(vec![3i64, 4]));
    }

    #[test]
    fn test_pow_with_modulo_unsupported() {
        let a = Value::from(2i64);
        assert!(a.pow_mod(&a, Some(&a)).is_err());
        assert_eq!(a.pow_mod(&Value::from(3i64), None).unwrap(), Value::from(8i64));
    }
}
