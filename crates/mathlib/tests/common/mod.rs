#![allow(dead_code)]

use std::any::Any;
use std::cell::{Cell, RefCell};

use mathlib::{
    ArrayObject, DType, MathError, MathLibrary, NdArray, Op, Result, Shape, Tidied, TidyLibrary,
    Value,
};
use mathlib_array::{BinaryOp, ComputeBackend, CpuBackend, UnaryOp};

thread_local! {
    static TIDY_CALLS: RefCell<Vec<Vec<Vec<usize>>>> = const { RefCell::new(Vec::new()) };
    static LIBRARY_LOOKUPS: Cell<usize> = const { Cell::new(0) };
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Shapes handed to each tidy call on this thread, in order.
pub fn tidy_calls() -> Vec<Vec<Vec<usize>>> {
    TIDY_CALLS.with(|c| c.borrow().clone())
}

pub fn reset() {
    TIDY_CALLS.with(|c| c.borrow_mut().clear());
    LIBRARY_LOOKUPS.with(|c| c.set(0));
}

/// How many times a wrapper's advertised library was looked up.
pub fn library_lookups() -> usize {
    LIBRARY_LOOKUPS.with(Cell::get)
}

fn record(shapes: &[&Shape]) {
    TIDY_CALLS.with(|c| {
        c.borrow_mut()
            .push(shapes.iter().map(|s| s.dims().to_vec()).collect())
    });
}

/// A plain array in a wrapper that advertises [`WRAPPED`].
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapped {
    pub data: NdArray,
}

impl Wrapped {
    pub fn value(data: NdArray) -> Value {
        Value::object(Wrapped { data })
    }
}

impl ArrayObject for Wrapped {
    fn library(&self) -> &'static dyn MathLibrary {
        LIBRARY_LOOKUPS.with(|c| c.set(c.get() + 1));
        &WRAPPED
    }

    fn type_name(&self) -> &'static str {
        "Wrapped"
    }

    fn clone_box(&self) -> Box<dyn ArrayObject> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn ArrayObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Wrapped>()
            .is_some_and(|o| o == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Implements only `negative` and `add` in tidy form.
#[derive(Debug, Default)]
pub struct WrappedLibrary;

pub static WRAPPED: Tidied<WrappedLibrary> = Tidied::new(WrappedLibrary);

impl TidyLibrary for WrappedLibrary {
    type Array = Wrapped;

    fn name(&self) -> &'static str {
        "WrappedLibrary"
    }

    fn accepts(&self, x: &Value) -> bool {
        x.is_native() || x.downcast_ref::<Wrapped>().is_some()
    }

    fn new_empty(&self, shape: &Shape, dtype: DType) -> Result<Wrapped> {
        Ok(Wrapped {
            data: NdArray::empty(shape.clone(), dtype),
        })
    }

    fn typeconvert(&self, x: &Value) -> Result<Wrapped> {
        if let Some(w) = x.downcast_ref::<Wrapped>() {
            return Ok(w.clone());
        }
        x.as_array()
            .map(|a| Wrapped { data: a.clone() })
            .ok_or_else(|| MathError::NotArray(x.to_string()))
    }

    fn shape(&self, x: &Wrapped) -> Shape {
        x.data.shape().clone()
    }

    fn dtype(&self, x: &Wrapped) -> DType {
        x.data.dtype()
    }

    fn reshape_in_place(&self, x: &mut Wrapped, shape: &Shape) -> Result<()> {
        Ok(x.data.reshape_in_place(shape.clone())?)
    }

    fn broadcast_to(&self, x: &Wrapped, shape: &Shape) -> Result<Wrapped> {
        Ok(Wrapped {
            data: x.data.broadcast_to(shape)?,
        })
    }

    fn wrap(&self, x: Wrapped) -> Value {
        Value::object(x)
    }

    fn as_array<'a>(&self, x: &'a Value) -> Option<&'a Wrapped> {
        x.downcast_ref::<Wrapped>()
    }

    fn as_array_mut<'a>(&self, x: &'a mut Value) -> Option<&'a mut Wrapped> {
        x.downcast_mut::<Wrapped>()
    }

    fn write_back(&self, result: Wrapped, out: &mut Value) -> Result<()> {
        match out.as_array_mut() {
            Some(a) => Ok(result.data.cast_into(a)?),
            None => {
                *out = Value::object(result);
                Ok(())
            }
        }
    }

    fn tidy_unary(&self, op: Op, x: &Wrapped, out: &mut Wrapped) -> Result<()> {
        if op != Op::Negative {
            return Err(MathError::NotImplemented {
                op: format!("tidy_{op}"),
                type_name: "Wrapped".to_string(),
                library: self.name().to_string(),
            });
        }
        record(&[x.data.shape(), out.data.shape()]);
        Ok(CpuBackend::new().unary(UnaryOp::Negative, &x.data, &mut out.data)?)
    }

    fn tidy_binary(&self, op: Op, x: &Wrapped, y: &Wrapped, out: &mut Wrapped) -> Result<()> {
        if op != Op::Add {
            return Err(MathError::NotImplemented {
                op: format!("tidy_{op}"),
                type_name: "Wrapped".to_string(),
                library: self.name().to_string(),
            });
        }
        record(&[x.data.shape(), y.data.shape(), out.data.shape()]);
        Ok(CpuBackend::new().binary(BinaryOp::Add, &x.data, &y.data, &mut out.data)?)
    }
}

/// An object whose library accepts nothing but itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque;

#[derive(Debug)]
pub struct OpaqueLibrary;

pub static OPAQUE: OpaqueLibrary = OpaqueLibrary;

impl MathLibrary for OpaqueLibrary {
    fn name(&self) -> &'static str {
        "OpaqueLibrary"
    }

    fn accepts(&self, x: &Value) -> bool {
        x.downcast_ref::<Opaque>().is_some()
    }
}

impl ArrayObject for Opaque {
    fn library(&self) -> &'static dyn MathLibrary {
        &OPAQUE
    }

    fn type_name(&self) -> &'static str {
        "Opaque"
    }

    fn clone_box(&self) -> Box<dyn ArrayObject> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn ArrayObject) -> bool {
        other.as_any().is::<Opaque>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A second family whose library also accepts [`Wrapped`] operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Rival;

#[derive(Debug)]
pub struct RivalLibrary;

pub static RIVAL: RivalLibrary = RivalLibrary;

impl MathLibrary for RivalLibrary {
    fn name(&self) -> &'static str {
        "RivalLibrary"
    }

    fn accepts(&self, x: &Value) -> bool {
        x.downcast_ref::<Rival>().is_some() || x.downcast_ref::<Wrapped>().is_some()
    }
}

impl ArrayObject for Rival {
    fn library(&self) -> &'static dyn MathLibrary {
        &RIVAL
    }

    fn type_name(&self) -> &'static str {
        "Rival"
    }

    fn clone_box(&self) -> Box<dyn ArrayObject> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn ArrayObject) -> bool {
        other.as_any().is::<Rival>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
