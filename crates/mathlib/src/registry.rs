//! The fixed catalogue of common-interface operations.
//!
//! Every dispatchable function has one [`Op`] variant and one immutable
//! [`OpSpec`] entry recording its calling convention and flags. The
//! catalogue is the single source of truth for the dispatch wrappers and for
//! the result-type rules applied by the tidying adapter.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::OnceLock;

/// Calling convention of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// `f(x, out=None)`, returning one array shaped like `x`.
    StdUnary,
    /// `f(x, y, out=None)`, returning one array with the broadcast shape.
    StdBinary,
    /// Anything else; only the first argument is array-like.
    Other,
}

impl Signature {
    pub fn name(&self) -> &'static str {
        match self {
            Signature::StdUnary => "std_unary",
            Signature::StdBinary => "std_binary",
            Signature::Other => "other",
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset of per-operation properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// The default numeric library implements this operation.
    pub const HAS_NATIVE_IMPL: Flags = Flags(1 << 0);
    /// The result is always boolean regardless of the input dtypes.
    pub const BOOL_RESULT: Flags = Flags(1 << 1);
    /// Only valid on integer (and boolean) operands.
    pub const INTS_ONLY: Flags = Flags(1 << 2);

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.union(rhs)
    }
}

/// A registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpSpec {
    pub op: Op,
    pub name: &'static str,
    pub signature: Signature,
    pub flags: Flags,
}

macro_rules! catalogue {
    ($($variant:ident => $name:literal, $sig:ident, $($flag:ident)|+;)*) => {
        /// A named common-interface operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Op {
            $($variant,)*
        }

        impl Op {
            /// Every operation, in catalogue order.
            pub const ALL: &'static [Op] = &[$(Op::$variant,)*];

            pub fn spec(&self) -> &'static OpSpec {
                match self {
                    $(Op::$variant => {
                        const SPEC: OpSpec = OpSpec {
                            op: Op::$variant,
                            name: $name,
                            signature: Signature::$sig,
                            flags: Flags::NONE$(.union(Flags::$flag))+,
                        };
                        &SPEC
                    })*
                }
            }
        }
    };
}

catalogue! {
    Absolute => "absolute", StdUnary, HAS_NATIVE_IMPL;
    Add => "add", StdBinary, HAS_NATIVE_IMPL;
    Arccos => "arccos", StdUnary, HAS_NATIVE_IMPL;
    Arccosh => "arccosh", StdUnary, HAS_NATIVE_IMPL;
    Arcsin => "arcsin", StdUnary, HAS_NATIVE_IMPL;
    Arcsinh => "arcsinh", StdUnary, HAS_NATIVE_IMPL;
    Arctan => "arctan", StdUnary, HAS_NATIVE_IMPL;
    Arctan2 => "arctan2", StdBinary, HAS_NATIVE_IMPL;
    Arctanh => "arctanh", StdUnary, HAS_NATIVE_IMPL;
    BitwiseAnd => "bitwise_and", StdBinary, HAS_NATIVE_IMPL | INTS_ONLY;
    BitwiseOr => "bitwise_or", StdBinary, HAS_NATIVE_IMPL | INTS_ONLY;
    BitwiseXor => "bitwise_xor", StdBinary, HAS_NATIVE_IMPL | INTS_ONLY;
    BroadcastTo => "broadcast_to", Other, HAS_NATIVE_IMPL;
    Cbrt => "cbrt", StdUnary, HAS_NATIVE_IMPL;
    Ceil => "ceil", StdUnary, HAS_NATIVE_IMPL;
    Cmask => "cmask", Other, BOOL_RESULT;
    Conjugate => "conjugate", StdUnary, HAS_NATIVE_IMPL;
    Copysign => "copysign", StdBinary, HAS_NATIVE_IMPL;
    Cos => "cos", StdUnary, HAS_NATIVE_IMPL;
    Cosh => "cosh", StdUnary, HAS_NATIVE_IMPL;
    Deg2rad => "deg2rad", StdUnary, HAS_NATIVE_IMPL;
    Divide => "divide", StdBinary, HAS_NATIVE_IMPL;
    GetDtype => "get_dtype", Other, NONE;
    GetSize => "get_size", Other, NONE;
    Equal => "equal", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Exp => "exp", StdUnary, HAS_NATIVE_IMPL;
    Exp2 => "exp2", StdUnary, HAS_NATIVE_IMPL;
    Expm1 => "expm1", StdUnary, HAS_NATIVE_IMPL;
    Fabs => "fabs", StdUnary, HAS_NATIVE_IMPL;
    Floor => "floor", StdUnary, HAS_NATIVE_IMPL;
    FloorDivide => "floor_divide", StdBinary, HAS_NATIVE_IMPL;
    Fmax => "fmax", StdBinary, HAS_NATIVE_IMPL;
    Fmin => "fmin", StdBinary, HAS_NATIVE_IMPL;
    Fmod => "fmod", StdBinary, HAS_NATIVE_IMPL;
    Frexp => "frexp", Other, HAS_NATIVE_IMPL;
    Greater => "greater", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    GreaterEqual => "greater_equal", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Hypot => "hypot", StdBinary, HAS_NATIVE_IMPL;
    Invert => "invert", StdUnary, HAS_NATIVE_IMPL;
    Isfinite => "isfinite", StdUnary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Isinf => "isinf", StdUnary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Isnan => "isnan", StdUnary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Ldexp => "ldexp", StdBinary, HAS_NATIVE_IMPL;
    LeftShift => "left_shift", StdBinary, HAS_NATIVE_IMPL | INTS_ONLY;
    Less => "less", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    LessEqual => "less_equal", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Log => "log", StdUnary, HAS_NATIVE_IMPL;
    Log10 => "log10", StdUnary, HAS_NATIVE_IMPL;
    Log1p => "log1p", StdUnary, HAS_NATIVE_IMPL;
    Log2 => "log2", StdUnary, HAS_NATIVE_IMPL;
    Logaddexp => "logaddexp", StdBinary, HAS_NATIVE_IMPL;
    Logaddexp2 => "logaddexp2", StdBinary, HAS_NATIVE_IMPL;
    LogicalAnd => "logical_and", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    LogicalOr => "logical_or", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    LogicalNot => "logical_not", StdUnary, HAS_NATIVE_IMPL | BOOL_RESULT;
    LogicalXor => "logical_xor", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Maximum => "maximum", StdBinary, HAS_NATIVE_IMPL;
    Minimum => "minimum", StdBinary, HAS_NATIVE_IMPL;
    Modf => "modf", Other, HAS_NATIVE_IMPL;
    Multiply => "multiply", StdBinary, HAS_NATIVE_IMPL;
    Negative => "negative", StdUnary, HAS_NATIVE_IMPL;
    Nextafter => "nextafter", StdBinary, HAS_NATIVE_IMPL;
    NotEqual => "not_equal", StdBinary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Power => "power", StdBinary, HAS_NATIVE_IMPL;
    Rad2deg => "rad2deg", StdUnary, HAS_NATIVE_IMPL;
    Reciprocal => "reciprocal", StdUnary, HAS_NATIVE_IMPL;
    Remainder => "remainder", StdBinary, HAS_NATIVE_IMPL;
    Repvals => "repvals", StdUnary, NONE;
    Reshape => "reshape", Other, HAS_NATIVE_IMPL;
    RightShift => "right_shift", StdBinary, HAS_NATIVE_IMPL | INTS_ONLY;
    Rint => "rint", StdUnary, HAS_NATIVE_IMPL;
    Shape => "shape", Other, HAS_NATIVE_IMPL;
    Sign => "sign", StdUnary, HAS_NATIVE_IMPL;
    Signbit => "signbit", StdUnary, HAS_NATIVE_IMPL | BOOL_RESULT;
    Sin => "sin", StdUnary, HAS_NATIVE_IMPL;
    Sinh => "sinh", StdUnary, HAS_NATIVE_IMPL;
    Spacing => "spacing", StdUnary, HAS_NATIVE_IMPL;
    Sqrt => "sqrt", StdUnary, HAS_NATIVE_IMPL;
    Square => "square", StdUnary, HAS_NATIVE_IMPL;
    Subtract => "subtract", StdBinary, HAS_NATIVE_IMPL;
    Tan => "tan", StdUnary, HAS_NATIVE_IMPL;
    Tanh => "tanh", StdUnary, HAS_NATIVE_IMPL;
    TrueDivide => "true_divide", StdBinary, HAS_NATIVE_IMPL;
    Trunc => "trunc", StdUnary, HAS_NATIVE_IMPL;
}

/// Alternative names accepted by [`Op::from_name`].
pub const ALIASES: &[(&str, Op)] = &[
    ("abs", Op::Absolute),
    ("bitwise_not", Op::Invert),
    ("conj", Op::Conjugate),
    ("degrees", Op::Rad2deg),
    ("mod", Op::Remainder),
    ("radians", Op::Deg2rad),
];

fn by_name() -> &'static HashMap<&'static str, Op> {
    static TABLE: OnceLock<HashMap<&'static str, Op>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Op::ALL
            .iter()
            .map(|op| (op.name(), *op))
            .chain(ALIASES.iter().copied())
            .collect()
    })
}

impl Op {
    /// Look up an operation by its canonical name or an alias.
    pub fn from_name(name: &str) -> Option<Op> {
        by_name().get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn signature(&self) -> Signature {
        self.spec().signature
    }

    pub fn flags(&self) -> Flags {
        self.spec().flags
    }

    pub fn has_flag(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
