use std::fmt;

/// Element types supported by [`NdArray`](crate::NdArray).
///
/// The variants are declared in promotion order within each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 16-bit floating point (IEEE 754 half-precision, via the `half` crate).
    Float16,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
}

/// Coarse classification of a [`DType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DTypeKind {
    Bool,
    Integer,
    Float,
}

impl DType {
    pub const ALL: [DType; 5] = [
        DType::Bool,
        DType::Int64,
        DType::Float16,
        DType::Float32,
        DType::Float64,
    ];

    pub fn kind(&self) -> DTypeKind {
        match self {
            DType::Bool => DTypeKind::Bool,
            DType::Int64 => DTypeKind::Integer,
            DType::Float16 | DType::Float32 | DType::Float64 => DTypeKind::Float,
        }
    }

    pub fn is_float(&self) -> bool {
        self.kind() == DTypeKind::Float
    }

    pub fn is_bool(&self) -> bool {
        *self == DType::Bool
    }

    /// The dtype two operands promote to when combined, following numpy's
    /// array promotion rules.
    ///
    /// - Bool promotes to anything.
    /// - Int64 combined with Float16 or Float32 needs Float64 to hold every
    ///   integer value.
    /// - Otherwise the wider type wins.
    pub fn result_type(a: DType, b: DType) -> DType {
        match (a, b) {
            (DType::Int64, DType::Float16 | DType::Float32)
            | (DType::Float16 | DType::Float32, DType::Int64) => DType::Float64,
            _ => a.max(b),
        }
    }

    /// Promotes any number of dtypes. Returns `None` for an empty slice.
    pub fn result_type_of(dtypes: &[DType]) -> Option<DType> {
        dtypes.iter().copied().reduce(DType::result_type)
    }

    /// The floating point type used when a float-only function is applied to
    /// values of this type.
    pub fn float_type(&self) -> DType {
        match self {
            DType::Bool => DType::Float16,
            DType::Int64 => DType::Float64,
            other => *other,
        }
    }

    /// Whether values of type `from` may be written into an array of type
    /// `to` under numpy's `same_kind` casting rule.
    pub fn can_cast_same_kind(from: DType, to: DType) -> bool {
        match (from.kind(), to.kind()) {
            (DTypeKind::Bool, _) => true,
            (DTypeKind::Integer, DTypeKind::Integer | DTypeKind::Float) => true,
            (DTypeKind::Float, DTypeKind::Float) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int64 => "int64",
            DType::Float16 => "float16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_type() {
        assert_eq!(DType::result_type(DType::Bool, DType::Int64), DType::Int64);
        assert_eq!(DType::result_type(DType::Bool, DType::Bool), DType::Bool);
        assert_eq!(
            DType::result_type(DType::Int64, DType::Float32),
            DType::Float64
        );
        assert_eq!(
            DType::result_type(DType::Float16, DType::Int64),
            DType::Float64
        );
        assert_eq!(
            DType::result_type(DType::Float16, DType::Float32),
            DType::Float32
        );
        assert_eq!(
            DType::result_type(DType::Bool, DType::Float16),
            DType::Float16
        );
    }

    #[test]
    fn test_result_type_symmetric() {
        for a in DType::ALL {
            for b in DType::ALL {
                assert_eq!(DType::result_type(a, b), DType::result_type(b, a));
            }
        }
    }

    #[test]
    fn test_result_type_of() {
        assert_eq!(DType::result_type_of(&[]), None);
        assert_eq!(
            DType::result_type_of(&[DType::Bool, DType::Int64, DType::Float32]),
            Some(DType::Float64)
        );
    }

    #[test]
    fn test_float_type() {
        assert_eq!(DType::Bool.float_type(), DType::Float16);
        assert_eq!(DType::Int64.float_type(), DType::Float64);
        assert_eq!(DType::Float32.float_type(), DType::Float32);
    }

    #[test]
    fn test_same_kind_casting() {
        assert!(DType::can_cast_same_kind(DType::Bool, DType::Int64));
        assert!(DType::can_cast_same_kind(DType::Int64, DType::Float16));
        assert!(DType::can_cast_same_kind(DType::Float64, DType::Float16));
        assert!(!DType::can_cast_same_kind(DType::Float32, DType::Int64));
        assert!(!DType::can_cast_same_kind(DType::Int64, DType::Bool));
    }
}
