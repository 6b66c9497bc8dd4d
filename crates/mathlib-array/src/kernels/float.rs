// Float helpers the `num_traits::Float` trait does not provide.

use half::f16;
use num_traits::Float;

/// IEEE `nextafter`, implemented on the raw bit pattern.
pub trait NextToward: Float {
    fn next_toward(self, to: Self) -> Self;
}

macro_rules! impl_next_toward {
    ($t:ty, $bits:ty, $to_bits:expr, $from_bits:expr) => {
        impl NextToward for $t {
            fn next_toward(self, to: Self) -> Self {
                if self.is_nan() || to.is_nan() {
                    return <$t as Float>::nan();
                }
                if self == to {
                    return to;
                }
                if self == <$t as num_traits::Zero>::zero() {
                    let tiny: $t = $from_bits(1 as $bits);
                    return if to > self { tiny } else { -tiny };
                }
                let bits: $bits = $to_bits(self);
                let away_from_zero = (to > self) == (self > <$t as num_traits::Zero>::zero());
                let next = if away_from_zero { bits + 1 } else { bits - 1 };
                $from_bits(next)
            }
        }
    };
}

impl_next_toward!(f64, u64, f64::to_bits, f64::from_bits);
impl_next_toward!(f32, u32, f32::to_bits, f32::from_bits);
impl_next_toward!(f16, u16, f16::to_bits, f16::from_bits);

/// Round half to even, matching numpy's `rint`.
pub fn rint<T: Float>(x: T) -> T {
    let half = T::from(0.5).unwrap_or_else(T::zero);
    let two = T::one() + T::one();
    if (x - x.trunc()).abs() == half {
        (x / two).round() * two
    } else {
        x.round()
    }
}

/// Distance to the next representable value away from zero, signed like `x`.
pub fn spacing<T: NextToward>(x: T) -> T {
    if !x.is_finite() {
        return T::nan();
    }
    let toward = if x.is_sign_negative() {
        T::neg_infinity()
    } else {
        T::infinity()
    };
    x.next_toward(toward) - x
}

/// numpy `sign`: -1, 0 or 1, NaN for NaN.
pub fn sign<T: Float>(x: T) -> T {
    if x.is_nan() {
        x
    } else if x > T::zero() {
        T::one()
    } else if x < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// NaN-propagating maximum.
pub fn maximum<T: Float>(x: T, y: T) -> T {
    if x.is_nan() || y.is_nan() {
        T::nan()
    } else {
        x.max(y)
    }
}

/// NaN-propagating minimum.
pub fn minimum<T: Float>(x: T, y: T) -> T {
    if x.is_nan() || y.is_nan() {
        T::nan()
    } else {
        x.min(y)
    }
}

/// Floored division following Python's `divmod`.
pub fn floor_divide<T: Float>(x: T, y: T) -> T {
    if y == T::zero() {
        return x / y;
    }
    let m = x % y;
    let mut div = (x - m) / y;
    if m != T::zero() && ((y < T::zero()) != (m < T::zero())) {
        div = div - T::one();
    }
    if div == T::zero() {
        // Keep the sign of the true quotient.
        return T::zero() * (x / y).signum();
    }
    let floor = div.floor();
    if div - floor > T::from(0.5).unwrap_or_else(T::zero) {
        floor + T::one()
    } else {
        floor
    }
}

/// Remainder with the sign of the divisor.
pub fn remainder<T: Float>(x: T, y: T) -> T {
    if y == T::zero() {
        return T::nan();
    }
    let m = x % y;
    if m == T::zero() {
        return T::zero() * y.signum();
    }
    if (y < T::zero()) != (m < T::zero()) {
        m + y
    } else {
        m
    }
}

pub fn logaddexp<T: Float>(x: T, y: T) -> T {
    if x == y {
        return x + T::from(std::f64::consts::LN_2).unwrap_or_else(T::zero);
    }
    let diff = x - y;
    if diff.is_nan() {
        return diff;
    }
    if diff > T::zero() {
        x + (-diff).exp().ln_1p()
    } else {
        y + diff.exp().ln_1p()
    }
}

pub fn logaddexp2<T: Float>(x: T, y: T) -> T {
    if x == y {
        return x + T::one();
    }
    let diff = x - y;
    if diff.is_nan() {
        return diff;
    }
    let log2e = T::from(std::f64::consts::LOG2_E).unwrap_or_else(T::one);
    if diff > T::zero() {
        x + (-diff).exp2().ln_1p() * log2e
    } else {
        y + diff.exp2().ln_1p() * log2e
    }
}

/// `x * 2^n`.
pub fn ldexp<T: Float>(x: T, n: i64) -> T {
    let two = T::one() + T::one();
    let n = n.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    // Split the exponent so that 2^n itself does not overflow while x is tiny.
    let half = n / 2;
    x * two.powi(half) * two.powi(n - half)
}

/// Decompose into mantissa in [0.5, 1) and integer exponent.
pub fn frexp(x: f64) -> (f64, i64) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i64;
    if exp_bits == 0 {
        // Subnormal: scale into the normal range first.
        let (m, e) = frexp(x * 2f64.powi(64));
        return (m, e - 64);
    }
    let exp = exp_bits - 1022;
    let mantissa_bits = (bits & !(0x7ffu64 << 52)) | (1022u64 << 52);
    (f64::from_bits(mantissa_bits), exp)
}
