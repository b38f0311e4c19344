//! Exact integer arithmetic for geometric predicates.
//!
//! Snapped coordinates are 36-bit fixed point values, so every 3×3 determinant
//! of coordinate differences fits in an `i128`. The insphere determinant also
//! multiplies such a minor by a squared length, which needs up to ~200 bits.
//! [`WideInt`] is the signed 256-bit accumulator for those sums of products.

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::ops::{Add, Neg, Sub};

const LOW_MASK: u128 = (1_u128 << 64) - 1;

/// Signed 256-bit integer in two's complement, stored as `hi * 2^128 + lo`.
///
/// Only the operations needed to accumulate `i128 × i128` products are provided.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::geometry::exact::WideInt;
///
/// let big = WideInt::from_product(i128::MAX, 4);
/// let back = big - WideInt::from_product(i128::MAX, 3);
/// assert_eq!(back, WideInt::from(i128::MAX));
/// assert_eq!((-big).signum(), -1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WideInt {
    hi: u128,
    lo: u128,
}

impl WideInt {
    /// The value zero.
    pub const ZERO: Self = Self { hi: 0, lo: 0 };

    /// Exact product of two `i128` values.
    #[must_use]
    pub fn from_product(a: i128, b: i128) -> Self {
        let magnitude = Self::unsigned_product(a.unsigned_abs(), b.unsigned_abs());
        if (a < 0) == (b < 0) {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Full 256-bit product of two unsigned 128-bit values (schoolbook on 64-bit limbs).
    fn unsigned_product(a: u128, b: u128) -> Self {
        let (a0, a1) = (a & LOW_MASK, a >> 64);
        let (b0, b1) = (b & LOW_MASK, b >> 64);

        let p00 = a0 * b0;
        let p01 = a0 * b1;
        let p10 = a1 * b0;
        let p11 = a1 * b1;

        let middle = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
        let lo = (p00 & LOW_MASK) | (middle << 64);
        let hi = p11
            .wrapping_add(p01 >> 64)
            .wrapping_add(p10 >> 64)
            .wrapping_add(middle >> 64);

        Self { hi, lo }
    }

    /// Returns `-1`, `0` or `1` according to the sign of the value.
    #[must_use]
    pub const fn signum(self) -> i32 {
        if self.hi >> 127 == 1 {
            -1
        } else if self.hi == 0 && self.lo == 0 {
            0
        } else {
            1
        }
    }

    /// Returns `true` if the value is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.hi == 0 && self.lo == 0
    }
}

impl From<i128> for WideInt {
    fn from(value: i128) -> Self {
        // Sign extension of the high word.
        #[allow(clippy::cast_sign_loss)]
        let hi = if value < 0 { u128::MAX } else { 0 };
        Self {
            hi,
            lo: value as u128,
        }
    }
}

impl Add for WideInt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        let hi = self
            .hi
            .wrapping_add(rhs.hi)
            .wrapping_add(u128::from(carry));
        Self { hi, lo }
    }
}

impl Neg for WideInt {
    type Output = Self;

    fn neg(self) -> Self {
        let lo = (!self.lo).wrapping_add(1);
        let hi = (!self.hi).wrapping_add(u128::from(lo == 0));
        Self { hi, lo }
    }
}

impl Sub for WideInt {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl PartialOrd for WideInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WideInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (*self - *other).signum() {
            -1 => Ordering::Less,
            0 => Ordering::Equal,
            _ => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_products_match_native_arithmetic() {
        let cases = [(3_i128, 7_i128), (-3, 7), (3, -7), (-3, -7), (0, -12), (1, 1)];
        for (a, b) in cases {
            assert_eq!(WideInt::from_product(a, b), WideInt::from(a * b), "{a} * {b}");
        }
    }

    #[test]
    fn products_beyond_i128_keep_their_sign() {
        let a = 1_i128 << 100;
        let b = 1_i128 << 100;
        let p = WideInt::from_product(a, b);
        assert_eq!(p.signum(), 1);
        assert_eq!((-p).signum(), -1);
        assert_eq!(WideInt::from_product(-a, b), -p);
        assert!(p > WideInt::from(i128::MAX));
    }

    #[test]
    fn sum_of_large_products_cancels_exactly() {
        // (2^110 + 1)(2^90 - 3) - 2^110 * 2^90 = -3 * 2^110 + 2^90 - 3
        let a = (1_i128 << 110) + 1;
        let b = (1_i128 << 90) - 3;
        let lhs = WideInt::from_product(a, b) - WideInt::from_product(1 << 110, 1 << 90);
        let rhs = WideInt::from(-3 * (1_i128 << 110) + (1_i128 << 90) - 3);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn zero_detection() {
        let p = WideInt::from_product(1 << 120, 1 << 120);
        assert!((p - p).is_zero());
        assert_eq!((p - p).signum(), 0);
        assert_eq!(WideInt::ZERO.signum(), 0);
    }

    #[test]
    fn negation_round_trips_through_zero_low_word() {
        let v = WideInt::from_product(1 << 126, 4);
        assert_eq!(-(-v), v);
        assert_eq!((v + (-v)).signum(), 0);
    }
}
