//! Exact rational helpers.
//!
//! Object coordinates enter the engine as `f64`. They are converted to [`BigRational`]
//! exactly (every finite `f64` is a dyadic rational) and stay exact through encoding,
//! solving and geometric validation. Conversion back to `f64` happens only when
//! results are reported.

use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

pub use num_rational::BigRational;

/// Converts a finite `f64` to its exact rational value.
pub fn rational_from_f64(value: f64) -> Result<BigRational> {
    if !value.is_finite() {
        return Err(Error::InvalidGeometry(format!(
            "coordinate {} is not finite",
            value
        )));
    }
    BigRational::from_float(value)
        .ok_or_else(|| Error::InvalidGeometry(format!("coordinate {} is not representable", value)))
}

/// Converts an integer to a rational.
pub fn rational_from_int(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// Nearest `f64` to a rational.
pub fn rational_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        let numer = value.numer().to_f64().unwrap_or(f64::NAN);
        let denom = value.denom().to_f64().unwrap_or(f64::NAN);
        numer / denom
    })
}

/// Converts an exact point to `f64` coordinates.
pub fn point_to_f64(point: &(BigRational, BigRational)) -> (f64, f64) {
    (rational_to_f64(&point.0), rational_to_f64(&point.1))
}

/// Converts a polygon to exact coordinates.
pub fn polygon_from_f64(polygon: &[(f64, f64)]) -> Result<Vec<(BigRational, BigRational)>> {
    polygon
        .iter()
        .map(|&(x, y)| Ok((rational_from_f64(x)?, rational_from_f64(y)?)))
        .collect()
}

/// Returns the smaller of two rationals (by reference).
pub fn min_ref<'a>(a: &'a BigRational, b: &'a BigRational) -> &'a BigRational {
    if a <= b {
        a
    } else {
        b
    }
}

/// Returns the larger of two rationals (by reference).
pub fn max_ref<'a>(a: &'a BigRational, b: &'a BigRational) -> &'a BigRational {
    if a >= b {
        a
    } else {
        b
    }
}

/// Midpoint of two rationals.
pub fn midpoint(a: &BigRational, b: &BigRational) -> BigRational {
    (a + b) / rational_from_int(2)
}

/// Returns true if the value is an integer.
pub fn is_integral(value: &BigRational) -> bool {
    value.denom().is_one()
}

/// Sign of a rational as -1, 0 or 1.
pub fn signum(value: &BigRational) -> i8 {
    if value.is_zero() {
        0
    } else if value.is_negative() {
        -1
    } else {
        1
    }
}
