//! Precision-preserving numeric value with an explicit "not available" state.
//!
//! Every price and indicator value is a [`Decimal`]. Arithmetic never fails:
//! division by zero, overflow of the underlying 28-digit representation, or
//! any operand that is already NaN yields [`Decimal::NAN`].

use crate::domain::error::FormatError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

type Inner = rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal(Option<Inner>);

impl Decimal {
    pub const ZERO: Decimal = Decimal(Some(Inner::ZERO));
    pub const ONE: Decimal = Decimal(Some(Inner::ONE));
    pub const HUNDRED: Decimal = Decimal(Some(Inner::ONE_HUNDRED));
    pub const NAN: Decimal = Decimal(None);

    /// `num * 10^-scale`, e.g. `Decimal::new(2107, 2)` is 21.07. A scale
    /// above 28 gives NaN.
    pub fn new(num: i64, scale: u32) -> Self {
        Inner::try_new(num, scale).map_or(Decimal::NAN, |d| Decimal(Some(d)))
    }

    /// Non-finite input becomes NaN.
    pub fn from_f64(value: f64) -> Self {
        Decimal(Inner::from_f64(value))
    }

    pub fn to_f64(self) -> f64 {
        self.0.and_then(|d| d.to_f64()).unwrap_or(f64::NAN)
    }

    /// The whole part as `usize`; `None` for NaN, negative or oversized values.
    pub fn to_usize(self) -> Option<usize> {
        self.0.and_then(|d| d.trunc().to_usize())
    }

    pub fn inner(self) -> Option<Inner> {
        self.0
    }

    pub fn is_nan(self) -> bool {
        self.0.is_none()
    }

    pub fn is_zero(self) -> bool {
        self.0.is_some_and(|d| d.is_zero())
    }

    pub fn is_positive(self) -> bool {
        self.0.is_some_and(|d| !d.is_zero() && d.is_sign_positive())
    }

    pub fn is_negative(self) -> bool {
        self.0.is_some_and(|d| !d.is_zero() && d.is_sign_negative())
    }

    pub fn abs(self) -> Self {
        Decimal(self.0.map(|d| d.abs()))
    }

    pub fn round_dp(self, dp: u32) -> Self {
        Decimal(self.0.map(|d| d.round_dp(dp)))
    }

    /// The smaller of the two values, or NaN if either is NaN.
    pub fn min(self, other: Decimal) -> Self {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Decimal(Some(a.min(b))),
            _ => Decimal::NAN,
        }
    }

    /// The larger of the two values, or NaN if either is NaN.
    pub fn max(self, other: Decimal) -> Self {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Decimal(Some(a.max(b))),
            _ => Decimal::NAN,
        }
    }

    /// `|self - other| <= epsilon`. Two NaNs are equal; NaN never equals a number.
    pub fn is_equal(self, other: Decimal, epsilon: Decimal) -> bool {
        match (self.0, other.0, epsilon.0) {
            (None, None, _) => true,
            (Some(a), Some(b), Some(eps)) => (a - b).abs() <= eps,
            _ => false,
        }
    }

    fn zip_with(self, other: Decimal, op: impl FnOnce(Inner, Inner) -> Option<Inner>) -> Self {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Decimal(op(a, b)),
            _ => Decimal::NAN,
        }
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        self.zip_with(rhs, |a, b| a.checked_add(b))
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        self.zip_with(rhs, |a, b| a.checked_sub(b))
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        self.zip_with(rhs, |a, b| a.checked_mul(b))
    }
}

impl Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        self.zip_with(rhs, |a, b| a.checked_div(b))
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(self.0.map(|d| -d))
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::ZERO, |acc, d| acc + d)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl From<Inner> for Decimal {
    fn from(value: Inner) -> Self {
        Decimal(Some(value))
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                fn from(value: $t) -> Self {
                    Decimal(Some(Inner::from(value)))
                }
            }
        )*
    };
}

from_integer!(i32, i64, u32, usize);

impl FromStr for Decimal {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("nan") {
            return Ok(Decimal::NAN);
        }
        if text.is_empty() {
            return Err(FormatError::new(s, "empty text"));
        }
        let parsed = if text.contains(['e', 'E']) {
            Inner::from_scientific(text)
        } else {
            Inner::from_str(text)
        };
        parsed
            .map(|d| Decimal(Some(d)))
            .map_err(|e| FormatError::new(s, e.to_string()))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => fmt::Display::fmt(&d, f),
            None => f.write_str("NaN"),
        }
    }
}
