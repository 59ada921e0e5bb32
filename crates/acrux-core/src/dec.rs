//! Fixed-point decimal with 18 fractional digits.
//!
//! A `Dec` is an arbitrary-precision integer scaled by 10^18. Every operation
//! is exact integer arithmetic followed by an explicit reduction rule, so all
//! nodes produce identical results:
//!
//! | operation        | reduction                              |
//! |------------------|----------------------------------------|
//! | `&a * &b`        | round half to even at 18 digits        |
//! | `checked_quo`    | round half to even at 18 digits        |
//! | `mul_int`        | exact                                  |
//! | `quo_int`        | truncate toward zero at 18 digits      |
//! | `truncate_int`   | truncate toward zero to an integer     |

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AcruxError;

/// Number of fractional decimal digits.
pub const PRECISION: u32 = 18;

const PRECISION_MULTIPLIER: u64 = 1_000_000_000_000_000_000;

fn precision_multiplier() -> BigInt {
    BigInt::from(PRECISION_MULTIPLIER)
}

fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}

/// Reduce a value carrying 36 fractional digits back to 18, rounding half to even.
fn chop_precision_and_round(d: BigInt) -> BigInt {
    if d.is_negative() {
        return -chop_precision_and_round(-d);
    }

    let multiplier = precision_multiplier();
    let quo = &d / &multiplier;
    let rem = &d % &multiplier;
    if rem.is_zero() {
        return quo;
    }

    let two = BigInt::from(2u8);
    let half = &multiplier / &two;
    match rem.cmp(&half) {
        Ordering::Less => quo,
        Ordering::Greater => quo + 1u8,
        Ordering::Equal => {
            if (&quo % &two).is_zero() {
                quo
            } else {
                quo + 1u8
            }
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(BigInt);

impl Dec {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn one() -> Self {
        Self(precision_multiplier())
    }

    /// Whole number `i`.
    pub fn from_int(i: i64) -> Self {
        Self(BigInt::from(i) * precision_multiplier())
    }

    /// Whole number `i`, for base-unit balances.
    pub fn from_u128(i: u128) -> Self {
        Self(BigInt::from(i) * precision_multiplier())
    }

    /// `i × 10^-prec`, e.g. `new_with_prec(66, 2)` is 0.66.
    ///
    /// # Panics
    /// Panics if `prec` exceeds [`PRECISION`].
    pub fn new_with_prec(i: i64, prec: u32) -> Self {
        assert!(prec <= PRECISION, "precision must be at most {PRECISION}");
        Self(BigInt::from(i) * pow10(PRECISION - prec))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Exact multiplication by an integer.
    pub fn mul_int(&self, i: i64) -> Self {
        Self(&self.0 * BigInt::from(i))
    }

    /// Division by an integer, truncating toward zero at 18 digits.
    pub fn quo_int(&self, i: i64) -> Result<Self, AcruxError> {
        if i == 0 {
            return Err(AcruxError::Arithmetic("decimal division by zero".into()));
        }
        Ok(Self(&self.0 / BigInt::from(i)))
    }

    /// Division by a decimal, rounding half to even at 18 digits.
    pub fn checked_quo(&self, other: &Dec) -> Result<Self, AcruxError> {
        if other.is_zero() {
            return Err(AcruxError::Arithmetic("decimal division by zero".into()));
        }
        let multiplier = precision_multiplier();
        let scaled = &self.0 * &multiplier * &multiplier;
        Ok(Self(chop_precision_and_round(scaled / &other.0)))
    }

    /// Integer part, truncated toward zero.
    pub fn truncate_int(&self) -> BigInt {
        &self.0 / precision_multiplier()
    }

    /// Integer part as a base-unit amount. Fails for negative or oversized values.
    pub fn truncate_u128(&self) -> Result<u128, AcruxError> {
        self.truncate_int()
            .to_u128()
            .ok_or_else(|| AcruxError::Arithmetic(format!("{self} does not fit a u128 amount")))
    }
}

// ── Operators ────────────────────────────────────────────────────────────────

impl Add for &Dec {
    type Output = Dec;

    fn add(self, rhs: &Dec) -> Dec {
        Dec(&self.0 + &rhs.0)
    }
}

impl Sub for &Dec {
    type Output = Dec;

    fn sub(self, rhs: &Dec) -> Dec {
        Dec(&self.0 - &rhs.0)
    }
}

/// Rounds half to even at 18 digits.
impl Mul for &Dec {
    type Output = Dec;

    fn mul(self, rhs: &Dec) -> Dec {
        Dec(chop_precision_and_round(&self.0 * &rhs.0))
    }
}

impl Neg for Dec {
    type Output = Dec;

    fn neg(self) -> Dec {
        Dec(-self.0)
    }
}

// ── Text form ────────────────────────────────────────────────────────────────

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let multiplier = precision_multiplier();
        let abs = self.0.abs();
        let int_part = &abs / &multiplier;
        let frac_part = (&abs % &multiplier).to_string();
        let sign = if self.0.is_negative() { "-" } else { "" };
        write!(f, "{sign}{int_part}.{frac_part:0>18}")
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({self})")
    }
}

impl FromStr for Dec {
    type Err = AcruxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AcruxError::InvalidDecimal(s.to_string());
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) if !f.is_empty() => (i, f),
            Some(_) => return Err(invalid()),
            None => (body, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }
        if frac_part.len() > PRECISION as usize {
            return Err(invalid());
        }

        let scaled = format!("{int_part}{frac_part:0<18}");
        let value = BigInt::from_str(&scaled).map_err(|_| invalid())?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
