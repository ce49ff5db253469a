use std::{
    fmt,
    ops::{Add, Neg},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (balances,
/// transaction amounts) to avoid floating-point drift: two fractional digits
/// are exact by construction and additions never round.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

/// Whole-unit digits accepted by the parser (`99_999_999.99` at most).
const MAX_WHOLE_DIGITS: usize = 8;

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest transaction amount, `99999999.99`.
    pub const MAX_AMOUNT: MoneyCents = MoneyCents(9_999_999_999);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses `[+|-]units[(.|,)cents]`.
    ///
    /// At most two fractional digits and eight whole digits, so every parsed
    /// value lies within `±MAX_AMOUNT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let reject = |reason: &str| EngineError::InvalidAmount(format!("{reason}: {input:?}"));

        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };
        let (whole, fraction) = digits.split_once(['.', ',']).unwrap_or((digits, ""));

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(reject("invalid amount"));
        }
        if fraction.len() > 2 {
            return Err(reject("too many decimals"));
        }
        let significant = whole.trim_start_matches('0');
        if significant.len() > MAX_WHOLE_DIGITS {
            return Err(reject("amount out of range"));
        }

        let units = match significant {
            "" => 0,
            digits => digits
                .parse::<i64>()
                .map_err(|_| reject("invalid amount"))?,
        };
        let cents = match fraction.len() {
            0 => 0,
            len => {
                let value = fraction
                    .parse::<i64>()
                    .map_err(|_| reject("invalid amount"))?;
                if len == 1 { value * 10 } else { value }
            }
        };

        let total = units * 100 + cents;
        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10.".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("0.001".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<MoneyCents>().is_err());
        assert!("-".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!(".50".parse::<MoneyCents>().is_err());
        assert!("1e3".parse::<MoneyCents>().is_err());
        assert!("1,2,3".parse::<MoneyCents>().is_err());
        assert!("- 5".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn parse_is_bounded_to_eight_whole_digits() {
        assert_eq!(
            "99999999.99".parse::<MoneyCents>().unwrap(),
            MoneyCents::MAX_AMOUNT
        );
        assert_eq!(
            "-99999999.99".parse::<MoneyCents>().unwrap(),
            -MoneyCents::MAX_AMOUNT
        );
        assert_eq!("000000001.50".parse::<MoneyCents>().unwrap().cents(), 150);
        assert!("100000000".parse::<MoneyCents>().is_err());
        assert!("50000000000000000.00".parse::<MoneyCents>().is_err());
        assert!("99999999999999999999".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let max = MoneyCents::new(i64::MAX);
        assert_eq!(max.checked_add(MoneyCents::new(1)), None);
        assert_eq!(MoneyCents::new(i64::MIN).checked_sub(MoneyCents::new(1)), None);
        assert_eq!(
            MoneyCents::new(100).checked_sub(MoneyCents::new(250)),
            Some(MoneyCents::new(-150))
        );
    }

    #[test]
    fn repeated_cent_additions_do_not_drift() {
        let mut total = MoneyCents::ZERO;
        for _ in 0..1000 {
            total = total + "0.10".parse::<MoneyCents>().unwrap();
        }
        assert_eq!(total.to_string(), "100.00");
    }
}
