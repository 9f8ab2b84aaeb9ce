use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents** (BRL).
///
/// Use this type for **all** monetary values in the engine to avoid
/// floating-point drift. The sign carries the direction of the entry:
/// - positive = receivable (money owed to the holder)
/// - negative = payable (money owed by the holder)
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(123_456);
/// assert_eq!(amount.format_brl(), "1234,56");
/// assert_eq!(amount.to_string(), "R$ 1234,56");
/// assert_eq!(Money::parse_brl("1.234,56"), Some(amount));
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Largest magnitude an entry may carry: twelve digits, two of them
    /// after the decimal separator.
    pub const MAX_ABS_MINOR: i64 = 999_999_999_999;

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// `true` when the magnitude fits in [`Money::MAX_ABS_MINOR`].
    #[must_use]
    pub const fn is_within_limit(self) -> bool {
        self.0 >= -Self::MAX_ABS_MINOR && self.0 <= Self::MAX_ABS_MINOR
    }

    #[must_use]
    pub const fn saturating_abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[must_use]
    pub const fn saturating_sub(self, rhs: Money) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Parses a user-typed pt-BR amount.
    ///
    /// `.` is a thousands separator and is dropped, `,` is the decimal
    /// separator. Surrounding whitespace and a leading `+` are accepted.
    ///
    /// Returns `None` for anything that is not a strictly positive amount with
    /// at most two fraction digits and at most [`Money::MAX_ABS_MINOR`] cents:
    /// `"1.234,56"` parses, `"0"`, `"-5,00"`, `"12,345"` and `"abc"` do not.
    #[must_use]
    pub fn parse_brl(raw: &str) -> Option<Money> {
        let normalized = raw.trim().replace('.', "");
        let normalized = normalized.strip_prefix('+').unwrap_or(&normalized);

        let (units, fraction) = match normalized.split_once(',') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized, ""),
        };
        if units.is_empty() && fraction.is_empty() {
            return None;
        }
        if !units.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let units: i64 = if units.is_empty() {
            0
        } else {
            units.parse().ok()?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()? * 10,
            2 => fraction.parse().ok()?,
            _ => return None,
        };

        let total = units.checked_mul(100)?.checked_add(cents)?;
        (total > 0 && total <= Self::MAX_ABS_MINOR).then_some(Money(total))
    }

    /// Formats the amount with two decimals and `,` as decimal marker
    /// (`-250,90`). No thousands separator is emitted, so the output is
    /// accepted back by [`Money::parse_brl`] for positive amounts.
    #[must_use]
    pub fn format_brl(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{},{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}", self.format_brl())
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}
