//! Invoice line items.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// A monetary amount in minor currency units (1/100).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Largest representable amount.
    pub const MAX: Self = Self(i64::MAX);

    /// Smallest representable amount.
    pub const MIN: Self = Self(i64::MIN);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole and fractional parts, e.g. `(12, 50)` for 12.50.
    ///
    /// Saturates at [`Money::MAX`] and [`Money::MIN`].
    #[must_use]
    pub const fn new(major: i64, minor: i64) -> Self {
        Self(major.saturating_mul(100).saturating_add(minor))
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `self + rhs`, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Returns `quantity` times this amount, or `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u64) -> Option<Self> {
        let quantity = i64::try_from(quantity).ok()?;
        self.0.checked_mul(quantity).map(Self)
    }

    /// Returns `percent`% of this amount, rounded half away from zero, or
    /// `None` if the result does not fit.
    #[must_use]
    pub fn percent(self, percent: u8) -> Option<Self> {
        let scaled = i128::from(self.0) * i128::from(percent);
        let rounded = (scaled + 50 * scaled.signum()) / 100;
        i64::try_from(rounded).ok().map(Self)
    }
}

/// Saturating; use [`Money::checked_add`] to detect overflow.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({self})")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", abs / 100, abs % 100))
    }
}

/// Parses `"12"`, `"12.5"` or `"-12.05"`; at most two fractional digits.
impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::invalid_argument(format!("invalid amount {s:?}"));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (major, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if major.is_empty() || fraction.len() > 2 || !all_digits(major) || !all_digits(fraction) {
            return Err(invalid());
        }

        let major: i64 = major.parse().map_err(|_| invalid())?;
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let amount = major
            .checked_mul(100)
            .and_then(|m| m.checked_add(minor))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -amount } else { amount }))
    }
}

/// VAT rates an entry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vat {
    /// 0%.
    #[serde(rename = "VAT_0")]
    Vat0,
    /// 5%.
    #[serde(rename = "VAT_5")]
    Vat5,
    /// 8%.
    #[serde(rename = "VAT_8")]
    Vat8,
    /// 23%.
    #[serde(rename = "VAT_23")]
    Vat23,
}

impl Vat {
    /// All rates, lowest first.
    pub const ALL: [Self; 4] = [Self::Vat0, Self::Vat5, Self::Vat8, Self::Vat23];

    /// Returns the rate in percent.
    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::Vat0 => 0,
            Self::Vat5 => 5,
            Self::Vat8 => 8,
            Self::Vat23 => 23,
        }
    }
}

impl fmt::Display for Vat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Accepts `"23"`, `"23%"` or the stored name `"VAT_23"`.
impl FromStr for Vat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rate = trimmed
            .strip_prefix("VAT_")
            .or_else(|| trimmed.strip_suffix('%'))
            .unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|vat| rate.parse::<u8>().ok() == Some(vat.percent()))
            .ok_or_else(|| CoreError::invalid_argument(format!("unsupported VAT rate {s:?}")))
    }
}

/// One line item of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceEntry {
    /// What was sold.
    pub description: String,
    /// Number of units.
    pub quantity: u64,
    /// Unit price, net.
    pub price: Money,
    /// `price * quantity`.
    pub net_value: Money,
    /// Net value plus VAT.
    pub gross_value: Money,
    /// VAT rate applied.
    pub vat_rate: Vat,
}

impl InvoiceEntry {
    /// Creates an entry, deriving net and gross values from the inputs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the net or gross value does not fit in
    /// [`Money`].
    pub fn new(
        description: impl Into<String>,
        quantity: u64,
        price: Money,
        vat_rate: Vat,
    ) -> CoreResult<Self> {
        let description = description.into();
        let overflow = || {
            CoreError::invalid_argument(format!(
                "value of entry {description:?} is out of range ({quantity} x {price})"
            ))
        };

        let net_value = price.checked_mul(quantity).ok_or_else(overflow)?;
        let gross_value = net_value
            .percent(vat_rate.percent())
            .and_then(|vat| net_value.checked_add(vat))
            .ok_or_else(overflow)?;
        Ok(Self {
            description,
            quantity,
            price,
            net_value,
            gross_value,
            vat_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_display() {
        assert_eq!(Money::new(12, 5).to_string(), "12.05");
        assert_eq!(Money::from_minor(-150).to_string(), "-1.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(format!("[{:>8}]", Money::new(1, 5)), "[    1.05]");
        assert_eq!(format!("[{:<6}]", Money::from_minor(-5)), "[-0.05 ]");
    }

    #[test]
    fn money_parse() {
        assert_eq!("12".parse::<Money>().unwrap(), Money::new(12, 0));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::new(12, 50));
        assert_eq!("12.05".parse::<Money>().unwrap(), Money::new(12, 5));
        assert_eq!("-1.50".parse::<Money>().unwrap(), Money::from_minor(-150));
        for bad in ["", ".5", "1.234", "1.x", "abc", "--1"] {
            assert!(bad.parse::<Money>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn vat_parse_and_display() {
        assert_eq!("23".parse::<Vat>().unwrap(), Vat::Vat23);
        assert_eq!("8%".parse::<Vat>().unwrap(), Vat::Vat8);
        assert_eq!("VAT_5".parse::<Vat>().unwrap(), Vat::Vat5);
        assert!("7".parse::<Vat>().is_err());
        assert_eq!(Vat::Vat0.to_string(), "0%");
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(Money::from_minor(250).percent(23), Some(Money::from_minor(58))); // 57.5
        assert_eq!(Money::from_minor(-250).percent(23), Some(Money::from_minor(-58)));
        assert_eq!(Money::from_minor(1000).percent(0), Some(Money::ZERO));
        assert_eq!(Money::MAX.percent(23), None);
        assert_eq!(Money::MAX.percent(100), Some(Money::MAX));
    }

    #[test]
    fn arithmetic_at_the_limits() {
        assert_eq!(Money::new(i64::MAX, 0), Money::MAX);
        assert_eq!(Money::new(i64::MIN, -1), Money::MIN);
        assert_eq!(Money::MAX + Money::from_minor(1), Money::MAX);
        assert_eq!(Money::MAX.checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(3).checked_mul(4), Some(Money::from_minor(12)));
        assert_eq!(Money::from_minor(2).checked_mul(u64::MAX), None);
        assert_eq!(Money::from_minor(1).checked_mul(1 << 63), None);
    }

    #[test]
    fn entry_derives_values() {
        let entry =
            InvoiceEntry::new("Buying some material", 3, Money::new(100, 0), Vat::Vat23).unwrap();
        assert_eq!(entry.net_value, Money::new(300, 0));
        assert_eq!(entry.gross_value, Money::new(369, 0));
    }

    #[test]
    fn entry_out_of_range_is_invalid_argument() {
        let err = InvoiceEntry::new("x", 100_000_000_000_000_000, Money::new(1000, 0), Vat::Vat23)
            .unwrap_err();
        assert!(err.is_invalid_argument());

        // Net fits, net plus VAT does not.
        let err = InvoiceEntry::new("y", 1, Money::from_minor(i64::MAX - 10), Vat::Vat5)
            .unwrap_err();
        assert!(err.is_invalid_argument());

        assert!(InvoiceEntry::new("z", 1, Money::from_minor(i64::MAX), Vat::Vat0).is_ok());
    }

    #[test]
    fn vat_serialized_names() {
        let names: Vec<String> = Vat::ALL
            .iter()
            .map(|v| serde_json::to_string(v).unwrap())
            .collect();
        assert_eq!(names, ["\"VAT_0\"", "\"VAT_5\"", "\"VAT_8\"", "\"VAT_23\""]);
    }
}
