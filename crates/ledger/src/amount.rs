use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Signed whole-unit amount.
///
/// The tracker only deals in integers: there are no fractional units, so
/// `12.50` is rejected at parse time rather than rounded.
///
/// # Examples
///
/// ```rust
/// use ledger::Amount;
///
/// assert_eq!("200".parse::<Amount>().unwrap().value(), 200);
/// assert_eq!(" -15 ".parse::<Amount>().unwrap().value(), -15);
/// assert!("abc".parse::<Amount>().is_err());
/// assert!("12.50".parse::<Amount>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Parses user input and requires a strictly positive result.
    pub fn parse_positive(s: &str) -> Result<Self, LedgerError> {
        let amount: Amount = s.parse()?;
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses an integer with an optional leading `+`/`-`.
    ///
    /// Surrounding whitespace is ignored; anything else that is not an ASCII
    /// digit is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidAmount("empty amount".to_string()));
        }

        let digits = trimmed
            .strip_prefix('-')
            .or_else(|| trimmed.strip_prefix('+'))
            .unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(LedgerError::InvalidAmount(format!("\"{trimmed}\" is not a number")));
        }

        trimmed
            .parse::<i64>()
            .map(Amount)
            .map_err(|_| LedgerError::InvalidAmount("amount too large".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_signs_and_whitespace() {
        assert_eq!("10".parse::<Amount>().unwrap().value(), 10);
        assert_eq!("+10".parse::<Amount>().unwrap().value(), 10);
        assert_eq!("-10".parse::<Amount>().unwrap().value(), -10);
        assert_eq!("  42 ".parse::<Amount>().unwrap().value(), 42);
    }

    #[test]
    fn parse_rejects_non_integers() {
        assert!("abc".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
        assert!("-".parse::<Amount>().is_err());
        assert!("1.5".parse::<Amount>().is_err());
        assert!("1 000".parse::<Amount>().is_err());
        assert!("99999999999999999999".parse::<Amount>().is_err());
    }

    #[test]
    fn parse_positive_rejects_zero_and_negatives() {
        assert_eq!(Amount::parse_positive("5").unwrap(), Amount::new(5));
        assert!(matches!(
            Amount::parse_positive("0"),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::parse_positive("-3"),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn serializes_as_plain_integer() {
        assert_eq!(serde_json::to_string(&Amount::new(-7)).unwrap(), "-7");
        assert_eq!(serde_json::from_str::<Amount>("300").unwrap(), Amount::new(300));
    }
}
