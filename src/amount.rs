use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Deserialize)]
#[serde(from = "f64")]
pub struct Amount(i64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid amount '{0}'")]
pub struct ParseAmountError(pub String);

impl Amount {
    const SCALE: i64 = 10_000;
    const DECIMALS: usize = 4;

    pub const ZERO: Amount = Amount(0);

    pub fn from_float(value: f64) -> Self {
        Amount((value * Self::SCALE as f64).round() as i64)
    }

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Absolute distance between two amounts, saturating at the largest
    /// representable amount.
    pub fn abs_diff(self, other: Amount) -> Amount {
        Amount(i64::try_from(self.0.abs_diff(other.0)).unwrap_or(i64::MAX))
    }

    /// Whole baht and satang, rounded half away from zero to the satang.
    fn satang(&self) -> (bool, u64, u64) {
        let per_satang = (Self::SCALE / 100) as u64;
        let abs = (self.0.unsigned_abs() + per_satang / 2) / per_satang;
        (self.0 < 0 && abs != 0, abs / 100, abs % 100)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::from_float(value)
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parse a plain decimal string such as `50`, `50.00` or `-1.5`.
    /// Digits past the fourth decimal place are rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAmountError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if frac.len() > Self::DECIMALS
            || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err())?
        };
        let frac: i64 = format!("{frac:0<width$}", width = Self::DECIMALS)
            .parse()
            .map_err(|_| err())?;

        let scaled = whole
            .checked_mul(Self::SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(err)?;
        Ok(Amount(if negative { -scaled } else { scaled }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, whole, frac) = self.satang();
        let sign = if negative { "-" } else { "" };
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

/// Formats as Thai baht with thousands separators, e.g. `฿1,234.50`.
pub struct Baht(pub Amount);

impl fmt::Display for Baht {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, whole, frac) = self.0.satang();
        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, c) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let sign = if negative { "-" } else { "" };
        write!(f, "{sign}฿{grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_float_converts_correctly() {
        assert_eq!(Amount::from_float(100.0), Amount::from_scaled(1_000_000));
        assert_eq!(Amount::from_float(1.5), Amount::from_scaled(15_000));
        assert_eq!(Amount::from_float(0.0001), Amount::from_scaled(1));
    }

    #[test]
    fn from_float_rounds_correctly() {
        assert_eq!(Amount::from_float(1.23456), Amount::from_scaled(12346));
        assert_eq!(Amount::from_float(1.23454), Amount::from_scaled(12345));
    }

    #[test]
    fn from_float_is_exact_for_satang() {
        // 100.01 and 100.02 are not representable as f64
        assert_eq!(
            Amount::from_float(100.01).abs_diff(Amount::from_float(100.0)),
            Amount::from_scaled(100)
        );
        assert_eq!(
            Amount::from_float(100.02).abs_diff(Amount::from_float(100.0)),
            Amount::from_scaled(200)
        );
    }

    #[test]
    fn parse_decimal_strings() {
        assert_eq!("50".parse(), Ok(Amount::from_scaled(500_000)));
        assert_eq!("50.00".parse(), Ok(Amount::from_scaled(500_000)));
        assert_eq!("0.01".parse(), Ok(Amount::from_scaled(100)));
        assert_eq!(" 1.5 ".parse(), Ok(Amount::from_scaled(15_000)));
        assert_eq!("-2.25".parse(), Ok(Amount::from_scaled(-22_500)));
        assert_eq!(".5".parse(), Ok(Amount::from_scaled(5_000)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Amount>().is_err());
        assert!(".".parse::<Amount>().is_err());
        assert!("1,000".parse::<Amount>().is_err());
        assert!("1.23456".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!("1e5".parse::<Amount>().is_err());
    }

    #[test]
    fn deserialize_from_json_number() {
        let amount: Amount = serde_json::from_str("50.25").unwrap();
        assert_eq!(amount, Amount::from_scaled(502_500));
        let amount: Amount = serde_json::from_str("100").unwrap();
        assert_eq!(amount, Amount::from_scaled(1_000_000));
    }

    #[test]
    fn display_formats_to_satang() {
        assert_eq!(Amount::from_scaled(1_000_000).to_string(), "100.00");
        assert_eq!(Amount::from_scaled(15_000).to_string(), "1.50");
        assert_eq!(Amount::from_scaled(0).to_string(), "0.00");
        assert_eq!(Amount::from_scaled(1_000_250).to_string(), "100.03");
        assert_eq!(Amount::from_scaled(-502_500).to_string(), "-50.25");
        assert_eq!(Amount::from_scaled(-1).to_string(), "0.00");
    }

    #[test]
    fn baht_groups_thousands() {
        assert_eq!(Baht(Amount::from_float(1234.5)).to_string(), "฿1,234.50");
        assert_eq!(Baht(Amount::from_float(50.0)).to_string(), "฿50.00");
        assert_eq!(
            Baht(Amount::from_float(10_000_000.0)).to_string(),
            "฿10,000,000.00"
        );
        assert_eq!(Baht(Amount::from_float(999.999)).to_string(), "฿1,000.00");
    }

    #[test]
    fn abs_diff_is_symmetric() {
        let a = Amount::from_scaled(100);
        let b = Amount::from_scaled(350);
        assert_eq!(a.abs_diff(b), Amount::from_scaled(250));
        assert_eq!(b.abs_diff(a), Amount::from_scaled(250));
    }

    #[test]
    fn extreme_amounts_saturate() {
        let low = Amount::from_float(-1e300);
        let high = Amount::from_float(1e300);
        assert_eq!(low, Amount::from_scaled(i64::MIN));
        assert_eq!(high, Amount::from_scaled(i64::MAX));

        assert_eq!(low.abs_diff(high), Amount::from_scaled(i64::MAX));
        assert_eq!(low.abs_diff(Amount::ZERO), Amount::from_scaled(i64::MAX));
        assert_eq!(high.abs_diff(low), Amount::from_scaled(i64::MAX));

        assert_eq!(high.to_string(), "922337203685477.58");
        assert_eq!(low.to_string(), "-922337203685477.58");
        assert_eq!(Baht(high).to_string(), "฿922,337,203,685,477.58");
    }

    #[test]
    fn zero_is_not_positive() {
        assert!(!Amount::ZERO.is_positive());
        assert!(Amount::from_scaled(1).is_positive());
        assert!(!Amount::from_scaled(-1).is_positive());
        assert_eq!(Amount::default(), Amount::ZERO);
    }
}
