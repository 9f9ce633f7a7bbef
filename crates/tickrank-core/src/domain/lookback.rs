use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// History window requested from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
}

impl Lookback {
    pub const ALL: [Self; 2] = [Self::OneMonth, Self::OneYear];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::OneYear => "1y",
        }
    }

    /// Approximate number of trading days covered by this window.
    pub const fn trading_days(self) -> usize {
        match self {
            Self::OneMonth => 21,
            Self::OneYear => 252,
        }
    }
}

impl Display for Lookback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "1y" => Ok(Self::OneYear),
            other => Err(ValidationError::InvalidLookback {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookback() {
        let lookback = Lookback::from_str("1y").expect("must parse");
        assert_eq!(lookback, Lookback::OneYear);
    }

    #[test]
    fn rejects_invalid_lookback() {
        let err = Lookback::from_str("6mo").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidLookback { .. }));
    }
}
