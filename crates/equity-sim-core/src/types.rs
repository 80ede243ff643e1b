use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages expressed as points (19 = 19%), the way grant holders and tax
/// tables quote them.
pub type Percent = Decimal;

/// Share or option counts. Decimal because vested counts are pro-rated.
pub type Shares = Decimal;

/// Display currency tag. Never used for conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    EUR,
    USD,
    GBP,
    CHF,
    JPY,
    SEK,
    DKK,
    PLN,
    Other(String),
}

impl Currency {
    /// ISO-4217 style code.
    pub fn code(&self) -> &str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
            Currency::SEK => "SEK",
            Currency::DKK => "DKK",
            Currency::PLN => "PLN",
            Currency::Other(code) => code.as_str(),
        }
    }

    /// Prefix used when formatting amounts. Codes without a dedicated symbol
    /// get the code followed by a space.
    pub fn symbol(&self) -> String {
        match self {
            Currency::EUR => "€".to_string(),
            Currency::USD => "$".to_string(),
            Currency::GBP => "£".to_string(),
            Currency::JPY => "¥".to_string(),
            other => format!("{} ", other.code()),
        }
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "EUR" => Currency::EUR,
            "USD" => Currency::USD,
            "GBP" => Currency::GBP,
            "CHF" => Currency::CHF,
            "JPY" => Currency::JPY,
            "SEK" => Currency::SEK,
            "DKK" => Currency::DKK,
            "PLN" => Currency::PLN,
            other => Currency::Other(other.to_string()),
        }
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.code().to_string()
    }
}

impl FromStr for Currency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Currency::from(s.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_round_trips_through_code() {
        let json = serde_json::to_string(&Currency::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(back, Currency::GBP);
    }

    #[test]
    fn test_unknown_currency_kept_as_other() {
        let c: Currency = "nok".parse().unwrap();
        assert_eq!(c, Currency::Other("NOK".into()));
        assert_eq!(c.symbol(), "NOK ");
    }

    #[test]
    fn test_default_currency_is_euro() {
        assert_eq!(Currency::default().symbol(), "€");
    }
}
