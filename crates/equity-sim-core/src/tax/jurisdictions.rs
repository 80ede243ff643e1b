use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::EquitySimError;
use crate::types::{Currency, Money, Percent};
use crate::EquitySimResult;

/// Code of the catalog entry whose rate the user may override.
pub const CUSTOM_JURISDICTION_CODE: &str = "OTHER";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One slice of a progressive ladder. `up_to: None` is the open-ended top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    #[serde(default)]
    pub up_to: Option<Money>,
    pub rate: Percent,
}

/// How gains are taxed once allowance and discount have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaxRegime {
    /// Single rate on the whole taxable amount.
    FlatRate { rate: Percent },
    /// Brackets in ascending order of `up_to`; the last one is unbounded.
    Progressive { brackets: Vec<TaxBracket> },
}

impl TaxRegime {
    /// Ladder checks for catalogs loaded from user files. The built-in
    /// catalog satisfies these by construction.
    pub fn validate(&self) -> EquitySimResult<()> {
        match self {
            TaxRegime::FlatRate { rate } => check_rate(*rate),
            TaxRegime::Progressive { brackets } => {
                let Some((last, body)) = brackets.split_last() else {
                    return Err(EquitySimError::InvalidCatalog(
                        "progressive regime needs at least one bracket".into(),
                    ));
                };
                if last.up_to.is_some() {
                    return Err(EquitySimError::InvalidCatalog(
                        "last bracket must be unbounded (up_to: null)".into(),
                    ));
                }
                let mut previous = Decimal::ZERO;
                for bracket in body {
                    let up_to = bracket.up_to.ok_or_else(|| {
                        EquitySimError::InvalidCatalog(
                            "only the last bracket may be unbounded".into(),
                        )
                    })?;
                    if up_to < previous {
                        return Err(EquitySimError::InvalidCatalog(format!(
                            "bracket bounds must be non-decreasing ({up_to} after {previous})"
                        )));
                    }
                    previous = up_to;
                    check_rate(bracket.rate)?;
                }
                check_rate(last.rate)
            }
        }
    }

    /// `"Progressive"` or the flat rate, e.g. `"26.375%"`.
    pub fn label(&self) -> String {
        match self {
            TaxRegime::FlatRate { rate } => format!("{}%", rate.normalize()),
            TaxRegime::Progressive { .. } => "Progressive".to_string(),
        }
    }
}

fn check_rate(rate: Percent) -> EquitySimResult<()> {
    if rate < Decimal::ZERO || rate > dec!(100) {
        return Err(EquitySimError::InvalidCatalog(format!(
            "tax rate {rate}% is outside 0–100"
        )));
    }
    Ok(())
}

/// A named tax regime for gains on equity grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxJurisdiction {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub flag: String,
    pub regime: TaxRegime,
    /// Percentage of the taxable base excluded before rates apply.
    #[serde(default)]
    pub esop_discount: Percent,
    /// Flat amount exempt from tax.
    #[serde(default)]
    pub tax_free_allowance: Money,
    #[serde(default)]
    pub notes: String,
}

impl TaxJurisdiction {
    /// Whether the entry accepts a user-supplied rate.
    pub fn is_custom(&self) -> bool {
        self.code.eq_ignore_ascii_case(CUSTOM_JURISDICTION_CODE)
    }

    pub fn validate(&self) -> EquitySimResult<()> {
        if self.code.trim().is_empty() {
            return Err(EquitySimError::InvalidCatalog(
                "jurisdiction code must not be empty".into(),
            ));
        }
        if self.tax_free_allowance < Decimal::ZERO {
            return Err(EquitySimError::InvalidCatalog(format!(
                "{}: tax_free_allowance must not be negative",
                self.code
            )));
        }
        if self.esop_discount < Decimal::ZERO || self.esop_discount > dec!(100) {
            return Err(EquitySimError::InvalidCatalog(format!(
                "{}: esop_discount must be between 0 and 100",
                self.code
            )));
        }
        self.regime
            .validate()
            .map_err(|e| EquitySimError::InvalidCatalog(format!("{}: {e}", self.code)))
    }

    /// Selector badge such as `"€50k Exempt"`. `None` without an allowance.
    pub fn allowance_label(&self, currency: &Currency) -> Option<String> {
        let allowance = self.tax_free_allowance;
        if allowance <= Decimal::ZERO {
            return None;
        }
        let symbol = currency.symbol();
        if allowance >= dec!(1000) {
            Some(format!(
                "{symbol}{}k Exempt",
                (allowance / dec!(1000)).normalize()
            ))
        } else {
            Some(format!("{symbol}{} Exempt", allowance.normalize()))
        }
    }

    /// Badge for jurisdictions granting a percentage relief on ESOP gains.
    pub fn relief_label(&self) -> Option<String> {
        if self.esop_discount > Decimal::ZERO {
            Some(format!("ESOP Relief -{}%", self.esop_discount.normalize()))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

static CATALOG: OnceLock<Vec<TaxJurisdiction>> = OnceLock::new();

/// Built-in jurisdictions in display order. Built on first access and shared
/// read-only for the rest of the process.
pub fn jurisdictions() -> &'static [TaxJurisdiction] {
    CATALOG.get_or_init(builtin_catalog)
}

/// Case-insensitive lookup in the built-in catalog.
pub fn find_jurisdiction(code: &str) -> EquitySimResult<&'static TaxJurisdiction> {
    find_in(jurisdictions(), code)
}

/// Case-insensitive lookup in any catalog.
pub fn find_in<'a>(catalog: &'a [TaxJurisdiction], code: &str) -> EquitySimResult<&'a TaxJurisdiction> {
    catalog
        .iter()
        .find(|j| j.code.eq_ignore_ascii_case(code.trim()))
        .ok_or_else(|| EquitySimError::UnknownJurisdiction(code.to_string()))
}

/// Validate a user catalog: every entry well-formed, codes unique.
pub fn validate_catalog(catalog: &[TaxJurisdiction]) -> EquitySimResult<()> {
    if catalog.is_empty() {
        return Err(EquitySimError::InvalidCatalog("catalog is empty".into()));
    }
    let mut seen = HashSet::new();
    for j in catalog {
        j.validate()?;
        if !seen.insert(j.code.to_ascii_uppercase()) {
            return Err(EquitySimError::InvalidCatalog(format!(
                "duplicate jurisdiction code {}",
                j.code
            )));
        }
    }
    Ok(())
}

fn flat(
    code: &str,
    flag: &str,
    name: &str,
    rate: Percent,
    allowance: Money,
    notes: &str,
) -> TaxJurisdiction {
    TaxJurisdiction {
        code: code.into(),
        name: name.into(),
        flag: flag.into(),
        regime: TaxRegime::FlatRate { rate },
        esop_discount: Decimal::ZERO,
        tax_free_allowance: allowance,
        notes: notes.into(),
    }
}

fn builtin_catalog() -> Vec<TaxJurisdiction> {
    let bracket = |up_to: Option<Money>, rate: Percent| TaxBracket { up_to, rate };
    vec![
        TaxJurisdiction {
            code: "ES".into(),
            name: "Spain (Startup Law)".into(),
            flag: "🇪🇸".into(),
            regime: TaxRegime::Progressive {
                brackets: vec![
                    bracket(Some(dec!(6_000)), dec!(19)),
                    bracket(Some(dec!(50_000)), dec!(21)),
                    bracket(Some(dec!(200_000)), dec!(23)),
                    bracket(Some(dec!(300_000)), dec!(27)),
                    bracket(None, dec!(28)),
                ],
            },
            esop_discount: Decimal::ZERO,
            tax_free_allowance: dec!(50_000),
            notes: "Startup Law 2023: first €50K exempt. Progressive savings tax up to 28%."
                .into(),
        },
        flat(
            "IE",
            "🇮🇪",
            "Ireland",
            dec!(33),
            dec!(1_270),
            "CGT flat rate at 33%. Annual exemption of €1,270 applied.",
        ),
        flat(
            "DE",
            "🇩🇪",
            "Germany",
            dec!(26.375),
            dec!(1_000),
            "Abgeltungsteuer ~26.375% (25% plus 5.5% solidarity surcharge). First €1,000 exempt.",
        ),
        flat(
            "FR",
            "🇫🇷",
            "France",
            dec!(30),
            Decimal::ZERO,
            "PFU flat tax of 30% (12.8% income + 17.2% social charges).",
        ),
        flat(
            "GB",
            "🇬🇧",
            "United Kingdom",
            dec!(20),
            dec!(3_000),
            "CGT allowance £3K. Assumes higher rate (20%) for non-EMI.",
        ),
        flat(
            CUSTOM_JURISDICTION_CODE,
            "🌍",
            "Other / Custom",
            dec!(30),
            Decimal::ZERO,
            "Enter a custom flat tax rate for your jurisdiction.",
        ),
    ]
}
