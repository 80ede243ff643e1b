pub mod calculator;
pub mod jurisdictions;

#[cfg(feature = "valuation")]
pub mod estimate;

pub use calculator::{calculate_tax, run_tax, TaxResult};
pub use jurisdictions::{
    find_jurisdiction, jurisdictions, TaxBracket, TaxJurisdiction, TaxRegime,
    CUSTOM_JURISDICTION_CODE,
};
