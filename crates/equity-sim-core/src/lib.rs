pub mod display;
pub mod error;
pub mod math;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::EquitySimError;
pub use types::*;

/// Standard result type for all equity-sim operations
pub type EquitySimResult<T> = Result<T, EquitySimError>;
