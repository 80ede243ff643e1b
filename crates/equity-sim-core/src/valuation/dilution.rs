use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{sat_div, sat_mul};
use crate::types::{Percent, Shares};

/// Highest dilution a single round can apply. At 100% the pool would be
/// infinite and every holder's stake zero.
pub const MAX_DILUTION_PCT: Decimal = dec!(99);

/// Smallest dilution that still moves the pool. Below it the `1 - d` step is
/// lost to the 28-digit mantissa and ownership would come out unchanged, so
/// such requests are applied as 0 and reported as clamped.
pub const MIN_DILUTION_PCT: Decimal = dec!(0.000000000001);

/// How the share pool looks after the projected funding round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DilutionOutcome {
    /// Pool used for ownership maths (the input pool, or 1 if it was not positive).
    pub effective_total_shares: Shares,
    /// Dilution actually applied, after clamping to [0, 99].
    pub applied_dilution: Percent,
    /// Pool after the round: `effective_total / (1 - d)`.
    pub diluted_total_shares: Shares,
    /// True when the input pool was zero or negative.
    pub pool_floored: bool,
    /// True when the requested dilution was outside [0, 99] or below `MIN_DILUTION_PCT`.
    pub dilution_clamped: bool,
}

/// Pool used for division. A non-positive pool becomes 1.
pub fn effective_total_shares(total_shares: Shares) -> Shares {
    if total_shares > Decimal::ZERO {
        total_shares
    } else {
        Decimal::ONE
    }
}

/// Clamp a dilution percentage to [0, 99]. Positive values below
/// `MIN_DILUTION_PCT` become 0.
pub fn clamp_dilution(expected_dilution: Percent) -> Percent {
    let clamped = expected_dilution.max(Decimal::ZERO).min(MAX_DILUTION_PCT);
    if clamped < MIN_DILUTION_PCT {
        Decimal::ZERO
    } else {
        clamped
    }
}

/// Grow the pool so that existing holders end up with `(1 - d)` of it. The
/// holder's absolute share count is untouched; only the denominator moves.
pub fn dilute_pool(total_shares: Shares, expected_dilution: Percent) -> DilutionOutcome {
    let effective = effective_total_shares(total_shares);
    let applied = clamp_dilution(expected_dilution);
    let retained = Decimal::ONE - applied / dec!(100);

    DilutionOutcome {
        effective_total_shares: effective,
        applied_dilution: applied,
        diluted_total_shares: sat_div(effective, retained),
        pool_floored: total_shares <= Decimal::ZERO,
        dilution_clamped: applied != expected_dilution,
    }
}

/// `shares / pool * 100`, saturating. Callers pass a pool that has already
/// been floored.
pub fn ownership_pct(shares: Shares, pool: Shares) -> Percent {
    sat_mul(sat_div(shares, pool), dec!(100))
}
