use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Percent;

/// Vesting position at the evaluation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingStatus {
    /// Whole calendar months since grant; `None` when no schedule applies.
    pub months_elapsed: Option<i64>,
    /// Share of the grant vested, in [0, 100].
    pub vested_percentage: Percent,
    /// Which branch of the schedule produced the percentage.
    pub phase: VestingPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VestingPhase {
    /// No grant date or no vesting period: everything counts as vested.
    Unscheduled,
    /// Still inside the cliff.
    BeforeCliff,
    /// Past the cliff, vesting linearly.
    Vesting,
    /// Vesting period complete.
    FullyVested,
}

/// Calendar months between two dates, using only the year and month fields.
/// A grant on the 31st and an evaluation on the 1st of the next month count
/// as one month.
pub fn months_elapsed(grant_date: NaiveDate, as_of: NaiveDate) -> i64 {
    let years = i64::from(as_of.year()) - i64::from(grant_date.year());
    let months = i64::from(as_of.month()) - i64::from(grant_date.month());
    years * 12 + months
}

/// Linear vesting with a cliff. The cliff check runs first, so a cliff longer
/// than the vesting period keeps the grant at zero until the cliff passes.
pub fn vested_percentage(months_elapsed: i64, vesting_months: u32, cliff_months: u32) -> Percent {
    vesting_phase_pct(months_elapsed, vesting_months, cliff_months).1
}

fn vesting_phase_pct(
    months_elapsed: i64,
    vesting_months: u32,
    cliff_months: u32,
) -> (VestingPhase, Percent) {
    if vesting_months == 0 {
        return (VestingPhase::Unscheduled, dec!(100));
    }
    if months_elapsed < i64::from(cliff_months) {
        (VestingPhase::BeforeCliff, Decimal::ZERO)
    } else if months_elapsed >= i64::from(vesting_months) {
        (VestingPhase::FullyVested, dec!(100))
    } else {
        let pct = Decimal::from(months_elapsed) / Decimal::from(vesting_months) * dec!(100);
        (VestingPhase::Vesting, pct)
    }
}

/// Vesting status for an optional grant date. Without a grant date or with a
/// zero-month period the grant is treated as fully vested.
pub fn vesting_status(
    grant_date: Option<NaiveDate>,
    vesting_months: u32,
    cliff_months: u32,
    as_of: NaiveDate,
) -> VestingStatus {
    match grant_date {
        Some(grant) if vesting_months > 0 => {
            let elapsed = months_elapsed(grant, as_of);
            let (phase, pct) = vesting_phase_pct(elapsed, vesting_months, cliff_months);
            VestingStatus {
                months_elapsed: Some(elapsed),
                vested_percentage: pct,
                phase,
            }
        }
        _ => VestingStatus {
            months_elapsed: None,
            vested_percentage: dec!(100),
            phase: VestingPhase::Unscheduled,
        },
    }
}
