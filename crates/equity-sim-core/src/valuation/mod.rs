pub mod dilution;
pub mod scenario;
pub mod vesting;

pub use scenario::{
    calculate_scenario, run_scenario, BreakdownSlice, PlanType, ScenarioInputs, ScenarioResults,
};
