pub mod comparator;

pub use comparator::{
    clone_scenario, compare_scenarios, exit_scenarios, run_comparison, ComparisonRow,
    ComparisonTable, LabeledScenario, ScenarioOverrides,
};
