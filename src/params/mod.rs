//! Model parameters: validated base inputs and per-scenario assumptions

mod data;
mod defaults;
pub mod loader;

pub use data::{MaintenanceBasis, Parameters, PaymentScheme, ScenarioParameters, MAX_LOAN_TERM_YEARS};
pub use defaults::{ParameterPreset, DEFAULT_SCENARIOS, REFERENCE_CASE};
pub use loader::{load_parameters, load_scenarios, parameters_from_json, ParameterInput};
