//! Rental Investment - mortgage-financed rental property projection engine
//!
//! This library provides:
//! - Credit amortization schedules (differentiated and annuity)
//! - Rent and property value projections under growth scenarios
//! - Monthly settlement-currency cashflow ledgers
//! - NPV, IRR and ROI per scenario
//! - Parallel multi-scenario runs and a factorial scenario grid

pub mod error;
pub mod factorial;
pub mod metrics;
pub mod params;
pub mod projection;
pub mod scenario;
pub mod schedule;

use std::collections::BTreeMap;

// Re-export commonly used types
pub use error::{ModelError, ModelResult};
pub use factorial::{rank_by_npv, ScenarioGrid};
pub use metrics::{IrrConfig, Metrics, MetricsEngine};
pub use params::{Parameters, ScenarioParameters, REFERENCE_CASE};
pub use projection::{CashflowProjector, Ledger, LedgerRow, ProjectionConfig};
pub use scenario::{ScenarioResult, ScenarioRunner};
pub use schedule::{GrowthConvention, ScheduleBuilder};

/// Metrics and ledger for every scenario with default engine settings
pub fn compute(params: &Parameters) -> ModelResult<BTreeMap<String, ScenarioResult>> {
    ScenarioRunner::default().run(params)
}
