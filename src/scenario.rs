//! Scenario runner for batch projections
//!
//! Each named scenario runs the full pipeline independently against the same
//! validated parameters:
//! schedules -> ledger -> metrics.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::metrics::{Metrics, MetricsEngine};
use crate::params::{Parameters, ScenarioParameters};
use crate::projection::{CashflowProjector, Ledger, ProjectionConfig};
use crate::schedule::ScheduleBuilder;

/// Output of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Growth assumptions the run used
    pub scenario: ScenarioParameters,
    pub metrics: Metrics,
    pub ledger: Ledger,
}

/// Runs every scenario of a parameter set
///
/// # Example
/// ```ignore
/// let params = Parameters::try_from(REFERENCE_CASE.to_input())?;
/// let results = ScenarioRunner::default().run(&params)?;
/// println!("{:.2}", results["base"].metrics.npv_with_sale);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run all scenarios in parallel, keyed by scenario name
    pub fn run(&self, params: &Parameters) -> ModelResult<BTreeMap<String, ScenarioResult>> {
        log::info!("Running {} scenarios", params.scenarios().len());

        let results = params
            .scenarios()
            .par_iter()
            .map(|(name, scenario)| {
                self.run_scenario(params, name, scenario)
                    .map(|result| (name.clone(), result))
            })
            .collect::<ModelResult<BTreeMap<_, _>>>()?;

        log::info!("Completed {} scenarios", results.len());
        Ok(results)
    }

    /// Same as [`run`](Self::run) on the calling thread
    pub fn run_sequential(&self, params: &Parameters) -> ModelResult<BTreeMap<String, ScenarioResult>> {
        params
            .scenarios()
            .iter()
            .map(|(name, scenario)| {
                self.run_scenario(params, name, scenario)
                    .map(|result| (name.clone(), result))
            })
            .collect()
    }

    /// Run the pipeline for a single scenario
    pub fn run_scenario(
        &self,
        params: &Parameters,
        name: &str,
        scenario: &ScenarioParameters,
    ) -> ModelResult<ScenarioResult> {
        let builder = ScheduleBuilder::new(params, self.config.growth);
        let credit = builder.credit_schedule()?;
        let rent = builder.rent_schedule(scenario)?;

        let ledger = CashflowProjector::new(params, self.config.growth)
            .project(name, scenario, &credit, &rent)?;

        let metrics = MetricsEngine::new(params.discount_rate(), self.config.irr)
            .evaluate(params.initial_investment(), &ledger)?;

        log::debug!(
            "Scenario '{}': NPV with sale {:.2}, IRR {:?}, ROI {:.4}",
            name,
            metrics.npv_with_sale,
            metrics.irr,
            metrics.roi
        );

        Ok(ScenarioResult {
            scenario: *scenario,
            metrics,
            ledger,
        })
    }
}
