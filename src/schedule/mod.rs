//! Credit amortization and rent projection schedules

mod credit;
mod rent;

pub use credit::{annuity_payment, build_credit_schedule, CreditSchedule, CreditScheduleRow};
pub use rent::{build_rent_schedule, GrowthConvention, RentSchedule, RentScheduleRow};

use crate::error::ModelResult;
use crate::params::{Parameters, ScenarioParameters};

/// Builds both monthly schedules for one parameter set
#[derive(Debug, Clone, Copy)]
pub struct ScheduleBuilder<'a> {
    params: &'a Parameters,
    growth: GrowthConvention,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(params: &'a Parameters, growth: GrowthConvention) -> Self {
        Self { params, growth }
    }

    /// Amortization table; independent of the scenario
    pub fn credit_schedule(&self) -> ModelResult<CreditSchedule> {
        build_credit_schedule(
            self.params.loan_amount(),
            self.params.loan_term_months(),
            self.params.interest_rate(),
            self.params.monthly_insurance(),
            self.params.payment_scheme(),
        )
    }

    /// Rent projection under one scenario's growth assumption
    pub fn rent_schedule(&self, scenario: &ScenarioParameters) -> ModelResult<RentSchedule> {
        build_rent_schedule(
            self.params.initial_rent(),
            self.params.loan_term_months(),
            scenario.rent_growth,
            self.growth,
        )
    }
}
