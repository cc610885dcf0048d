//! Cashflow projector: merges credit and rent schedules into a settlement-currency ledger

use super::discount::DiscountCurve;
use super::ledger::{Ledger, LedgerRow};
use crate::error::{ModelError, ModelResult};
use crate::metrics::IrrConfig;
use crate::params::{MaintenanceBasis, Parameters, ScenarioParameters};
use crate::schedule::{CreditSchedule, GrowthConvention, RentSchedule};

/// Engine settings shared by every scenario run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectionConfig {
    /// How annual rent and price growth are spread over months
    pub growth: GrowthConvention,

    /// Root-finder settings for IRR
    pub irr: IrrConfig,
}

impl ProjectionConfig {
    /// Default settings with growth applied in annual steps
    pub fn annual_steps() -> Self {
        Self {
            growth: GrowthConvention::AnnualStep,
            ..Default::default()
        }
    }
}

/// Converts loan-currency schedules into a settlement-currency ledger
///
/// Every conversion uses the single exchange rate captured at purchase; the
/// rate never drifts over the horizon.
pub struct CashflowProjector<'a> {
    params: &'a Parameters,
    growth: GrowthConvention,
    discount: DiscountCurve,
}

impl<'a> CashflowProjector<'a> {
    pub fn new(params: &'a Parameters, growth: GrowthConvention) -> Self {
        Self {
            params,
            growth,
            discount: DiscountCurve::new(params.discount_rate()),
        }
    }

    /// Build the ledger for one scenario
    pub fn project(
        &self,
        scenario_name: &str,
        scenario: &ScenarioParameters,
        credit: &CreditSchedule,
        rent: &RentSchedule,
    ) -> ModelResult<Ledger> {
        let months = self.params.loan_term_months() as usize;
        if credit.len() != months || rent.len() != months {
            return Err(ModelError::config(
                "loan_term_years",
                format!(
                    "schedules must cover {} months (credit {}, rent {})",
                    months,
                    credit.len(),
                    rent.len()
                ),
            ));
        }

        let fx = self.params.exchange_rate();
        let apartment_cost = self.params.apartment_cost();
        let mut ledger = Ledger::new(scenario_name);
        let mut cumulative = 0.0;

        for (credit_row, rent_row) in credit.rows.iter().zip(&rent.rows) {
            let month = credit_row.month;

            let rent_income = rent_row.rent / fx;
            let mortgage_outlay = credit_row.total_payment / fx;
            let principal_repaid = credit_row.principal / fx;
            let maintenance_outlay = self.maintenance(rent_row.rent);

            let net_cashflow = rent_income - mortgage_outlay - maintenance_outlay;
            cumulative += net_cashflow;

            let discount_factor = self.discount.factor(month);

            ledger.add_row(LedgerRow {
                month,
                rent_income,
                mortgage_outlay,
                principal_repaid,
                maintenance_outlay,
                net_cashflow,
                cumulative_net_cashflow: cumulative,
                property_value: apartment_cost * self.growth.factor(scenario.price_growth, month),
                discount_factor,
                discounted_net_cashflow: net_cashflow * discount_factor,
            });
        }

        log::debug!(
            "Projected ledger '{}': {} months, cumulative net {:.2}, sale {:.2}",
            scenario_name,
            ledger.len(),
            cumulative,
            ledger.sale_price()
        );

        Ok(ledger)
    }

    /// Monthly maintenance in settlement currency
    fn maintenance(&self, rent_loan_ccy: f64) -> f64 {
        match self.params.maintenance_basis() {
            MaintenanceBasis::PropertyValue => {
                self.params.apartment_cost() * self.params.maintenance_rate() / 12.0
            }
            MaintenanceBasis::RentMonths => {
                rent_loan_ccy * self.params.maintenance_rate() / 12.0 / self.params.exchange_rate()
            }
        }
    }
}
