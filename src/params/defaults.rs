//! Named default model configuration

use super::data::{MaintenanceBasis, PaymentScheme, ScenarioParameters};
use super::loader::ParameterInput;

/// A complete parameter set that can live in a `const`
#[derive(Debug, Clone, Copy)]
pub struct ParameterPreset {
    pub apartment_cost: f64,
    pub exchange_rate: f64,
    pub down_payment: f64,
    pub extra_costs: f64,
    pub loan_term_years: u32,
    pub interest_rate: f64,
    pub payment_scheme: PaymentScheme,
    pub initial_rent: f64,
    pub insurance_rate: f64,
    pub maintenance_rate: f64,
    pub maintenance_basis: MaintenanceBasis,
    pub discount_rate: f64,
    pub scenarios: &'static [(&'static str, ScenarioParameters)],
}

/// Conventional pessimistic / base / optimistic scenario trio
pub const DEFAULT_SCENARIOS: &[(&str, ScenarioParameters)] = &[
    ("pessimistic", ScenarioParameters::new(-0.01, 0.07, -0.01)),
    ("base", ScenarioParameters::new(0.0, 0.10, 0.0)),
    ("optimistic", ScenarioParameters::new(0.03, 0.13, 0.02)),
];

/// Reference apartment: 57k purchase at 41.5, 20-year loan at 7%
///
/// Also supplies the defaults for optional input fields.
pub const REFERENCE_CASE: ParameterPreset = ParameterPreset {
    apartment_cost: 57_000.0,
    exchange_rate: 41.5,
    down_payment: 11_500.0,
    extra_costs: 5_000.0,
    loan_term_years: 20,
    interest_rate: 0.07,
    payment_scheme: PaymentScheme::Differentiated,
    initial_rent: 12_000.0,
    insurance_rate: 0.0025, // 0.25% of apartment cost
    maintenance_rate: 0.01,
    maintenance_basis: MaintenanceBasis::PropertyValue,
    discount_rate: 0.03,
    scenarios: DEFAULT_SCENARIOS,
};

impl ParameterPreset {
    pub fn scenario_list(&self) -> Vec<(String, ScenarioParameters)> {
        self.scenarios
            .iter()
            .map(|(name, scenario)| (name.to_string(), *scenario))
            .collect()
    }

    pub fn to_input(&self) -> ParameterInput {
        ParameterInput {
            apartment_cost: self.apartment_cost,
            exchange_rate: self.exchange_rate,
            down_payment: self.down_payment,
            extra_costs: self.extra_costs,
            loan_term_years: i64::from(self.loan_term_years),
            interest_rate: self.interest_rate,
            payment_scheme: self.payment_scheme.to_string(),
            initial_rent: self.initial_rent,
            insurance_rate: self.insurance_rate,
            maintenance_rate: self.maintenance_rate,
            maintenance_basis: self.maintenance_basis.to_string(),
            discount_rate: self.discount_rate,
            scenarios: self.scenario_list(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Parameters;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_case_is_valid() {
        let params = Parameters::try_from(REFERENCE_CASE.to_input()).unwrap();
        assert_relative_eq!(params.initial_investment(), 16_500.0);
        assert_relative_eq!(params.loan_amount(), 45_500.0 * 41.5);
        assert_eq!(params.loan_term_months(), 240);
        assert_eq!(params.scenarios().len(), 3);
    }
}
