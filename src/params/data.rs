//! Validated model parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::loader::ParameterInput;
use crate::error::{ModelError, ModelResult};

/// Growth and inflation assumptions for one named scenario
///
/// All rates are annual signed fractions (0.03 = 3%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Annual rent growth in loan currency
    #[serde(alias = "rent_growth_annual")]
    pub rent_growth: f64,

    /// Annual loan-currency inflation (informational, see `real_rent_growth`)
    #[serde(alias = "inflation_uah_annual")]
    pub inflation: f64,

    /// Annual property price growth in settlement currency
    #[serde(alias = "price_growth_annual_usd")]
    pub price_growth: f64,
}

impl ScenarioParameters {
    pub const fn new(rent_growth: f64, inflation: f64, price_growth: f64) -> Self {
        Self {
            rent_growth,
            inflation,
            price_growth,
        }
    }

    /// Rent growth in excess of loan-currency inflation
    pub fn real_rent_growth(&self) -> f64 {
        self.rent_growth - self.inflation
    }

    pub(crate) fn validate(&self, name: &str) -> ModelResult<()> {
        let field = |f: &str| format!("scenarios.{}.{}", name, f);

        require_finite(&field("inflation"), self.inflation)?;
        for (f, value) in [("rent_growth", self.rent_growth), ("price_growth", self.price_growth)] {
            require_finite(&field(f), value)?;
            if value <= -1.0 {
                return Err(ModelError::config(
                    field(f),
                    format!("growth of {} cannot be compounded (must be > -1)", value),
                ));
            }
        }
        Ok(())
    }
}

/// Mortgage amortization scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentScheme {
    /// Constant principal, declining interest
    Differentiated,
    /// Constant total payment (excluding insurance)
    Annuity,
}

impl FromStr for PaymentScheme {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "differentiated" => Ok(PaymentScheme::Differentiated),
            "annuity" => Ok(PaymentScheme::Annuity),
            other => Err(ModelError::config(
                "payment_scheme",
                format!("unknown payment scheme '{}' (expected differentiated or annuity)", other),
            )),
        }
    }
}

impl fmt::Display for PaymentScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentScheme::Differentiated => write!(f, "differentiated"),
            PaymentScheme::Annuity => write!(f, "annuity"),
        }
    }
}

/// What the maintenance coefficient is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceBasis {
    /// Annual fraction of the apartment cost (settlement currency)
    PropertyValue,
    /// Months of current rent per year (loan currency, grows with rent)
    RentMonths,
}

impl FromStr for MaintenanceBasis {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "property_value" => Ok(MaintenanceBasis::PropertyValue),
            "rent_months" => Ok(MaintenanceBasis::RentMonths),
            other => Err(ModelError::config(
                "maintenance_basis",
                format!("unknown maintenance basis '{}' (expected property_value or rent_months)", other),
            )),
        }
    }
}

impl fmt::Display for MaintenanceBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceBasis::PropertyValue => write!(f, "property_value"),
            MaintenanceBasis::RentMonths => write!(f, "rent_months"),
        }
    }
}

/// Longest accepted loan term; keeps month counts well inside `i32`
pub const MAX_LOAN_TERM_YEARS: u32 = 100;

/// Immutable, validated base parameters shared by every scenario
///
/// Amounts are in settlement currency unless noted; rent and all credit
/// amounts are in loan currency. Build one with
/// `Parameters::try_from(ParameterInput)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    apartment_cost: f64,
    exchange_rate: f64,
    down_payment: f64,
    extra_costs: f64,
    loan_term_years: u32,
    interest_rate: f64,
    insurance_rate: f64,
    maintenance_rate: f64,
    maintenance_basis: MaintenanceBasis,
    initial_rent: f64,
    discount_rate: f64,
    payment_scheme: PaymentScheme,
    scenarios: Vec<(String, ScenarioParameters)>,
}

impl TryFrom<ParameterInput> for Parameters {
    type Error = ModelError;

    fn try_from(input: ParameterInput) -> Result<Self, Self::Error> {
        require_positive("apartment_cost", input.apartment_cost)?;
        require_positive("exchange_rate", input.exchange_rate)?;
        require_non_negative("down_payment", input.down_payment)?;
        require_non_negative("extra_costs", input.extra_costs)?;
        if input.down_payment >= input.apartment_cost {
            return Err(ModelError::config(
                "down_payment",
                format!(
                    "must be less than apartment cost ({} >= {}), loan amount would not be positive",
                    input.down_payment, input.apartment_cost
                ),
            ));
        }
        if input.down_payment + input.extra_costs <= 0.0 {
            return Err(ModelError::config(
                "extra_costs",
                "initial investment (down payment + extra costs) must be positive",
            ));
        }

        if input.loan_term_years < 1 || input.loan_term_years > i64::from(MAX_LOAN_TERM_YEARS) {
            return Err(ModelError::config(
                "loan_term_years",
                format!(
                    "must be between 1 and {}, got {}",
                    MAX_LOAN_TERM_YEARS, input.loan_term_years
                ),
            ));
        }
        let loan_term_years = u32::try_from(input.loan_term_years).map_err(|_| {
            ModelError::config("loan_term_years", format!("{} is out of range", input.loan_term_years))
        })?;

        require_non_negative("interest_rate", input.interest_rate)?;
        require_non_negative("insurance_rate", input.insurance_rate)?;
        require_non_negative("maintenance_rate", input.maintenance_rate)?;
        require_non_negative("initial_rent", input.initial_rent)?;
        require_non_negative("discount_rate", input.discount_rate)?;

        let payment_scheme: PaymentScheme = input.payment_scheme.parse()?;
        let maintenance_basis: MaintenanceBasis = input.maintenance_basis.parse()?;

        if input.scenarios.is_empty() {
            return Err(ModelError::config("scenarios", "at least one scenario is required"));
        }
        for (i, (name, scenario)) in input.scenarios.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ModelError::config("scenarios", "scenario name must not be empty"));
            }
            if input.scenarios[..i].iter().any(|(other, _)| other == name) {
                return Err(ModelError::config(
                    "scenarios",
                    format!("duplicate scenario key '{}'", name),
                ));
            }
            scenario.validate(name)?;
        }

        let params = Parameters {
            apartment_cost: input.apartment_cost,
            exchange_rate: input.exchange_rate,
            down_payment: input.down_payment,
            extra_costs: input.extra_costs,
            loan_term_years,
            interest_rate: input.interest_rate,
            insurance_rate: input.insurance_rate,
            maintenance_rate: input.maintenance_rate,
            maintenance_basis,
            initial_rent: input.initial_rent,
            discount_rate: input.discount_rate,
            payment_scheme,
            scenarios: input.scenarios,
        };
        params.log_sanity_warnings();
        Ok(params)
    }
}

impl Parameters {
    /// Convert back into the loose input form (for edits and re-validation)
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
            scenarios: self.scenarios.clone(),
        }
    }

    /// Same base parameters with a different scenario set
    pub fn with_scenarios(&self, scenarios: Vec<(String, ScenarioParameters)>) -> ModelResult<Self> {
        let mut input = self.to_input();
        input.scenarios = scenarios;
        Parameters::try_from(input)
    }

    pub fn apartment_cost(&self) -> f64 {
        self.apartment_cost
    }

    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    pub fn down_payment(&self) -> f64 {
        self.down_payment
    }

    pub fn extra_costs(&self) -> f64 {
        self.extra_costs
    }

    pub fn loan_term_years(&self) -> u32 {
        self.loan_term_years
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn insurance_rate(&self) -> f64 {
        self.insurance_rate
    }

    pub fn maintenance_rate(&self) -> f64 {
        self.maintenance_rate
    }

    pub fn maintenance_basis(&self) -> MaintenanceBasis {
        self.maintenance_basis
    }

    pub fn initial_rent(&self) -> f64 {
        self.initial_rent
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn payment_scheme(&self) -> PaymentScheme {
        self.payment_scheme
    }

    pub fn scenarios(&self) -> &[(String, ScenarioParameters)] {
        &self.scenarios
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioParameters> {
        self.scenarios.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Term in months (N)
    pub fn loan_term_months(&self) -> u32 {
        self.loan_term_years * 12
    }

    pub fn monthly_interest_rate(&self) -> f64 {
        self.interest_rate / 12.0
    }

    /// Apartment cost expressed in loan currency at the purchase rate
    pub fn apartment_cost_loan_ccy(&self) -> f64 {
        self.apartment_cost * self.exchange_rate
    }

    /// Loan principal in loan currency
    pub fn loan_amount(&self) -> f64 {
        (self.apartment_cost - self.down_payment) * self.exchange_rate
    }

    /// Own cash at time zero, settlement currency
    pub fn initial_investment(&self) -> f64 {
        self.down_payment + self.extra_costs
    }

    /// Monthly insurance premium in loan currency, on the original property value
    pub fn monthly_insurance(&self) -> f64 {
        self.apartment_cost_loan_ccy() * self.insurance_rate / 12.0
    }

    fn log_sanity_warnings(&self) {
        if self.interest_rate > 0.5 {
            log::warn!("Interest rate seems very high: {:.1}%", self.interest_rate * 100.0);
        }
        if self.discount_rate > 0.2 {
            log::warn!("Discount rate seems unusual: {:.1}%", self.discount_rate * 100.0);
        }
        if self.loan_amount() < 1000.0 {
            log::warn!("Loan amount is very small: {:.2}", self.loan_amount());
        }
    }
}

fn require_finite(field: &str, value: f64) -> ModelResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::config(field, format!("must be a finite number, got {}", value)))
    }
}

fn require_positive(field: &str, value: f64) -> ModelResult<()> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::config(field, format!("must be positive, got {}", value)))
    }
}

fn require_non_negative(field: &str, value: f64) -> ModelResult<()> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::config(field, format!("cannot be negative, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::REFERENCE_CASE;
    use approx::assert_relative_eq;

    fn reference_input() -> ParameterInput {
        REFERENCE_CASE.to_input()
    }

    fn rejected_field(input: ParameterInput) -> String {
        let err = Parameters::try_from(input).unwrap_err();
        err.field().expect("configuration error").to_string()
    }

    #[test]
    fn test_derived_amounts() {
        let mut input = reference_input();
        input.apartment_cost = 50_000.0;
        input.exchange_rate = 40.0;
        input.down_payment = 10_000.0;
        input.extra_costs = 2_000.0;
        input.loan_term_years = 10;
        input.interest_rate = 0.08;
        input.insurance_rate = 0.003;

        let params = Parameters::try_from(input).unwrap();
        assert_relative_eq!(params.loan_amount(), 1_600_000.0);
        assert_eq!(params.loan_term_months(), 120);
        assert_relative_eq!(params.monthly_interest_rate(), 0.08 / 12.0);
        assert_relative_eq!(params.initial_investment(), 12_000.0);
        assert_relative_eq!(params.monthly_insurance(), 2_000_000.0 * 0.003 / 12.0);
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        let mut input = reference_input();
        input.apartment_cost = 0.0;
        assert_eq!(rejected_field(input), "apartment_cost");

        let mut input = reference_input();
        input.exchange_rate = -41.5;
        assert_eq!(rejected_field(input), "exchange_rate");

        let mut input = reference_input();
        input.down_payment = input.apartment_cost;
        assert_eq!(rejected_field(input), "down_payment");

        let mut input = reference_input();
        input.loan_term_years = -10;
        assert_eq!(rejected_field(input), "loan_term_years");

        let mut input = reference_input();
        input.interest_rate = -0.01;
        assert_eq!(rejected_field(input), "interest_rate");

        let mut input = reference_input();
        input.discount_rate = f64::NAN;
        assert_eq!(rejected_field(input), "discount_rate");
    }

    #[test]
    fn test_loan_term_bounds() {
        let mut input = reference_input();
        input.loan_term_years = i64::from(MAX_LOAN_TERM_YEARS);
        let params = Parameters::try_from(input).unwrap();
        assert_eq!(params.loan_term_months(), 1_200);

        let mut input = reference_input();
        input.loan_term_years = i64::from(MAX_LOAN_TERM_YEARS) + 1;
        assert_eq!(rejected_field(input), "loan_term_years");

        // Would overflow the month count if accepted
        let mut input = reference_input();
        input.loan_term_years = 400_000_000;
        assert_eq!(rejected_field(input), "loan_term_years");
    }

    #[test]
    fn test_rejects_zero_initial_investment() {
        let mut input = reference_input();
        input.down_payment = 0.0;
        input.extra_costs = 0.0;
        assert_eq!(rejected_field(input), "extra_costs");
    }

    #[test]
    fn test_rejects_unknown_payment_scheme() {
        let mut input = reference_input();
        input.payment_scheme = "balloon".to_string();
        assert_eq!(rejected_field(input), "payment_scheme");
    }

    #[test]
    fn test_scheme_parsing_is_case_insensitive() {
        assert_eq!("Annuity".parse::<PaymentScheme>().unwrap(), PaymentScheme::Annuity);
        assert_eq!(
            " differentiated ".parse::<PaymentScheme>().unwrap(),
            PaymentScheme::Differentiated
        );
    }

    #[test]
    fn test_scenario_validation() {
        let mut input = reference_input();
        input.scenarios.clear();
        assert_eq!(rejected_field(input), "scenarios");

        let mut input = reference_input();
        let first = input.scenarios[0].clone();
        input.scenarios.push(first);
        assert_eq!(rejected_field(input), "scenarios");

        let mut input = reference_input();
        input.scenarios = vec![("crash".to_string(), ScenarioParameters::new(0.0, 0.1, -1.0))];
        assert_eq!(rejected_field(input), "scenarios.crash.price_growth");
    }

    #[test]
    fn test_with_scenarios_revalidates() {
        let params = Parameters::try_from(reference_input()).unwrap();
        let custom = params
            .with_scenarios(vec![("flat".to_string(), ScenarioParameters::new(0.0, 0.0, 0.0))])
            .unwrap();
        assert_eq!(custom.scenarios().len(), 1);
        assert!(custom.scenario("flat").is_some());
        assert!(params.with_scenarios(Vec::new()).is_err());
    }

    #[test]
    fn test_real_rent_growth() {
        let scenario = ScenarioParameters::new(0.03, 0.13, 0.02);
        assert_relative_eq!(scenario.real_rent_growth(), -0.10);
    }
}
