//! Load model parameters from JSON and scenario tables from CSV

use csv::{ReaderBuilder, Trim};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;

use super::data::{Parameters, ScenarioParameters};
use super::defaults::REFERENCE_CASE;
use crate::error::{ModelError, ModelResult};

/// Loosely typed input object, as received from an external caller
///
/// Rates are fractions (0.07 = 7%). Nothing here is validated; convert with
/// `Parameters::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInput {
    #[serde(alias = "apartment_cost_usd")]
    pub apartment_cost: f64,
    #[serde(alias = "fx_today")]
    pub exchange_rate: f64,
    #[serde(alias = "downpayment_usd")]
    pub down_payment: f64,
    #[serde(default, alias = "extra_purchase_costs_usd")]
    pub extra_costs: f64,
    pub loan_term_years: i64,
    #[serde(alias = "interest_annual")]
    pub interest_rate: f64,
    #[serde(default = "default_payment_scheme", alias = "payment_type")]
    pub payment_scheme: String,
    #[serde(alias = "rent_initial_uah")]
    pub initial_rent: f64,
    #[serde(default = "default_insurance_rate", alias = "insurance_annual")]
    pub insurance_rate: f64,
    #[serde(default = "default_maintenance_rate", alias = "maintenance_annual")]
    pub maintenance_rate: f64,
    #[serde(default = "default_maintenance_basis")]
    pub maintenance_basis: String,
    #[serde(default = "default_discount_rate", alias = "usd_discount_annual")]
    pub discount_rate: f64,
    #[serde(
        default = "default_scenarios",
        deserialize_with = "deserialize_scenarios",
        serialize_with = "serialize_scenarios"
    )]
    pub scenarios: Vec<(String, ScenarioParameters)>,
}

fn default_payment_scheme() -> String {
    REFERENCE_CASE.payment_scheme.to_string()
}
fn default_insurance_rate() -> f64 { REFERENCE_CASE.insurance_rate }
fn default_maintenance_rate() -> f64 { REFERENCE_CASE.maintenance_rate }
fn default_maintenance_basis() -> String {
    REFERENCE_CASE.maintenance_basis.to_string()
}
fn default_discount_rate() -> f64 { REFERENCE_CASE.discount_rate }
fn default_scenarios() -> Vec<(String, ScenarioParameters)> {
    REFERENCE_CASE.scenario_list()
}

/// Scenario mappings keep input order and every entry, repeated keys
/// included, so `Parameters::try_from` can reject duplicates a plain map
/// type would silently overwrite.
fn deserialize_scenarios<'de, D>(deserializer: D) -> Result<Vec<(String, ScenarioParameters)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScenarioMapVisitor;

    impl<'de> Visitor<'de> for ScenarioMapVisitor {
        type Value = Vec<(String, ScenarioParameters)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of scenario name to scenario parameters")
        }

        fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
            let mut scenarios: Vec<(String, ScenarioParameters)> = Vec::new();
            while let Some(entry) = access.next_entry::<String, ScenarioParameters>()? {
                scenarios.push(entry);
            }
            Ok(scenarios)
        }
    }

    deserializer.deserialize_map(ScenarioMapVisitor)
}

fn serialize_scenarios<S>(scenarios: &[(String, ScenarioParameters)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(scenarios.len()))?;
    for (name, scenario) in scenarios {
        map.serialize_entry(name, scenario)?;
    }
    map.end()
}

/// Parse and validate parameters from a JSON document
pub fn parameters_from_json(json: &str) -> ModelResult<Parameters> {
    let input: ParameterInput = serde_json::from_str(json)?;
    Parameters::try_from(input)
}

/// Load and validate parameters from a JSON file
pub fn load_parameters<P: AsRef<Path>>(path: P) -> ModelResult<Parameters> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| ModelError::Parse(format!("{}: {}", path.display(), e)))?;
    parameters_from_json(&json)
}

/// Raw CSV row of a scenario table
#[derive(Debug, Deserialize)]
struct ScenarioCsvRow {
    name: String,
    rent_growth: f64,
    inflation: f64,
    price_growth: f64,
}

/// Load scenarios from any reader with header `name,rent_growth,inflation,price_growth`
///
/// Rows are returned in file order; validation happens when the scenarios are
/// attached to `Parameters`.
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> ModelResult<Vec<(String, ScenarioParameters)>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut scenarios = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ScenarioCsvRow = result?;
        scenarios.push((
            row.name,
            ScenarioParameters::new(row.rent_growth, row.inflation, row.price_growth),
        ));
    }

    Ok(scenarios)
}

/// Load scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> ModelResult<Vec<(String, ScenarioParameters)>> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .map_err(|e| ModelError::Parse(format!("{}: {}", path.display(), e)))?;
    load_scenarios_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MaintenanceBasis, PaymentScheme};
    use approx::assert_relative_eq;

    const MINIMAL: &str = r#"{
        "apartment_cost": 50000,
        "exchange_rate": 40,
        "down_payment": 10000,
        "extra_costs": 2000,
        "loan_term_years": 10,
        "interest_rate": 0.08,
        "initial_rent": 10000
    }"#;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let params = parameters_from_json(MINIMAL).unwrap();
        assert_eq!(params.payment_scheme(), PaymentScheme::Differentiated);
        assert_eq!(params.maintenance_basis(), MaintenanceBasis::PropertyValue);
        assert_relative_eq!(params.insurance_rate(), 0.0025);
        assert_relative_eq!(params.maintenance_rate(), 0.01);
        assert_relative_eq!(params.discount_rate(), 0.03);

        let names: Vec<&str> = params.scenarios().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["pessimistic", "base", "optimistic"]);
    }

    #[test]
    fn test_scenarios_keep_input_order() {
        let json = r#"{
            "apartment_cost": 50000, "exchange_rate": 40, "down_payment": 10000,
            "loan_term_years": 10, "interest_rate": 0.08, "initial_rent": 10000,
            "payment_scheme": "annuity",
            "scenarios": {
                "zeta": {"rent_growth": 0.01, "inflation": 0.05, "price_growth": 0.0},
                "alpha": {"rent_growth_annual": 0.02, "inflation_uah_annual": 0.06, "price_growth_annual_usd": 0.01}
            }
        }"#;
        let params = parameters_from_json(json).unwrap();
        assert_eq!(params.payment_scheme(), PaymentScheme::Annuity);
        assert_eq!(params.scenarios()[0].0, "zeta");
        assert_eq!(params.scenarios()[1].0, "alpha");
        assert_relative_eq!(params.scenarios()[1].1.price_growth, 0.01);
    }

    #[test]
    fn test_duplicate_scenario_keys_rejected() {
        let json = r#"{
            "apartment_cost": 50000, "exchange_rate": 40, "down_payment": 10000,
            "loan_term_years": 10, "interest_rate": 0.08, "initial_rent": 10000,
            "scenarios": {
                "base": {"rent_growth": 0.0, "inflation": 0.1, "price_growth": 0.0},
                "base": {"rent_growth": 0.03, "inflation": 0.1, "price_growth": 0.02}
            }
        }"#;
        let err = parameters_from_json(json).unwrap_err();
        assert_eq!(err.field(), Some("scenarios"));
        assert!(err.to_string().contains("'base'"), "{}", err);

        // Names are reported whole, whatever they contain
        let input: ParameterInput = serde_json::from_str(&json.replace("\"base\"", "\"sold at line 3\"")).unwrap();
        assert_eq!(input.scenarios.len(), 2);
        let err = Parameters::try_from(input).unwrap_err();
        assert!(err.to_string().contains("'sold at line 3'"), "{}", err);
    }

    #[test]
    fn test_unknown_scheme_is_configuration_error() {
        let json = MINIMAL.replace("\"initial_rent\"", "\"payment_scheme\": \"interest_only\", \"initial_rent\"");
        let err = parameters_from_json(&json).unwrap_err();
        assert_eq!(err.field(), Some("payment_scheme"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parameters_from_json("{\"apartment_cost\": }").unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn test_input_round_trips_through_json() {
        let params = parameters_from_json(MINIMAL).unwrap();
        let json = serde_json::to_string(&params.to_input()).unwrap();
        assert_eq!(parameters_from_json(&json).unwrap(), params);
    }

    #[test]
    fn test_load_scenarios_from_csv() {
        let data = "name,rent_growth,inflation,price_growth\n\
                    stagnation,-0.02,0.15,-0.03\n\
                    boom, 0.05,0.08,0.04\n";
        let scenarios = load_scenarios_from_reader(data.as_bytes()).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].0, "stagnation");
        assert_relative_eq!(scenarios[1].1.rent_growth, 0.05);
    }

    #[test]
    fn test_bad_csv_row_is_parse_error() {
        let data = "name,rent_growth,inflation,price_growth\nbase,abc,0.1,0.0\n";
        let err = load_scenarios_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }
}
