//! Factorial scenario grid
//!
//! Crosses inflation levels, rent growth relative to inflation and price
//! growth into one named scenario per combination.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::ScenarioParameters;
use crate::scenario::ScenarioResult;

/// One labelled level of a grid factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorLevel {
    pub label: String,
    pub value: f64,
}

impl FactorLevel {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Three-factor grid: inflation x rent delta x price growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGrid {
    pub inflation: Vec<FactorLevel>,
    /// Added to inflation to give the rent growth
    pub rent_delta: Vec<FactorLevel>,
    pub price_growth: Vec<FactorLevel>,
}

impl Default for ScenarioGrid {
    fn default() -> Self {
        Self {
            inflation: vec![
                FactorLevel::new("low_inf", 0.06),
                FactorLevel::new("med_inf", 0.10),
                FactorLevel::new("high_inf", 0.15),
            ],
            rent_delta: vec![
                FactorLevel::new("rent_lags", -0.04),
                FactorLevel::new("rent_match", 0.0),
                FactorLevel::new("rent_leads", 0.03),
            ],
            price_growth: vec![
                FactorLevel::new("price_falls", -0.02),
                FactorLevel::new("price_stable", 0.01),
                FactorLevel::new("price_grows", 0.04),
            ],
        }
    }
}

impl ScenarioGrid {
    pub fn len(&self) -> usize {
        self.inflation.len() * self.rent_delta.len() * self.price_growth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, named `<inflation>_<rent>_<price>`
    pub fn scenarios(&self) -> Vec<(String, ScenarioParameters)> {
        self.combinations()
            .map(|(i, r, p)| {
                let inflation = self.inflation[i].value;
                (
                    self.scenario_name(i, r, p),
                    ScenarioParameters::new(inflation + self.rent_delta[r].value, inflation, self.price_growth[p].value),
                )
            })
            .collect()
    }

    /// Distribution statistics and per-factor mean NPV over a grid run
    ///
    /// Grid scenarios missing from `results` are skipped.
    pub fn summarize(&self, results: &BTreeMap<String, ScenarioResult>, discount_rate: f64) -> FactorialSummary {
        let mut inflation = FactorAccumulator::new(&self.inflation);
        let mut rent_delta = FactorAccumulator::new(&self.rent_delta);
        let mut price_growth = FactorAccumulator::new(&self.price_growth);

        let mut npvs = Vec::new();
        let mut irrs = Vec::new();
        let mut rois = Vec::new();

        for (i, r, p) in self.combinations() {
            let Some(result) = results.get(&self.scenario_name(i, r, p)) else {
                continue;
            };
            let npv = result.metrics.npv_with_sale;
            inflation.add(i, npv);
            rent_delta.add(r, npv);
            price_growth.add(p, npv);

            npvs.push(npv);
            rois.push(result.metrics.roi);
            if let Some(irr) = result.metrics.irr {
                irrs.push(irr);
            }
        }

        let summary = FactorialSummary {
            scenario_count: npvs.len(),
            profitable: npvs.iter().filter(|&&npv| npv > 0.0).count(),
            beats_discount_rate: irrs.iter().filter(|&&irr| irr > discount_rate).count(),
            npv: Distribution::from_values(npvs),
            irr: Distribution::from_values(irrs),
            roi: Distribution::from_values(rois),
            mean_npv_by_inflation: inflation.finish(),
            mean_npv_by_rent_delta: rent_delta.finish(),
            mean_npv_by_price_growth: price_growth.finish(),
        };

        log::debug!(
            "Grid summary: {} scenarios, {} profitable, {} beat {:.2}%",
            summary.scenario_count,
            summary.profitable,
            summary.beats_discount_rate,
            discount_rate * 100.0
        );
        summary
    }

    /// (inflation, rent, price) level indices, price varying fastest
    fn combinations(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.inflation.len()).flat_map(move |i| {
            (0..self.rent_delta.len())
                .flat_map(move |r| (0..self.price_growth.len()).map(move |p| (i, r, p)))
        })
    }

    fn scenario_name(&self, i: usize, r: usize, p: usize) -> String {
        format!(
            "{}_{}_{}",
            self.inflation[i].label, self.rent_delta[r].label, self.price_growth[p].label
        )
    }
}

/// Min / median / mean / max of one metric across scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

impl Distribution {
    /// None for an empty sample
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let n = values.len();
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };

        Some(Self {
            count: n,
            min: values[0],
            median,
            mean: values.iter().sum::<f64>() / n as f64,
            max: values[n - 1],
        })
    }
}

/// Mean NPV with sale over the scenarios sharing one factor level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorMean {
    pub label: String,
    pub scenarios: usize,
    pub mean_npv: Option<f64>,
}

/// Analysis of a factorial grid run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorialSummary {
    pub scenario_count: usize,
    /// Scenarios with NPV with sale above zero
    pub profitable: usize,
    /// Scenarios whose IRR exceeds the discount rate
    pub beats_discount_rate: usize,
    pub npv: Option<Distribution>,
    /// Over scenarios that have an IRR
    pub irr: Option<Distribution>,
    pub roi: Option<Distribution>,
    pub mean_npv_by_inflation: Vec<FactorMean>,
    pub mean_npv_by_rent_delta: Vec<FactorMean>,
    pub mean_npv_by_price_growth: Vec<FactorMean>,
}

struct FactorAccumulator<'a> {
    levels: &'a [FactorLevel],
    sums: Vec<(f64, usize)>,
}

impl<'a> FactorAccumulator<'a> {
    fn new(levels: &'a [FactorLevel]) -> Self {
        Self {
            levels,
            sums: vec![(0.0, 0); levels.len()],
        }
    }

    fn add(&mut self, level: usize, npv: f64) {
        if let Some((sum, count)) = self.sums.get_mut(level) {
            *sum += npv;
            *count += 1;
        }
    }

    fn finish(self) -> Vec<FactorMean> {
        self.levels
            .iter()
            .zip(self.sums)
            .map(|(level, (sum, count))| FactorMean {
                label: level.label.clone(),
                scenarios: count,
                mean_npv: (count > 0).then(|| sum / count as f64),
            })
            .collect()
    }
}

/// Scenario results ordered by NPV with sale, best first
pub fn rank_by_npv(results: &BTreeMap<String, ScenarioResult>) -> Vec<(&str, &ScenarioResult)> {
    let mut ranked: Vec<_> = results.iter().map(|(name, r)| (name.as_str(), r)).collect();
    ranked.sort_by(|a, b| b.1.metrics.npv_with_sale.total_cmp(&a.1.metrics.npv_with_sale));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Parameters, REFERENCE_CASE};
    use crate::scenario::ScenarioRunner;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_grid_has_27_scenarios() {
        let grid = ScenarioGrid::default();
        let scenarios = grid.scenarios();

        assert_eq!(grid.len(), 27);
        assert_eq!(scenarios.len(), 27);
        assert_eq!(scenarios[0].0, "low_inf_rent_lags_price_falls");
        assert_eq!(scenarios[26].0, "high_inf_rent_leads_price_grows");
    }

    #[test]
    fn test_rent_growth_is_inflation_plus_delta() {
        let scenarios = ScenarioGrid::default().scenarios();
        let (_, lagging) = scenarios
            .iter()
            .find(|(name, _)| name == "med_inf_rent_lags_price_stable")
            .unwrap();

        assert_relative_eq!(lagging.rent_growth, 0.06, max_relative = 1e-12);
        assert_relative_eq!(lagging.inflation, 0.10);
        assert_relative_eq!(lagging.price_growth, 0.01);
        assert_relative_eq!(lagging.real_rent_growth(), -0.04, max_relative = 1e-9);
    }

    fn reference_grid_results() -> BTreeMap<String, ScenarioResult> {
        let params = Parameters::try_from(REFERENCE_CASE.to_input())
            .unwrap()
            .with_scenarios(ScenarioGrid::default().scenarios())
            .unwrap();
        ScenarioRunner::default().run(&params).unwrap()
    }

    fn mean_of(means: &[FactorMean], label: &str) -> f64 {
        means.iter().find(|m| m.label == label).unwrap().mean_npv.unwrap()
    }

    #[test]
    fn test_rank_by_npv_is_descending() {
        let results = reference_grid_results();
        let ranked = rank_by_npv(&results);

        assert_eq!(ranked.len(), 27);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].1.metrics.npv_with_sale >= w[1].1.metrics.npv_with_sale));
        // Highest rent growth with rising prices comes out on top
        assert_eq!(ranked[0].0, "high_inf_rent_leads_price_grows");
    }

    #[test]
    fn test_grid_summary() {
        let results = reference_grid_results();
        let grid = ScenarioGrid::default();
        let summary = grid.summarize(&results, 0.03);
        let ranked = rank_by_npv(&results);

        assert_eq!(summary.scenario_count, 27);
        let npv = summary.npv.as_ref().unwrap();
        assert_eq!(npv.count, 27);
        assert_eq!(npv.max, ranked[0].1.metrics.npv_with_sale);
        assert_eq!(npv.min, ranked[26].1.metrics.npv_with_sale);
        assert_eq!(npv.median, ranked[13].1.metrics.npv_with_sale);
        assert!(npv.min <= npv.mean && npv.mean <= npv.max);

        let profitable = results.values().filter(|r| r.metrics.npv_with_sale > 0.0).count();
        assert_eq!(summary.profitable, profitable);
        assert!(summary.beats_discount_rate <= summary.irr.as_ref().map_or(0, |d| d.count));

        // Each level of a 3x3x3 grid covers 9 scenarios
        for means in [
            &summary.mean_npv_by_inflation,
            &summary.mean_npv_by_rent_delta,
            &summary.mean_npv_by_price_growth,
        ] {
            assert_eq!(means.len(), 3);
            assert!(means.iter().all(|m| m.scenarios == 9));
        }

        let price = &summary.mean_npv_by_price_growth;
        assert!(mean_of(price, "price_grows") > mean_of(price, "price_stable"));
        assert!(mean_of(price, "price_stable") > mean_of(price, "price_falls"));
        let rent = &summary.mean_npv_by_rent_delta;
        assert!(mean_of(rent, "rent_leads") > mean_of(rent, "rent_lags"));

        // Balanced grid: the level means average back to the overall mean
        let by_inflation: f64 = summary
            .mean_npv_by_inflation
            .iter()
            .map(|m| m.mean_npv.unwrap())
            .sum::<f64>()
            / 3.0;
        assert_relative_eq!(by_inflation, npv.mean, max_relative = 1e-9);
    }

    #[test]
    fn test_summary_skips_missing_scenarios() {
        let summary = ScenarioGrid::default().summarize(&BTreeMap::new(), 0.03);

        assert_eq!(summary.scenario_count, 0);
        assert_eq!(summary.profitable, 0);
        assert!(summary.npv.is_none());
        assert!(summary.mean_npv_by_price_growth.iter().all(|m| m.mean_npv.is_none()));
    }

    #[test]
    fn test_distribution() {
        let even = Distribution::from_values(vec![3.0, 1.0, 10.0, 2.0]).unwrap();
        assert_eq!(even.count, 4);
        assert_relative_eq!(even.min, 1.0);
        assert_relative_eq!(even.median, 2.5);
        assert_relative_eq!(even.mean, 4.0);
        assert_relative_eq!(even.max, 10.0);

        let odd = Distribution::from_values(vec![5.0, 1.0, 3.0]).unwrap();
        assert_relative_eq!(odd.median, 3.0);

        assert!(Distribution::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_empty_factor_gives_empty_grid() {
        let grid = ScenarioGrid {
            price_growth: Vec::new(),
            ..Default::default()
        };
        assert!(grid.is_empty());
        assert!(grid.scenarios().is_empty());
    }
}
