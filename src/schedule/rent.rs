//! Monthly rent projection (loan currency)

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// How an annual growth rate is spread over months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthConvention {
    /// Compound every month at (1 + g)^(1/12)
    #[default]
    Monthly,
    /// Apply the full annual growth once at each 12-month boundary
    AnnualStep,
}

impl GrowthConvention {
    /// Cumulative growth factor after `months` elapsed months
    pub fn factor(&self, annual_growth: f64, months: u32) -> f64 {
        let years = match self {
            GrowthConvention::Monthly => months as f64 / 12.0,
            GrowthConvention::AnnualStep => (months / 12) as f64,
        };
        (1.0 + annual_growth).powf(years)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentScheduleRow {
    pub month: u32,
    pub rent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentSchedule {
    pub rows: Vec<RentScheduleRow>,
}

impl RentSchedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_rent(&self) -> f64 {
        self.rows.iter().map(|r| r.rent).sum()
    }
}

/// Project rent for months 1..=N; month 1 collects `initial_rent`
pub fn build_rent_schedule(
    initial_rent: f64,
    months: u32,
    annual_growth: f64,
    convention: GrowthConvention,
) -> ModelResult<RentSchedule> {
    if !(initial_rent >= 0.0) || !initial_rent.is_finite() {
        return Err(ModelError::config("initial_rent", format!("cannot be negative, got {}", initial_rent)));
    }
    if months < 1 {
        return Err(ModelError::config("loan_term_years", "term must be at least one month"));
    }
    if !(annual_growth > -1.0) || !annual_growth.is_finite() {
        return Err(ModelError::config(
            "rent_growth",
            format!("growth of {} cannot be compounded", annual_growth),
        ));
    }

    let rows: Vec<RentScheduleRow> = (1..=months)
        .map(|month| RentScheduleRow {
            month,
            rent: initial_rent * convention.factor(annual_growth, month - 1),
        })
        .collect();

    log::debug!(
        "Built rent schedule: {} months, {:.2} -> {:.2} ({:?})",
        months,
        initial_rent,
        rows.last().map(|r| r.rent).unwrap_or(initial_rent),
        convention
    );

    Ok(RentSchedule { rows })
}
