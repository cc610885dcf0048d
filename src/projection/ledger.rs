//! Monthly settlement-currency ledger produced by one scenario run

use serde::{Deserialize, Serialize};

/// One month of the ledger, amounts in settlement currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub month: u32,

    // Flows (nominal)
    pub rent_income: f64,
    pub mortgage_outlay: f64,
    /// Principal share of the mortgage outlay
    pub principal_repaid: f64,
    pub maintenance_outlay: f64,
    pub net_cashflow: f64,
    pub cumulative_net_cashflow: f64,

    // Valuation
    pub property_value: f64,
    pub discount_factor: f64,
    pub discounted_net_cashflow: f64,
}

/// Ordered monthly ledger for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub scenario: String,
    pub rows: Vec<LedgerRow>,
}

impl Ledger {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: LedgerRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Property value in the final month, i.e. nominal sale proceeds
    pub fn sale_price(&self) -> f64 {
        self.rows.last().map(|r| r.property_value).unwrap_or(0.0)
    }

    /// Discount factor of the final month
    pub fn terminal_discount_factor(&self) -> f64 {
        self.rows.last().map(|r| r.discount_factor).unwrap_or(1.0)
    }

    /// Nominal net operating cashflows, month 1 first
    pub fn net_cashflows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.net_cashflow).collect()
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            total_months: self.rows.len() as u32,
            ..Default::default()
        };

        for row in &self.rows {
            summary.total_rent += row.rent_income;
            summary.total_mortgage += row.mortgage_outlay;
            summary.total_principal += row.principal_repaid;
            summary.total_maintenance += row.maintenance_outlay;
            summary.total_net_cashflow += row.net_cashflow;
            summary.discounted_rent += row.rent_income * row.discount_factor;
            summary.discounted_mortgage += row.mortgage_outlay * row.discount_factor;
            summary.discounted_net_cashflow += row.discounted_net_cashflow;
        }
        summary.final_property_value = self.sale_price();
        summary
    }
}

/// Totals over a ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_months: u32,
    pub total_rent: f64,
    pub total_mortgage: f64,
    pub total_principal: f64,
    pub total_maintenance: f64,
    pub total_net_cashflow: f64,
    pub discounted_rent: f64,
    pub discounted_mortgage: f64,
    pub discounted_net_cashflow: f64,
    pub final_property_value: f64,
}
