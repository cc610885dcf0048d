//! Investment metrics over a projected ledger

use serde::{Deserialize, Serialize};

use super::irr::{monthly_equivalent, solve_irr, IrrConfig, IrrOutcome};
use crate::error::{ModelError, ModelResult};
use crate::projection::Ledger;

/// Headline metrics for one scenario, settlement currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub initial_investment: f64,
    pub npv_without_sale: f64,
    pub npv_with_sale: f64,
    /// Annual IRR of the stream including the sale; None when no root exists
    pub irr: Option<f64>,
    pub irr_monthly: Option<f64>,
    /// NPV with sale over initial investment
    pub roi: f64,

    // Nominal totals
    pub total_rent_nominal: f64,
    pub total_mortgage_nominal: f64,
    pub total_principal_nominal: f64,
    pub total_maintenance_nominal: f64,
    pub total_net_cashflow_nominal: f64,
    pub sale_price_nominal: f64,

    // Discounted totals
    pub total_rent_discounted: f64,
    pub total_mortgage_discounted: f64,
    pub sale_price_discounted: f64,
}

/// Computes NPV, IRR and ROI from a ledger
pub struct MetricsEngine {
    discount_rate: f64,
    irr: IrrConfig,
}

impl MetricsEngine {
    pub fn new(discount_rate: f64, irr: IrrConfig) -> Self {
        Self { discount_rate, irr }
    }

    /// Evaluate a ledger against the cash put in at month 0.
    ///
    /// The sale is assumed to happen at the end of the final month, so its
    /// proceeds join that month's net cashflow in the IRR stream.
    pub fn evaluate(&self, initial_investment: f64, ledger: &Ledger) -> ModelResult<Metrics> {
        if initial_investment == 0.0 {
            return Err(ModelError::DivisionUndefined {
                context: "roi with zero initial investment".to_string(),
            });
        }

        let summary = ledger.summary();
        let sale_price = ledger.sale_price();
        let sale_price_discounted = sale_price * ledger.terminal_discount_factor();

        let npv_without_sale = -initial_investment + summary.discounted_net_cashflow;
        let npv_with_sale = npv_without_sale + sale_price_discounted;

        let cashflows = self.irr_stream(initial_investment, ledger);
        let guess = if self.discount_rate > 0.0 { self.discount_rate } else { 0.10 };
        let outcome = solve_irr(&cashflows, guess, &self.irr);

        match outcome {
            IrrOutcome::Converged { rate, iterations } => log::debug!(
                "IRR for '{}' converged to {:.6} in {} iterations",
                ledger.scenario,
                rate,
                iterations
            ),
            IrrOutcome::NoSolution(reason) => log::warn!(
                "No IRR for '{}': {:?}",
                ledger.scenario,
                reason
            ),
        }

        let irr = outcome.rate();

        Ok(Metrics {
            initial_investment,
            npv_without_sale,
            npv_with_sale,
            irr,
            irr_monthly: irr.map(monthly_equivalent),
            roi: npv_with_sale / initial_investment,
            total_rent_nominal: summary.total_rent,
            total_mortgage_nominal: summary.total_mortgage,
            total_principal_nominal: summary.total_principal,
            total_maintenance_nominal: summary.total_maintenance,
            total_net_cashflow_nominal: summary.total_net_cashflow,
            sale_price_nominal: sale_price,
            total_rent_discounted: summary.discounted_rent,
            total_mortgage_discounted: summary.discounted_mortgage,
            sale_price_discounted,
        })
    }

    /// Month-indexed stream: -I at 0, net flows after, sale added to the last month
    fn irr_stream(&self, initial_investment: f64, ledger: &Ledger) -> Vec<f64> {
        let mut cashflows = Vec::with_capacity(ledger.len() + 1);
        cashflows.push(-initial_investment);
        cashflows.extend(ledger.rows.iter().map(|r| r.net_cashflow));
        if let Some(last) = cashflows.last_mut().filter(|_| !ledger.is_empty()) {
            *last += ledger.sale_price();
        }
        cashflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::npv_at_rate;
    use crate::projection::LedgerRow;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn ledger_from(nets: &[f64], sale: f64, annual_rate: f64) -> Ledger {
        let mut ledger = Ledger::new("test");
        let mut cumulative = 0.0;
        for (i, &net) in nets.iter().enumerate() {
            let month = i as u32 + 1;
            let discount_factor = (1.0 + annual_rate).powf(-(month as f64) / 12.0);
            cumulative += net;
            ledger.add_row(LedgerRow {
                month,
                rent_income: net.max(0.0),
                mortgage_outlay: (-net).max(0.0),
                principal_repaid: 0.0,
                maintenance_outlay: 0.0,
                net_cashflow: net,
                cumulative_net_cashflow: cumulative,
                property_value: sale,
                discount_factor,
                discounted_net_cashflow: net * discount_factor,
            });
        }
        ledger
    }

    #[test]
    fn test_zero_discount_npv_is_plain_sum() {
        let nets = [-50.0, 20.0, 30.0, 10.0];
        let ledger = ledger_from(&nets, 500.0, 0.0);
        let metrics = MetricsEngine::new(0.0, IrrConfig::default())
            .evaluate(100.0, &ledger)
            .unwrap();

        assert_relative_eq!(metrics.npv_without_sale, -100.0 + 10.0);
        assert_relative_eq!(metrics.npv_with_sale, -100.0 + 10.0 + 500.0);
        assert_relative_eq!(metrics.sale_price_discounted, 500.0);
        assert_relative_eq!(metrics.roi, 4.1);
    }

    #[test]
    fn test_sale_is_discounted_at_horizon() {
        let nets = vec![0.0; 12];
        let ledger = ledger_from(&nets, 110.0, 0.10);
        let metrics = MetricsEngine::new(0.10, IrrConfig::default())
            .evaluate(100.0, &ledger)
            .unwrap();

        assert_relative_eq!(metrics.sale_price_discounted, 100.0, max_relative = 1e-12);
        assert_abs_diff_eq!(metrics.npv_with_sale, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.roi, 0.0, epsilon = 1e-9);
        // NPV at the discount rate is zero, so IRR equals that rate
        assert_abs_diff_eq!(metrics.irr.unwrap(), 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_irr_zeroes_stream_npv() {
        let nets = vec![-5.0, 12.0, 8.0, 4.0, 4.0, 4.0];
        let ledger = ledger_from(&nets, 90.0, 0.05);
        let metrics = MetricsEngine::new(0.05, IrrConfig::default())
            .evaluate(100.0, &ledger)
            .unwrap();

        let irr = metrics.irr.unwrap();
        let stream = [-100.0, -5.0, 12.0, 8.0, 4.0, 4.0, 94.0];
        assert_abs_diff_eq!(npv_at_rate(&stream, irr), 0.0, epsilon = 1e-6);
        assert_relative_eq!(
            (1.0 + metrics.irr_monthly.unwrap()).powi(12),
            1.0 + irr,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_no_irr_when_every_flow_is_outgoing() {
        let nets = vec![-10.0; 6];
        let ledger = ledger_from(&nets, 0.0, 0.03);
        let metrics = MetricsEngine::new(0.03, IrrConfig::default())
            .evaluate(100.0, &ledger)
            .unwrap();

        assert!(metrics.irr.is_none());
        assert!(metrics.irr_monthly.is_none());
        assert!(metrics.npv_with_sale < -100.0);
    }

    #[test]
    fn test_zero_investment_is_undefined() {
        let ledger = ledger_from(&[1.0], 10.0, 0.0);
        let result = MetricsEngine::new(0.0, IrrConfig::default()).evaluate(0.0, &ledger);
        assert!(matches!(result, Err(ModelError::DivisionUndefined { .. })));
    }

    #[test]
    fn test_nominal_totals() {
        let ledger = ledger_from(&[30.0, -10.0], 200.0, 0.0);
        let metrics = MetricsEngine::new(0.0, IrrConfig::default())
            .evaluate(50.0, &ledger)
            .unwrap();

        assert_relative_eq!(metrics.total_rent_nominal, 30.0);
        assert_relative_eq!(metrics.total_mortgage_nominal, 10.0);
        assert_relative_eq!(metrics.total_net_cashflow_nominal, 20.0);
        assert_relative_eq!(metrics.sale_price_nominal, 200.0);
    }
}
