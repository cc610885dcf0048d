//! Settlement-currency discounting

use serde::{Deserialize, Serialize};

/// Flat annual discount rate applied with monthly fractional exponents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Annual discount rate (fraction)
    pub annual_rate: f64,
}

impl DiscountCurve {
    pub fn new(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    /// Equivalent monthly rate, (1 + r)^(1/12) - 1
    pub fn monthly_rate(&self) -> f64 {
        (1.0 + self.annual_rate).powf(1.0 / 12.0) - 1.0
    }

    /// Discount factor to month `m`: (1 + r)^(-m/12)
    pub fn factor(&self, month: u32) -> f64 {
        (1.0 + self.annual_rate).powf(-(month as f64) / 12.0)
    }

    /// Present value of (month, amount) pairs
    pub fn present_value(&self, amounts: &[(u32, f64)]) -> f64 {
        amounts
            .iter()
            .map(|(month, amount)| amount * self.factor(*month))
            .sum()
    }
}
