//! Internal Rate of Return (IRR) calculation
//!
//! Cashflows are indexed by month (index 0 = time zero) and the solved rate
//! is annual: sum of CF_t / (1 + r)^(t/12) = 0.

use serde::{Deserialize, Serialize};

/// Root-finder settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrConfig {
    /// Iteration cap for each of the Newton and bisection phases
    pub max_iterations: u32,
    /// Absolute NPV residual accepted as a root (settlement currency)
    pub tolerance: f64,
    /// Bisection bracket on the annual rate
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            lower_bound: -0.99, // -99%
            upper_bound: 10.0,  // +1000%
        }
    }
}

/// Why no IRR was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoSolutionReason {
    EmptyStream,
    /// Every cashflow has the same sign (or is zero)
    NoSignChange,
    /// NPV does not change sign across the bracket
    NoBracket,
    /// Iteration cap reached
    NotConverged,
}

/// Result of the root search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IrrOutcome {
    Converged { rate: f64, iterations: u32 },
    NoSolution(NoSolutionReason),
}

impl IrrOutcome {
    /// Annual rate when converged
    pub fn rate(&self) -> Option<f64> {
        match self {
            IrrOutcome::Converged { rate, .. } => Some(*rate),
            IrrOutcome::NoSolution(_) => None,
        }
    }
}

/// Solve for the annual IRR of a monthly cashflow stream.
///
/// Newton-Raphson from `guess`, falling back to bisection over the configured
/// bracket when the derivative vanishes or an iterate leaves the bracket.
///
/// # Arguments
/// * `cashflows` - `cashflows[t]` occurs at month t (positive = inflow)
/// * `guess` - starting annual rate
/// * `config` - iteration cap, tolerance and bracket
pub fn solve_irr(cashflows: &[f64], guess: f64, config: &IrrConfig) -> IrrOutcome {
    if cashflows.is_empty() {
        return IrrOutcome::NoSolution(NoSolutionReason::EmptyStream);
    }

    // At least one sign change is required for a root to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return IrrOutcome::NoSolution(NoSolutionReason::NoSignChange);
    }

    let mut rate = guess.clamp(config.lower_bound, config.upper_bound);

    for iteration in 1..=config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if npv.abs() < config.tolerance {
            return IrrOutcome::Converged { rate, iterations: iteration };
        }

        if !dnpv.is_finite() || dnpv.abs() < 1e-12 {
            // Derivative too small, try bisection instead
            break;
        }

        let new_rate = rate - npv / dnpv;
        if !new_rate.is_finite() || new_rate <= config.lower_bound || new_rate >= config.upper_bound {
            break;
        }

        // Step below rounding noise: the residual cannot shrink any further
        if (new_rate - rate).abs() < 1e-14 * (1.0 + rate.abs()) {
            return IrrOutcome::Converged { rate: new_rate, iterations: iteration };
        }

        rate = new_rate;
    }

    solve_irr_bisection(cashflows, config)
}

/// Fallback IRR calculation using bisection
fn solve_irr_bisection(cashflows: &[f64], config: &IrrConfig) -> IrrOutcome {
    let mut low = config.lower_bound;
    let mut high = config.upper_bound;

    let mut npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    if npv_low.abs() < config.tolerance {
        return IrrOutcome::Converged { rate: low, iterations: 0 };
    }
    if npv_high.abs() < config.tolerance {
        return IrrOutcome::Converged { rate: high, iterations: 0 };
    }
    // Check that we have a root in this interval
    if !(npv_low * npv_high < 0.0) {
        return IrrOutcome::NoSolution(NoSolutionReason::NoBracket);
    }

    for iteration in 1..=config.max_iterations {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < config.tolerance || (high - low) / 2.0 < 1e-12 {
            return IrrOutcome::Converged { rate: mid, iterations: iteration };
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    IrrOutcome::NoSolution(NoSolutionReason::NotConverged)
}

/// NPV at an annual rate and its derivative with respect to the rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let years = t as f64 / 12.0;
        let discount = (1.0 + rate).powf(-years);
        npv += cf * discount;
        if t > 0 {
            dnpv -= years * cf * discount / (1.0 + rate);
        }
    }

    (npv, dnpv)
}

/// NPV of a monthly stream at an annual rate
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf * (1.0 + rate).powf(-(t as f64) / 12.0))
        .sum()
}

/// Monthly rate equivalent to an annual rate
pub fn monthly_equivalent(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}
