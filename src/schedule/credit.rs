//! Monthly mortgage amortization table (loan currency)

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::params::{PaymentScheme, MAX_LOAN_TERM_YEARS};

/// One month of the credit schedule, all amounts in loan currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScheduleRow {
    pub month: u32,
    pub opening_balance: f64,
    pub principal: f64,
    pub interest: f64,
    pub insurance: f64,
    pub total_payment: f64,
    /// Balance after this month's principal; exactly zero in the final month
    pub remaining_balance: f64,
}

impl CreditScheduleRow {
    /// Principal plus interest, i.e. the payment excluding insurance
    pub fn debt_service(&self) -> f64 {
        self.principal + self.interest
    }
}

/// Complete amortization table for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditSchedule {
    pub scheme: PaymentScheme,
    pub loan_amount: f64,
    pub rows: Vec<CreditScheduleRow>,
}

impl CreditSchedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_payments(&self) -> f64 {
        self.rows.iter().map(|r| r.total_payment).sum()
    }
}

/// Level payment (principal + interest) for an annuity loan
///
/// A zero rate degenerates to equal principal instalments.
pub fn annuity_payment(loan_amount: f64, months: u32, monthly_rate: f64) -> f64 {
    if monthly_rate == 0.0 {
        return loan_amount / months as f64;
    }
    let growth = (1.0 + monthly_rate).powf(months as f64);
    loan_amount * monthly_rate * growth / (growth - 1.0)
}

/// Outstanding balance after `elapsed` of `months` instalments
///
/// Closed form per scheme, so rounding does not build up over the term.
fn balance_after(loan_amount: f64, months: u32, monthly_rate: f64, elapsed: u32, scheme: PaymentScheme) -> f64 {
    if elapsed == 0 {
        return loan_amount;
    }
    if elapsed >= months {
        return 0.0;
    }
    match scheme {
        PaymentScheme::Annuity if monthly_rate != 0.0 => {
            let g = 1.0 + monthly_rate;
            let g_term = g.powf(months as f64);
            loan_amount * (g_term - g.powf(elapsed as f64)) / (g_term - 1.0)
        }
        _ => loan_amount * (months - elapsed) as f64 / months as f64,
    }
}

/// Build the amortization table
///
/// # Arguments
/// * `loan_amount` - principal in loan currency
/// * `months` - term N
/// * `annual_rate` - nominal annual interest, monthly rate is `annual_rate / 12`
/// * `monthly_insurance` - flat premium added to every payment
/// * `scheme` - differentiated or annuity
pub fn build_credit_schedule(
    loan_amount: f64,
    months: u32,
    annual_rate: f64,
    monthly_insurance: f64,
    scheme: PaymentScheme,
) -> ModelResult<CreditSchedule> {
    if !(loan_amount > 0.0) || !loan_amount.is_finite() {
        return Err(ModelError::config("loan_amount", format!("must be positive, got {}", loan_amount)));
    }
    if months < 1 || months > MAX_LOAN_TERM_YEARS * 12 {
        return Err(ModelError::config(
            "loan_term_years",
            format!("term must be between 1 and {} months, got {}", MAX_LOAN_TERM_YEARS * 12, months),
        ));
    }
    if !(annual_rate >= 0.0) || !annual_rate.is_finite() {
        return Err(ModelError::config("interest_rate", format!("cannot be negative, got {}", annual_rate)));
    }
    if !(monthly_insurance >= 0.0) || !monthly_insurance.is_finite() {
        return Err(ModelError::config(
            "insurance_rate",
            format!("insurance premium cannot be negative, got {}", monthly_insurance),
        ));
    }

    let monthly_rate = annual_rate / 12.0;
    let level_payment = annuity_payment(loan_amount, months, monthly_rate);
    let level_principal = loan_amount / months as f64;

    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let opening_balance = balance_after(loan_amount, months, monthly_rate, month - 1, scheme);
        let remaining_balance = balance_after(loan_amount, months, monthly_rate, month, scheme);
        let interest = opening_balance * monthly_rate;

        let principal = if month == months {
            // Final instalment retires the balance exactly
            opening_balance
        } else {
            match scheme {
                PaymentScheme::Differentiated => level_principal,
                PaymentScheme::Annuity => level_payment - interest,
            }
        };

        rows.push(CreditScheduleRow {
            month,
            opening_balance,
            principal,
            interest,
            insurance: monthly_insurance,
            total_payment: principal + interest + monthly_insurance,
            remaining_balance,
        });
    }

    log::debug!(
        "Built {} credit schedule: {} months, loan {:.2}, first payment {:.2}",
        scheme,
        months,
        loan_amount,
        rows.first().map(|r| r.total_payment).unwrap_or(0.0)
    );

    Ok(CreditSchedule {
        scheme,
        loan_amount,
        rows,
    })
}
