//! Monthly cashflow projection in settlement currency

mod discount;
mod engine;
mod ledger;

pub use discount::DiscountCurve;
pub use engine::{CashflowProjector, ProjectionConfig};
pub use ledger::{Ledger, LedgerRow, LedgerSummary};
