//! NPV, IRR and ROI

mod engine;
mod irr;

pub use engine::{Metrics, MetricsEngine};
pub use irr::{monthly_equivalent, npv_at_rate, solve_irr, IrrConfig, IrrOutcome, NoSolutionReason};
