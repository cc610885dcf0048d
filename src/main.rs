//! Rental Investment CLI
//!
//! Command-line interface for running rental investment projections

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use rental_investment::factorial::{Distribution, FactorMean, FactorialSummary};
use rental_investment::params::{load_parameters, load_scenarios};
use rental_investment::{
    rank_by_npv, Metrics, Parameters, ProjectionConfig, ScenarioGrid, ScenarioParameters,
    ScenarioResult, ScenarioRunner, REFERENCE_CASE,
};

/// Mortgage-financed rental property projections
#[derive(Parser)]
#[command(name = "rental-investment", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scenario of a parameter set
    Compute(ComputeArgs),
    /// Run the factorial scenario grid and rank by NPV with sale
    Factorial(FactorialArgs),
}

#[derive(Args)]
struct ComputeArgs {
    /// Parameter file (JSON); the reference case when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Replace the scenario set with a CSV table (name,rent_growth,inflation,price_growth)
    #[arg(long)]
    scenarios_csv: Option<PathBuf>,

    /// Apply annual growth in yearly steps instead of monthly compounding
    #[arg(long)]
    annual_steps: bool,

    /// Print metrics and ledgers as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FactorialArgs {
    /// Parameter file (JSON); the reference case when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print the ranking as JSON
    #[arg(long)]
    json: bool,
}

/// JSON envelope around every run
#[derive(Serialize)]
struct RunOutput<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    parameters: &'a Parameters,
    results: T,
}

#[derive(Serialize)]
struct FactorialOutput<'a> {
    summary: FactorialSummary,
    ranking: Vec<RankedScenario<'a>>,
}

#[derive(Serialize)]
struct RankedScenario<'a> {
    rank: usize,
    name: &'a str,
    scenario: &'a ScenarioParameters,
    metrics: &'a Metrics,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compute(args) => run_compute(args),
        Commands::Factorial(args) => run_factorial(args),
    }
}

fn load_base(input: Option<&Path>) -> Result<Parameters> {
    match input {
        Some(path) => load_parameters(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display())),
        None => Parameters::try_from(REFERENCE_CASE.to_input()).context("Invalid reference case"),
    }
}

fn run_compute(args: ComputeArgs) -> Result<()> {
    let mut params = load_base(args.input.as_deref())?;
    if let Some(path) = &args.scenarios_csv {
        let scenarios = load_scenarios(path)
            .with_context(|| format!("Failed to load scenarios from {}", path.display()))?;
        params = params.with_scenarios(scenarios)?;
    }

    let config = if args.annual_steps {
        ProjectionConfig::annual_steps()
    } else {
        ProjectionConfig::default()
    };
    let results = ScenarioRunner::new(config).run(&params)?;

    if args.json {
        let output = RunOutput {
            generated_at: Utc::now(),
            parameters: &params,
            results: &results,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Rental Investment v{}", env!("CARGO_PKG_VERSION"));
    println!("=========================\n");
    println!("  Loan Amount: {:.2} (loan currency)", params.loan_amount());
    println!("  Initial Investment: {:.2}", params.initial_investment());
    println!("  Term: {} months, {} payments", params.loan_term_months(), params.payment_scheme());
    println!();

    print_header();
    // Input order, not name order
    for (name, _) in params.scenarios() {
        if let Some(result) = results.get(name) {
            print_row(name, result);
        }
    }
    Ok(())
}

fn run_factorial(args: FactorialArgs) -> Result<()> {
    let grid = ScenarioGrid::default();
    let params = load_base(args.input.as_deref())?.with_scenarios(grid.scenarios())?;
    let results = ScenarioRunner::default().run(&params)?;
    let ranked = rank_by_npv(&results);
    let summary = grid.summarize(&results, params.discount_rate());

    if args.json {
        let ranking: Vec<_> = ranked
            .iter()
            .enumerate()
            .map(|(i, (name, result))| RankedScenario {
                rank: i + 1,
                name,
                scenario: &result.scenario,
                metrics: &result.metrics,
            })
            .collect();
        let output = RunOutput {
            generated_at: Utc::now(),
            parameters: &params,
            results: FactorialOutput { summary, ranking },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Factorial grid: {} scenarios ranked by NPV with sale\n", grid.len());
    print_header();
    for (name, result) in ranked {
        print_row(name, result);
    }
    print_summary(&summary, params.discount_rate());
    Ok(())
}

fn print_summary(summary: &FactorialSummary, discount_rate: f64) {
    println!("\nStatistics over {} scenarios:", summary.scenario_count);
    print_distribution("NPV+Sale", summary.npv.as_ref(), 1.0);
    print_distribution("IRR %", summary.irr.as_ref(), 100.0);
    print_distribution("ROI %", summary.roi.as_ref(), 100.0);
    println!("  Profitable (NPV+Sale > 0): {} of {}", summary.profitable, summary.scenario_count);
    println!(
        "  IRR above discount rate ({:.1}%): {} of {}",
        discount_rate * 100.0,
        summary.beats_discount_rate,
        summary.scenario_count
    );

    println!("\nMean NPV+Sale by factor:");
    for means in [
        &summary.mean_npv_by_inflation,
        &summary.mean_npv_by_rent_delta,
        &summary.mean_npv_by_price_growth,
    ] {
        print_factor_means(means);
    }
}

fn print_distribution(name: &str, distribution: Option<&Distribution>, scale: f64) {
    match distribution {
        Some(d) => println!(
            "  {:<10} min {:>12.2}  median {:>12.2}  mean {:>12.2}  max {:>12.2}",
            name,
            d.min * scale,
            d.median * scale,
            d.mean * scale,
            d.max * scale
        ),
        None => println!("  {:<10} n/a", name),
    }
}

fn print_factor_means(means: &[FactorMean]) {
    for m in means {
        match m.mean_npv {
            Some(mean) => println!("  {:<14} {:>12.2}", m.label, mean),
            None => println!("  {:<14} {:>12}", m.label, "n/a"),
        }
    }
}

fn print_header() {
    println!(
        "{:<36} {:>12} {:>12} {:>9} {:>9} {:>12}",
        "Scenario", "NPV", "NPV+Sale", "IRR", "ROI", "Sale Price"
    );
    println!("{}", "-".repeat(95));
}

fn print_row(name: &str, result: &ScenarioResult) {
    let m = &result.metrics;
    let irr = match m.irr {
        Some(rate) => format!("{:.2}%", rate * 100.0),
        None => "n/a".to_string(),
    };
    println!(
        "{:<36} {:>12.2} {:>12.2} {:>9} {:>8.1}% {:>12.2}",
        name,
        m.npv_without_sale,
        m.npv_with_sale,
        irr,
        m.roi * 100.0,
        m.sale_price_nominal
    );
}
