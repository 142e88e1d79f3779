//! Fitreport CLI
//!
//! Command-line interface computing body measurement reports locally with the
//! same engine the server uses.
//!
//! # Usage
//!
//! ```bash
//! fitreport --help
//! fitreport report --name Alex --sex male --height-cm 180 --weight-lbs 160 \
//!     --waist-cm 85 --neck-cm 38
//! fitreport report ... --json
//! ```

#![deny(unsafe_code)]

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use shared::engine::{EmailPolicy, MetricsEngine};
use shared::models::MeasurementInput;
use shared::report::render_report;

/// Fitreport CLI - body measurement reports from the command line
#[derive(Parser)]
#[command(name = "fitreport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics and print the report
    Report(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Name of the person measured
    #[arg(long)]
    name: String,

    /// Contact email address
    #[arg(long)]
    email: Option<String>,

    /// Sex: male or female
    #[arg(long)]
    sex: String,

    /// Height in centimeters
    #[arg(long)]
    height_cm: f64,

    /// Weight in pounds
    #[arg(long)]
    weight_lbs: f64,

    /// Waist circumference in centimeters
    #[arg(long)]
    waist_cm: f64,

    /// Neck circumference in centimeters
    #[arg(long)]
    neck_cm: f64,

    /// Fail when no email is given
    #[arg(long, env = "FITREPORT_REQUIRE_EMAIL")]
    require_email: bool,

    /// Print the full record as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

impl ReportArgs {
    fn input(&self) -> MeasurementInput {
        MeasurementInput {
            name: Some(self.name.clone()),
            email: self.email.clone(),
            sex: Some(self.sex.clone()),
            height_cm: Some(self.height_cm),
            weight_lbs: Some(self.weight_lbs),
            waist_cm: Some(self.waist_cm),
            neck_cm: Some(self.neck_cm),
        }
    }

    fn email_policy(&self) -> EmailPolicy {
        if self.require_email {
            EmailPolicy::Required
        } else {
            EmailPolicy::Optional
        }
    }
}

/// Computes the output for `report`: the text report or the JSON record.
fn run_report(args: &ReportArgs) -> anyhow::Result<String> {
    let engine = MetricsEngine::new().with_email_policy(args.email_policy());
    let record = engine
        .compute(args.input())
        .context("invalid measurements")?;

    tracing::debug!(category = %record.metrics.bmi_category, "Computed metrics");

    if args.json {
        Ok(serde_json::to_string_pretty(&record)?)
    } else {
        Ok(render_report(&record))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Report(args)) => {
            print!("{}", run_report(&args)?);
        }
        None => {
            println!("Fitreport CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
