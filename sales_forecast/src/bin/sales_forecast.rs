//! Command-line entry point for the monthly sales forecast
//!
//! `run` executes the full pipeline, `status` shows which artifacts an output
//! directory holds and `sample` writes a synthetic order file to try it on.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sales_forecast::report::ArtifactManifest;
use sales_forecast::sample::{write_sample_csv, SampleConfig};
use sales_forecast::{run_pipeline, AmountPolicy, ArimaOrder, PipelineConfig};
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Monthly sales forecast: aggregate orders, fit ARIMA, report accuracy
#[derive(Parser, Debug)]
#[command(name = "sales_forecast", author, version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the forecast and write every artifact
    Run {
        /// Order file (CSV with a header row, Latin-1)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for the artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file with pipeline settings; flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Align the latest order to this date (YYYY-MM-DD), default today
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Months held out for evaluation
        #[arg(long)]
        test_months: Option<usize>,

        /// Months to forecast past the end of the series
        #[arg(long)]
        future_months: Option<usize>,

        /// Model order as p,d,q
        #[arg(long)]
        order: Option<ArimaOrder>,

        /// Name of the order date column
        #[arg(long)]
        date_column: Option<String>,

        /// Name of the sales amount column
        #[arg(long)]
        amount_column: Option<String>,

        /// What to do with unparseable amounts (zero, drop-row)
        #[arg(long)]
        amount_policy: Option<AmountPolicy>,

        /// Fit a drift term on the differenced scale
        #[arg(long)]
        with_constant: bool,
    },

    /// List the artifacts present in an output directory
    Status {
        /// Output directory to inspect
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Write a synthetic order file
    Sample {
        /// Destination CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of months of history
        #[arg(long, default_value_t = 36)]
        months: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Run {
            input,
            output,
            config,
            as_of,
            test_months,
            future_months,
            order,
            date_column,
            amount_column,
            amount_policy,
            with_constant,
        } => {
            let mut settings = match config {
                Some(path) => PipelineConfig::from_toml_file(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(input) = input {
                settings.input = input;
            }
            if let Some(output) = output {
                settings.output_dir = output;
            }
            if as_of.is_some() {
                settings.as_of = as_of;
            }
            if let Some(k) = test_months {
                settings.test_months = k;
            }
            if let Some(k) = future_months {
                settings.future_months = k;
            }
            if let Some(order) = order {
                settings.order = order;
            }
            if let Some(column) = date_column {
                settings.date_column = column;
            }
            if let Some(column) = amount_column {
                settings.amount_column = column;
            }
            if let Some(policy) = amount_policy {
                settings.amount_policy = policy;
            }
            if with_constant {
                settings.include_constant = true;
            }

            let run = run_pipeline(&settings).with_context(|| {
                format!("Forecast run on {} failed", settings.input.display())
            })?;

            println!("{}", run.outcome.metrics);
            println!();
            println!("Future Forecast (Next {} Months):", settings.future_months);
            for point in run.outcome.future_forecast.points() {
                println!("  {}  {:>14.2}", point.month, point.value);
            }
            println!();
            println!(
                "Wrote {} artifacts to {}",
                run.artifacts.len(),
                settings.output_dir.display()
            );
        }
        Command::Status { output } => {
            let manifest = ArtifactManifest::scan(&output);
            print!("{}", manifest);
            for artifact in manifest.missing() {
                warn!(
                    "{} not found in output folder. Please run forecasting script first.",
                    artifact.name
                );
            }
        }
        Command::Sample {
            output,
            months,
            seed,
        } => {
            let config = SampleConfig::default().with_months(months).with_seed(seed);
            let rows = write_sample_csv(&output, &config)
                .with_context(|| format!("Failed to write sample to {}", output.display()))?;
            println!("Wrote {} orders to {}", rows, output.display());
        }
    }

    Ok(())
}
