use chrono::NaiveDate;
use sales_forecast::report::ArtifactManifest;
use sales_forecast::sample::{write_sample_csv, SampleConfig};
use sales_forecast::{run_pipeline, PipelineConfig};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workdir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target").join("superstore_demo");
    std::fs::create_dir_all(&workdir)?;

    // Three years of synthetic orders stand in for the store export
    let input = workdir.join("superstore_sales.csv");
    let rows = write_sample_csv(&input, &SampleConfig::default())?;
    println!("Generated {} orders in {}", rows, input.display());

    let config = PipelineConfig::new(&input, workdir.join("output"))
        .with_as_of(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    let run = run_pipeline(&config)?;

    println!(
        "Aligned dates by {} days ({} -> {})",
        run.alignment.shift_days, run.alignment.original_max_date, run.alignment.aligned_max_date
    );
    println!("Monthly series: {} months", run.series.len());
    println!("Model: {:?}", run.outcome.fit.order);
    println!("{}", run.outcome.metrics);

    println!("\nHeld-out months:");
    for (point, actual) in run
        .outcome
        .test_predictions
        .points()
        .iter()
        .zip(&run.series.values()[run.outcome.train_months..])
    {
        println!("  {}  actual {:>12.2}  predicted {:>12.2}", point.month, actual, point.value);
    }

    println!("\nFuture forecast:");
    for point in run.outcome.future_forecast.points() {
        println!("  {}  {:>12.2}", point.month, point.value);
    }

    println!("\n{}", ArtifactManifest::scan(&config.output_dir));
    Ok(())
}
