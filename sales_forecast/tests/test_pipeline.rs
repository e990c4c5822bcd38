use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::config::PipelineConfig;
use sales_forecast::report::{
    ArtifactManifest, DECOMPOSITION_CHART, EXPECTED_ARTIFACTS, FUTURE_FORECAST_TABLE, RUN_REPORT,
    SUMMARY,
};
use sales_forecast::{
    run_pipeline, ArimaModel, ForecastError, ForecastModel, Forecaster, MonthlySeries,
    TrainedForecastModel,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly_sales(months: usize) -> Vec<f64> {
    (0..months)
        .map(|i| {
            let t = i as f64;
            10_000.0 + 250.0 * t + 1_500.0 * (t * std::f64::consts::PI / 6.0).sin()
        })
        .collect()
}

/// Two orders per month on the 3rd and 10th, splitting each month's total
fn write_orders(path: &Path, start_year: i32, totals: &[f64]) {
    let mut text = String::from("order_id,order_date,sales_amount\n");
    for (i, total) in totals.iter().enumerate() {
        let year = start_year + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        writeln!(text, "A{i},{:04}-{:02}-03,{:.2}", year, month, total * 0.4).unwrap();
        writeln!(text, "B{i},{:04}-{:02}-10,{:.2}", year, month, total * 0.6).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn config_for(dir: &TempDir, totals: &[f64], as_of: NaiveDate) -> PipelineConfig {
    let input = dir.path().join("orders.csv");
    write_orders(&input, 2023, totals);
    PipelineConfig::new(input, dir.path().join("output")).with_as_of(as_of)
}

#[test]
fn test_two_year_history_end_to_end() {
    let dir = TempDir::new().unwrap();
    let totals = monthly_sales(24);
    // Latest order is 2024-12-10; aligning to the 20th keeps every order in its month
    let config = config_for(&dir, &totals, ymd(2024, 12, 20));

    let run = run_pipeline(&config).unwrap();

    assert_eq!(run.alignment.shift_days, 10);
    assert_eq!(run.alignment.aligned_max_date, ymd(2024, 12, 20));
    assert_eq!(run.load.rows_read, 48);

    assert_eq!(run.series.len(), 24);
    assert_eq!(run.series.first_month(), Some(ymd(2023, 1, 31)));
    for (aggregated, expected) in run.series.values().iter().zip(&totals) {
        assert!((aggregated - expected).abs() < 0.02);
    }

    assert_eq!(run.outcome.train_months, 18);
    assert_eq!(
        run.outcome
            .test_predictions
            .points()
            .iter()
            .map(|p| p.month)
            .collect::<Vec<_>>(),
        vec![
            ymd(2024, 7, 31),
            ymd(2024, 8, 31),
            ymd(2024, 9, 30),
            ymd(2024, 10, 31),
            ymd(2024, 11, 30),
            ymd(2024, 12, 31),
        ]
    );
    assert_eq!(
        run.outcome
            .future_forecast
            .points()
            .iter()
            .map(|p| p.month)
            .collect::<Vec<_>>(),
        vec![
            ymd(2025, 1, 31),
            ymd(2025, 2, 28),
            ymd(2025, 3, 31),
            ymd(2025, 4, 30),
            ymd(2025, 5, 31),
            ymd(2025, 6, 30),
        ]
    );

    let metrics = run.outcome.metrics;
    assert!(metrics.mean_absolute_error >= 0.0);
    assert!(metrics.root_mean_squared_error >= metrics.mean_absolute_error);
    assert!(run
        .outcome
        .future_forecast
        .values()
        .iter()
        .all(|v| v.is_finite()));

    assert_eq!(run.artifacts.len(), EXPECTED_ARTIFACTS.len());
    assert!(ArtifactManifest::scan(&config.output_dir).is_complete());
}

#[test]
fn test_future_forecast_is_tail_of_combined_horizon() {
    let totals = monthly_sales(24);
    let series = MonthlySeries::from_values(ymd(2023, 1, 1), &totals).unwrap();
    let forecaster = Forecaster::new(ArimaModel::default(), 6, 6);

    let outcome = forecaster.run(&series).unwrap();

    // Retraining the same model on the same prefix reproduces the combined path
    let combined = ArimaModel::default()
        .train(&totals[..18])
        .unwrap()
        .forecast(12)
        .unwrap();
    assert_eq!(&combined.values()[..6], outcome.test_predictions.values());
    assert_eq!(&combined.values()[6..], outcome.future_forecast.values());
}

#[test]
fn test_written_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, &monthly_sales(30), ymd(2025, 6, 10));

    let run = run_pipeline(&config).unwrap();
    let out = &config.output_dir;

    let summary = fs::read_to_string(out.join(SUMMARY)).unwrap();
    let mut lines = summary.lines();
    assert_eq!(lines.next(), Some("Monthly Sales Forecast Project Summary"));
    assert_eq!(
        lines.next().map(str::to_string),
        Some(format!("MAE: {:.2}", run.outcome.metrics.mean_absolute_error))
    );
    assert!(summary.contains("Future Forecast (Next 6 Months):"));

    let table = fs::read_to_string(out.join(FUTURE_FORECAST_TABLE)).unwrap();
    let rows: Vec<&str> = table.lines().collect();
    assert_eq!(rows[0], "month,forecasted_sales");
    assert_eq!(rows.len(), 7);
    assert!(rows[1].starts_with("2025-07-31,"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(RUN_REPORT)).unwrap()).unwrap();
    assert_eq!(report["as_of"], "2025-06-10");
    assert_eq!(report["order"]["p"], 1);
    assert_eq!(report["future_forecast"].as_array().unwrap().len(), 6);

    // 30 months cover two seasonal periods
    assert!(out.join(DECOMPOSITION_CHART).is_file());
    let leftovers: Vec<_> = fs::read_dir(out)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_short_history_skips_decomposition() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, &monthly_sales(15), ymd(2024, 3, 15));

    let run = run_pipeline(&config).unwrap();

    assert!(run.charts.decomposition.is_none());
    let manifest = ArtifactManifest::scan(&config.output_dir);
    let missing: Vec<&str> = manifest.missing().iter().map(|a| a.name).collect();
    assert_eq!(missing, vec![DECOMPOSITION_CHART]);
}

#[test]
fn test_rerun_without_decomposition_drops_previous_chart() {
    let dir = TempDir::new().unwrap();
    let long = config_for(&dir, &monthly_sales(30), ymd(2025, 6, 10));
    run_pipeline(&long).unwrap();
    assert!(long.output_dir.join(DECOMPOSITION_CHART).is_file());

    let short = config_for(&dir, &monthly_sales(15), ymd(2024, 3, 15));
    assert_eq!(short.output_dir, long.output_dir);
    let run = run_pipeline(&short).unwrap();

    assert!(run.charts.decomposition.is_none());
    assert!(!short.output_dir.join(DECOMPOSITION_CHART).exists());
    let manifest = ArtifactManifest::scan(&short.output_dir);
    assert!(!manifest.is_complete());
    let missing: Vec<&str> = manifest.missing().iter().map(|a| a.name).collect();
    assert_eq!(missing, vec![DECOMPOSITION_CHART]);
}

#[test]
fn test_too_short_history_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, &monthly_sales(8), ymd(2023, 8, 15));

    let err = run_pipeline(&config).unwrap_err();

    assert!(matches!(
        err,
        ForecastError::InsufficientData { needed: 10, got: 8 }
    ));
    assert!(!config.output_dir.exists());
}

#[test]
fn test_gap_months_are_zero_filled() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("orders.csv");
    let mut text = String::from("order_date,sales_amount\n");
    for i in 0..20u32 {
        // March 2023 has no orders
        if i == 2 {
            continue;
        }
        let date = ymd(2023 + (i / 12) as i32, i % 12 + 1, 15);
        writeln!(text, "{},{}", date, 1_000.0 + 40.0 * i as f64).unwrap();
    }
    fs::write(&input, text).unwrap();
    let config = PipelineConfig::new(&input, dir.path().join("output"))
        .with_as_of(ymd(2024, 8, 15));

    let run = run_pipeline(&config).unwrap();

    assert_eq!(run.series.len(), 20);
    assert_eq!(run.series.points()[2].month, ymd(2023, 3, 31));
    assert_eq!(run.series.points()[2].total_sales, 0.0);
}
