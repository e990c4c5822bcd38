//! Output artifacts: chart tables, forecast table, summary and run report

use crate::alignment::AlignmentReport;
use crate::charts::ChartSet;
use crate::config::{ArimaOrder, PipelineConfig};
use crate::data::LoadReport;
use crate::error::Result;
use crate::metrics::EvaluationMetrics;
use crate::models::arima::ArimaFit;
use crate::models::ForecastPoint;
use crate::pipeline::ForecastOutcome;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TREND_CHART: &str = "trend_chart.csv";
pub const ROLLING_AVG_CHART: &str = "rolling_avg_chart.csv";
pub const DECOMPOSITION_CHART: &str = "decomposition_chart.csv";
pub const ACTUAL_VS_PREDICTED_CHART: &str = "actual_vs_predicted.csv";
pub const FUTURE_FORECAST_CHART: &str = "future_forecast_chart.csv";
pub const FINAL_FORECAST_CHART: &str = "final_forecast_chart.csv";
pub const FUTURE_FORECAST_TABLE: &str = "future_forecast.csv";
pub const SUMMARY: &str = "project_summary.txt";
pub const RUN_REPORT: &str = "run_report.json";

/// Artifacts a complete run leaves in the output directory, with a caption
pub const EXPECTED_ARTIFACTS: &[(&str, &str)] = &[
    (TREND_CHART, "Monthly Trend"),
    (ROLLING_AVG_CHART, "Rolling Average"),
    (DECOMPOSITION_CHART, "Decomposition"),
    (ACTUAL_VS_PREDICTED_CHART, "Actual vs Predicted"),
    (FUTURE_FORECAST_CHART, "Future Forecast"),
    (FINAL_FORECAST_CHART, "Final Combined Chart"),
    (FUTURE_FORECAST_TABLE, "Future Forecast Table"),
    (SUMMARY, "Project Summary"),
    (RUN_REPORT, "Run Report"),
];

/// Row of the future forecast table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FutureForecastRow {
    pub month: NaiveDate,
    pub forecasted_sales: f64,
}

impl From<&ForecastPoint> for FutureForecastRow {
    fn from(point: &ForecastPoint) -> Self {
        Self {
            month: point.month,
            forecasted_sales: point.value,
        }
    }
}

/// Machine-readable record of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub as_of: NaiveDate,
    pub load: LoadReport,
    pub alignment: AlignmentReport,
    pub order: ArimaOrder,
    pub train_months: usize,
    pub test_months: usize,
    pub fit: ArimaFit,
    pub metrics: EvaluationMetrics,
    pub test_predictions: Vec<ForecastPoint>,
    pub future_forecast: Vec<ForecastPoint>,
}

impl RunReport {
    pub fn new(
        config: &PipelineConfig,
        as_of: NaiveDate,
        load: &LoadReport,
        alignment: &AlignmentReport,
        outcome: &ForecastOutcome,
    ) -> Self {
        Self {
            input: config.input.clone(),
            as_of,
            load: load.clone(),
            alignment: *alignment,
            order: outcome.fit.order,
            train_months: outcome.train_months,
            test_months: outcome.test_predictions.horizons(),
            fit: outcome.fit.clone(),
            metrics: outcome.metrics,
            test_predictions: outcome.test_predictions.points(),
            future_forecast: outcome.future_forecast.points(),
        }
    }
}

/// Plain-text summary with the metrics and the future forecast table
pub fn summary_text(metrics: &EvaluationMetrics, future: &[ForecastPoint]) -> String {
    let values: Vec<String> = future.iter().map(|p| format!("{:.2}", p.value)).collect();
    let value_width = values
        .iter()
        .map(String::len)
        .chain(std::iter::once("forecasted_sales".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "Monthly Sales Forecast Project Summary\n{}\n\nFuture Forecast (Next {} Months):\n",
        metrics,
        future.len()
    );
    out.push_str(&format!(
        "{:>10}  {:>width$}",
        "month",
        "forecasted_sales",
        width = value_width
    ));
    for (point, value) in future.iter().zip(&values) {
        out.push_str(&format!(
            "\n{:>10}  {:>width$}",
            point.month,
            value,
            width = value_width
        ));
    }
    out
}

/// Serialize rows to CSV bytes with a header
pub fn csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::error::ForecastError::IoError(e.into_error()))
}

/// Writes artifacts into an output directory.
///
/// Each file is written to a temporary sibling first and renamed into place,
/// so readers never observe a partially written artifact.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete an artifact left by an earlier run; absence is fine
    pub fn remove(&self, name: &str) -> Result<()> {
        let target = self.dir.join(name);
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "removed stale artifact");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Write one artifact atomically and return its final path
    pub fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(name);
        let staging = self.dir.join(format!(".{}.tmp", name));

        fs::write(&staging, contents)?;
        if let Err(err) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        debug!(path = %target.display(), bytes = contents.len(), "wrote artifact");
        Ok(target)
    }

    /// Render every artifact in memory, then write them all
    pub fn write_all(
        &self,
        charts: &ChartSet,
        outcome: &ForecastOutcome,
        report: &RunReport,
    ) -> Result<Vec<PathBuf>> {
        let future_points = outcome.future_forecast.points();
        let future_rows: Vec<FutureForecastRow> =
            future_points.iter().map(FutureForecastRow::from).collect();

        let mut rendered: Vec<(&str, Vec<u8>)> = vec![
            (TREND_CHART, csv_bytes(&charts.trend)?),
            (ROLLING_AVG_CHART, csv_bytes(&charts.rolling)?),
            (ACTUAL_VS_PREDICTED_CHART, csv_bytes(&charts.actual_vs_predicted)?),
            (FUTURE_FORECAST_CHART, csv_bytes(&charts.future_forecast)?),
            (FINAL_FORECAST_CHART, csv_bytes(&charts.final_forecast)?),
            (FUTURE_FORECAST_TABLE, csv_bytes(&future_rows)?),
            (
                SUMMARY,
                summary_text(&outcome.metrics, &future_points).into_bytes(),
            ),
            (RUN_REPORT, serde_json::to_vec_pretty(report)?),
        ];
        match &charts.decomposition {
            Some(rows) => rendered.push((DECOMPOSITION_CHART, csv_bytes(rows)?)),
            None => warn!(artifact = DECOMPOSITION_CHART, "not generated for this run"),
        }

        let written = rendered
            .iter()
            .map(|(name, contents)| self.write(name, contents))
            .collect::<Result<Vec<_>>>()?;
        // A chart this run could not produce must not survive from a previous run
        if charts.decomposition.is_none() {
            self.remove(DECOMPOSITION_CHART)?;
        }
        Ok(written)
    }
}

/// Presence of one expected artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub name: &'static str,
    pub caption: &'static str,
    pub present: bool,
}

/// What a dashboard can show from an output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactManifest {
    pub dir: PathBuf,
    pub artifacts: Vec<ArtifactStatus>,
}

impl ArtifactManifest {
    /// Inspect `dir`; a missing directory simply reports every artifact absent
    pub fn scan<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let artifacts = EXPECTED_ARTIFACTS
            .iter()
            .map(|&(name, caption)| ArtifactStatus {
                name,
                caption,
                present: dir.join(name).is_file(),
            })
            .collect();

        Self {
            dir: dir.to_path_buf(),
            artifacts,
        }
    }

    pub fn missing(&self) -> Vec<&ArtifactStatus> {
        self.artifacts.iter().filter(|a| !a.present).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.artifacts.iter().all(|a| a.present)
    }
}

impl std::fmt::Display for ArtifactManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Artifacts in {}:", self.dir.display())?;
        for artifact in &self.artifacts {
            if artifact.present {
                writeln!(f, "  [ok]      {:<22} {}", artifact.caption, artifact.name)?;
            } else {
                writeln!(
                    f,
                    "  [missing] {:<22} {} not yet generated; run the forecast first",
                    artifact.caption, artifact.name
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_lists_metrics_and_forecast() {
        let metrics = EvaluationMetrics {
            mean_absolute_error: 1234.5678,
            root_mean_squared_error: 2345.6789,
        };
        let future = vec![
            ForecastPoint {
                month: ymd(2025, 11, 30),
                value: 51234.567,
            },
            ForecastPoint {
                month: ymd(2025, 12, 31),
                value: 60000.0,
            },
        ];

        let text = summary_text(&metrics, &future);

        assert_eq!(
            text,
            "Monthly Sales Forecast Project Summary\n\
             MAE: 1234.57\n\
             RMSE: 2345.68\n\
             \n\
             Future Forecast (Next 2 Months):\n\
             \x20    month  forecasted_sales\n\
             2025-11-30          51234.57\n\
             2025-12-31          60000.00"
        );
    }

    #[test]
    fn csv_bytes_writes_header_and_rows() {
        let rows = vec![FutureForecastRow {
            month: ymd(2025, 11, 30),
            forecasted_sales: 10.5,
        }];

        let bytes = csv_bytes(&rows).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "month,forecasted_sales\n2025-11-30,10.5\n"
        );
    }

    #[test]
    fn writer_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("out"));

        writer.write(SUMMARY, b"first").unwrap();
        let path = writer.write(SUMMARY, b"second").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "second");
        assert!(!dir.path().join("out").join(".project_summary.txt.tmp").exists());
    }

    #[test]
    fn remove_tolerates_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        writer.write(DECOMPOSITION_CHART, b"month\n").unwrap();
        writer.remove(DECOMPOSITION_CHART).unwrap();
        writer.remove(DECOMPOSITION_CHART).unwrap();

        assert!(!dir.path().join(DECOMPOSITION_CHART).exists());
    }

    #[test]
    fn manifest_reports_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TREND_CHART), "month,total_sales\n").unwrap();

        let manifest = ArtifactManifest::scan(dir.path());

        assert!(!manifest.is_complete());
        assert_eq!(manifest.missing().len(), EXPECTED_ARTIFACTS.len() - 1);
        assert!(manifest.to_string().contains("not yet generated"));
    }

    #[test]
    fn manifest_of_absent_directory_is_all_missing() {
        let manifest = ArtifactManifest::scan("/definitely/not/here");
        assert_eq!(manifest.missing().len(), EXPECTED_ARTIFACTS.len());
    }
}
