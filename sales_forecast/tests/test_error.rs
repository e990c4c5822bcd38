use sales_forecast::error::ForecastError;
use sales_forecast::PipelineConfig;
use sales_math::MathError;
use std::io;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(
        ForecastError::from(io_error),
        ForecastError::IoError(_)
    ));

    let math_error = MathError::InsufficientData("need 24 values, have 10".to_string());
    let error = ForecastError::from(math_error);
    assert!(matches!(error, ForecastError::MathError(_)));
    assert!(error.to_string().contains("need 24 values"));

    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::LengthMismatch {
        expected: 6,
        actual: 5,
    };
    assert_eq!(error.to_string(), "Length mismatch: expected 6, got 5");

    let error = ForecastError::InsufficientData { needed: 10, got: 8 };
    assert_eq!(
        error.to_string(),
        "Insufficient data: need at least 10, got 8"
    );

    let error = ForecastError::ConvergenceError("simplex stalled".to_string());
    assert!(error.to_string().starts_with("Convergence error"));
}

#[test]
fn test_bad_config_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "test_months = \"six\"").unwrap();

    let err = PipelineConfig::from_toml_file(file.path()).unwrap_err();

    assert!(matches!(err, ForecastError::ConfigError(_)));
}
