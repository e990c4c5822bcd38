//! Differencing and integration for integrated (the "I" in ARIMA) models

/// Apply `d` rounds of first differencing
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// `differenced` holds future values on the `d`-times differenced scale; the
/// result holds the same horizon on the original scale.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || differenced.is_empty() {
        return differenced.to_vec();
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let mut last = difference(original, level).last().copied().unwrap_or(0.0);
        for value in &mut result {
            last += *value;
            *value = last;
        }
    }
    result
}
