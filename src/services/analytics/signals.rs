use super::types::{Trend, ANOMALY_SIGMA, TREND_STABLE_BAND};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compares the mean of the first half against the second half. Sequences
/// shorter than two values are stable by definition; for odd lengths the
/// first half takes the smaller share.
///
/// A zero first-half mean makes the percent change undefined, so that case
/// is decided directly: any non-zero second-half mean is a strong signal in
/// its own direction, otherwise stable. NaN/Infinity never escape.
pub fn estimate_trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }

    let mid = values.len() / 2;
    let first_mean = mean(&values[..mid]);
    let second_mean = mean(&values[mid..]);

    if first_mean == 0.0 {
        return if second_mean > 0.0 {
            Trend::Increasing
        } else if second_mean < 0.0 {
            Trend::Decreasing
        } else {
            Trend::Stable
        };
    }

    let change = (second_mean - first_mean) / first_mean * 100.0;
    if change.abs() < TREND_STABLE_BAND {
        Trend::Stable
    } else if change > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

/// Indices of values deviating from the mean by more than two population
/// standard deviations. An all-identical sequence has zero deviation, so
/// nothing is flagged; an empty sequence yields no indices.
pub fn detect_anomalies(values: &[f64]) -> Vec<usize> {
    if values.is_empty() {
        return Vec::new();
    }

    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std_dev = variance.sqrt();

    values
        .iter()
        .enumerate()
        .filter(|(_, &value)| (value - mean).abs() > ANOMALY_SIGMA * std_dev)
        .map(|(idx, _)| idx)
        .collect()
}
