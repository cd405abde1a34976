use crate::constants::CV_MEAN_EPSILON;

/// Arithmetic mean, `0.0` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by N), `0.0` for an empty slice
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Coefficient of variation, `stddev / |mean|`
///
/// Returns `f64::MAX` for an empty slice or a mean indistinguishable from
/// zero, so callers comparing against a limit treat it as maximally irregular.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::MAX;
    }
    let m = mean(values);
    if m.abs() < CV_MEAN_EPSILON {
        return f64::MAX;
    }
    std_dev(values) / m.abs()
}

/// Median of an already sorted slice; even lengths average the middle pair
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Sorted copy of `values` (NaN ordered last)
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Value at the truncated-index percentile of a sorted slice
///
/// `fraction` is in `[0, 1)`; the index is `floor(len * fraction)`, no
/// interpolation.
pub fn percentile_of_sorted(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 * fraction) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Centered moving average with the window truncated at both edges
///
/// Each output sample is the mean of `signal[i - w/2 ..= i + w/2]` clamped to
/// the slice bounds. Windows below 2 return the input unchanged.
pub fn centered_moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return signal.to_vec();
    }
    let half = window / 2;
    (0..signal.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(signal.len());
            signal[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}
