use serde::Deserialize;

/// Baseline model removed by [`SignalDetrend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetrendMethod {
    /// Least-squares line over sample index
    #[default]
    Linear,
    /// Sample mean
    Constant,
}

/// Removes slow baseline drift (auto-exposure, posture) from a window.
pub struct SignalDetrend;

impl SignalDetrend {
    pub fn remove(signal: &[f64], method: DetrendMethod) -> Vec<f64> {
        match method {
            DetrendMethod::Linear => Self::remove_linear(signal),
            DetrendMethod::Constant => Self::remove_constant(signal),
        }
    }

    /// Fit `y = m*i + b` by ordinary least squares and subtract it.
    fn remove_linear(signal: &[f64]) -> Vec<f64> {
        let n = signal.len() as f64;
        if signal.len() < 2 {
            return signal.to_vec();
        }

        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
        for (i, &y) in signal.iter().enumerate() {
            let x = i as f64;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
        }

        let denominator = n * sum_x2 - sum_x * sum_x;
        if denominator == 0.0 {
            return signal.to_vec();
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;

        signal
            .iter()
            .enumerate()
            .map(|(i, &y)| y - (slope * i as f64 + intercept))
            .collect()
    }

    fn remove_constant(signal: &[f64]) -> Vec<f64> {
        let mean = crate::signal_processing::math::mean(signal);
        signal.iter().map(|&y| y - mean).collect()
    }
}
