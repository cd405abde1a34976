use std::collections::VecDeque;

/// Streaming mean of the last `k` raw inputs
///
/// Applied to every incoming frame value before it reaches the long signal
/// buffer, suppressing per-frame shot noise. During warm-up the mean is
/// taken over however many values have arrived so far.
#[derive(Debug, Clone)]
pub struct TemporalAverageFilter {
    window: VecDeque<f64>,
    window_size: usize,
}

impl TemporalAverageFilter {
    /// Create a new temporal average filter
    ///
    /// # Arguments
    /// * `window_size` - Number of inputs to average (clamped to at least 1)
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size + 1),
            window_size,
        }
    }

    /// Push a value and return the mean of the current window
    pub fn add_and_get(&mut self, value: f64) -> f64 {
        self.window.push_back(value);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

impl Default for TemporalAverageFilter {
    fn default() -> Self {
        Self::new(3)
    }
}
