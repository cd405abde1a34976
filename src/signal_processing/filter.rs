/// Common trait for whole-window filters
///
/// Implemented by MedianFilter, SmoothingFilter and NoiseReductionPipeline.
/// Filters are stateless between windows: each call sees one complete
/// window and returns a new one of the same length.
pub trait Filter: Send {
    /// Filter a complete window
    fn apply(&self, signal: &[f64]) -> Vec<f64>;
}
