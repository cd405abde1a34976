pub mod detrend;
pub mod fft_bandpass;
pub mod filter;
pub mod math;
pub mod moving_average;
pub mod noise_reduction;
pub mod signal_buffer;

pub use detrend::{DetrendMethod, SignalDetrend};
pub use fft_bandpass::{BandpassFilter, FrequencyBand};
pub use filter::Filter;
pub use moving_average::TemporalAverageFilter;
pub use noise_reduction::{
    MedianFilter, NoiseReductionConfig, NoiseReductionPipeline, SmoothingFilter, SmoothingWindow,
};
pub use signal_buffer::SignalBuffer;
