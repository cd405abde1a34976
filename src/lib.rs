pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod peaks;
pub mod processing;
pub mod result;
pub mod samples;
pub mod session;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{PeakMethod, PpgConfig, SessionConfig};
pub use error::{PpgError, Result};
pub use processing::PpgProcessor;
pub use result::{Measurement, PpgResult};
pub use session::MeasurementSession;
