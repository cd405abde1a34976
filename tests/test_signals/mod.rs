pub mod generate;

pub use generate::generate_test_signal;
pub use generate::generate_test_signal_with_bpm_fn;
pub use generate::generate_test_signal_with_phase;
