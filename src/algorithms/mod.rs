mod beat;
mod filter;
mod spo2;

pub use beat::BeatDetector;
pub use filter::AcExtractor;
pub use spo2::{estimate_spo2, Spo2Calibration, WindowStats};
