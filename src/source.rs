//! Contracts for the optical sample source.
//!
//! The register-level transport (I2C init, FIFO reads, LED control) is not
//! part of this crate; a driver implements [`SampleSource`] and the pipeline
//! consumes whatever it yields.

use thiserror_no_std::Error;

/// One acquisition tick worth of raw photodetector counts.
///
/// The driver stamps each sample with a monotonic millisecond counter; the
/// counter is allowed to wrap, interval arithmetic in the pipeline is
/// wrapping as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub ir: u32,
    pub red: u32,
    pub timestamp_ms: u32,
}

impl RawSample {
    pub fn new(ir: u32, red: u32, timestamp_ms: u32) -> Self {
        Self {
            ir,
            red,
            timestamp_ms,
        }
    }
}

/// Which LEDs the sensor drives per acquisition cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedMode {
    RedOnly,
    RedAndIr,
    MultiLed,
}

/// One-time acquisition setup handed to [`SampleSource::configure`].
///
/// Defaults match a pulse-detection oriented setup: moderate LED current,
/// 4-sample on-chip averaging, red + IR at 100 Hz with the widest pulse and
/// a reduced ADC range for better resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorConfig {
    pub led_brightness: u8,
    pub sample_averaging: u8,
    pub led_mode: LedMode,
    pub sample_rate_hz: u16,
    pub pulse_width_us: u16,
    pub adc_range: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            led_brightness: 60,
            sample_averaging: 4,
            led_mode: LedMode::RedAndIr,
            sample_rate_hz: 100,
            pulse_width_us: 411,
            adc_range: 4096,
        }
    }
}

/// Fatal sensor bring-up failure.
///
/// Surfaced to the caller instead of halting in place; the application
/// decides whether to retry, alarm or power down.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    #[error("sensor not detected on the bus")]
    SensorNotDetected,
    #[error("sensor rejected the requested configuration")]
    UnsupportedConfig,
}

/// A non-blocking provider of raw (IR, red) sample pairs.
pub trait SampleSource {
    /// Applies the one-time acquisition setup. Called once at startup;
    /// failure is fatal for the subsystem.
    fn configure(&mut self, config: &SensorConfig) -> Result<(), InitError>;

    /// Returns the next sample if one is ready. `None` means "nothing new
    /// this tick" and is not an error; the caller simply retries later.
    fn try_read_sample(&mut self) -> Option<RawSample>;
}
