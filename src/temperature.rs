//! Contract for the non-contact infrared body-temperature sensor.
//!
//! Fully independent of the pulse-oximetry pipeline; included because the
//! device carries both sensors. The register-level driver lives outside this
//! crate and implements [`TemperatureSource`].

use crate::source::InitError;

/// Object temperatures outside this range cannot be a human body reading
/// (sensor pointed away, too far, or at something else entirely).
pub const MIN_BODY_TEMP_C: f32 = 20.0;
pub const MAX_BODY_TEMP_C: f32 = 45.0;

/// Whether `temp_c` is plausible for a non-contact body measurement.
pub fn is_plausible_body_temp(temp_c: f32) -> bool {
    (MIN_BODY_TEMP_C..=MAX_BODY_TEMP_C).contains(&temp_c)
}

/// A thermopile-style sensor reporting ambient and object temperature.
pub trait TemperatureSource {
    /// Probes and initializes the sensor. Failure is fatal for the
    /// temperature subsystem; the caller decides what to do about it.
    fn init(&mut self) -> Result<(), InitError>;

    /// Die/ambient temperature in degrees Celsius.
    fn read_ambient_c(&mut self) -> f32;

    /// Uncorrected object temperature in degrees Celsius.
    fn read_object_c_raw(&mut self) -> f32;

    /// Object temperature gated to the plausible body range. Out-of-range
    /// readings are reported as `None`, never as a raw number.
    fn read_object_c(&mut self) -> Option<f32> {
        let temp = self.read_object_c_raw();
        is_plausible_body_temp(temp).then_some(temp)
    }
}
