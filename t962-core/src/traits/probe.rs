//! Thermocouple probe backend traits

/// Number of thermocouple channels a backend can serve
pub const TC_CHANNELS: usize = 4;

/// Reading returned by an ambient sensor that is not fitted
///
/// Anything at or above the acquisition plausibility ceiling is treated as
/// "no sensor", so absent sensors report this value.
pub const AMBIENT_ABSENT_C: f32 = 127.0;

/// Thermocouple probe backend
///
/// Exactly one backend (one-wire MAX31850K or SPI-bridged MAX31855) is
/// compiled into a firmware image. Backends cache their last bus transaction;
/// these queries only look at that cache and never fail. A probe that cannot
/// be read is simply not present.
pub trait ProbeBackend {
    /// Check whether a working probe is attached to `channel` (0..=3)
    fn is_channel_present(&self, channel: usize) -> bool;

    /// Hot junction temperature of `channel` in °C
    fn read_temperature(&self, channel: usize) -> f32;

    /// Cold junction temperature measured by the converter of `channel` in °C
    fn read_local_cold_junction(&self, channel: usize) -> f32;

    /// Board ambient temperature in °C
    ///
    /// Returns [`AMBIENT_ABSENT_C`] when no ambient sensor is fitted.
    fn read_ambient_sensor(&self) -> f32;
}

/// Stand-alone ambient (board) temperature sensor
pub trait AmbientSensor {
    /// Board ambient temperature in °C, [`AMBIENT_ABSENT_C`] if unavailable
    fn read_ambient(&self) -> f32;
}

/// Placeholder for boards without an ambient sensor
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoAmbient;

impl AmbientSensor for NoAmbient {
    fn read_ambient(&self) -> f32 {
        AMBIENT_ABSENT_C
    }
}
