//! Temperature sensor drivers
//!
//! Thermocouple probe backends and the board ambient sensor.

pub mod ds18b20;
pub mod max31850;
pub mod max31855;

pub use ds18b20::Ds18b20Ambient;
pub use max31850::OneWireProbes;
pub use max31855::SpiBridgeProbes;

/// Hot and cold junction temperatures of one thermocouple converter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TcReading {
    /// Thermocouple (hot junction) temperature in °C
    pub temperature: f32,
    /// Converter die (cold junction) temperature in °C
    pub cold_junction: f32,
}
