//! Published sensor state and its read-only queries

use core::fmt::{self, Write};

use super::acquisition::{AcquisitionMode, FeedbackSource};
use super::TempSensor;
use crate::traits::TC_CHANNELS;

/// Sensors reported by [`SensorState::list_all`], in display order
const LISTED_SENSORS: [TempSensor; 5] = [
    TempSensor::Left,
    TempSensor::Right,
    TempSensor::Extra1,
    TempSensor::Extra2,
    TempSensor::ColdJunction,
];

/// Snapshot of the fused temperature readings
///
/// Written once per acquisition cycle, read by the control loop, the
/// display and the serial console.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorState {
    /// Last known temperature per thermocouple channel (°C)
    pub(crate) temperature: [f32; TC_CHANNELS],
    /// Bit `i` set when channel `i` was refreshed this cycle
    pub(crate) valid_mask: u8,
    /// Cold-junction temperature (°C)
    pub(crate) cold_junction: f32,
    /// A real cold-junction sensor contributed this cycle
    pub(crate) cold_junction_present: bool,
    /// Feedback temperature (°C)
    pub(crate) average: f32,
    /// Built-in thermocouple combination (°C)
    pub(crate) inner_average: f32,
    /// Channel(s) driving the feedback temperature
    pub(crate) feedback: FeedbackSource,
    /// Mode selected by the last cycle, `None` before the first one
    pub(crate) mode: Option<AcquisitionMode>,
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorState {
    /// State before the first acquisition cycle
    pub const fn new() -> Self {
        Self {
            temperature: [0.0; TC_CHANNELS],
            valid_mask: 0,
            cold_junction: 0.0,
            cold_junction_present: false,
            average: 0.0,
            inner_average: 0.0,
            feedback: FeedbackSource::None,
            mode: None,
        }
    }

    /// Current value of `sensor` in °C
    pub fn temperature(&self, sensor: TempSensor) -> f32 {
        match sensor {
            TempSensor::ColdJunction => self.cold_junction,
            TempSensor::Average => self.average,
            TempSensor::InnerAverage => self.inner_average,
            TempSensor::Left | TempSensor::Right | TempSensor::Extra1 | TempSensor::Extra2 => {
                sensor.channel().map_or(0.0, |ch| self.temperature[ch])
            }
        }
    }

    /// Current value of the sensor with numeric id `id`
    ///
    /// Unknown ids read as 0 °C.
    pub fn temperature_by_id(&self, id: u8) -> f32 {
        TempSensor::from_id(id).map_or(0.0, |sensor| self.temperature(sensor))
    }

    /// Check whether `sensor` currently holds a trustworthy value
    ///
    /// The feedback average is always considered valid, the inner average is
    /// valid when both built-in channels are.
    pub fn is_valid(&self, sensor: TempSensor) -> bool {
        match sensor {
            TempSensor::ColdJunction => self.cold_junction_present,
            TempSensor::Average => true,
            TempSensor::InnerAverage => self.valid_mask & 0x03 == 0x03,
            TempSensor::Left | TempSensor::Right | TempSensor::Extra1 | TempSensor::Extra2 => sensor
                .channel()
                .is_some_and(|ch| self.valid_mask & (1 << ch) != 0),
        }
    }

    /// Validity of the sensor with numeric id `id`; unknown ids are invalid
    pub fn is_valid_id(&self, id: u8) -> bool {
        TempSensor::from_id(id).is_some_and(|sensor| self.is_valid(sensor))
    }

    /// Raw validity bitmask of the four thermocouple channels
    pub fn validity_mask(&self) -> u8 {
        self.valid_mask
    }

    /// Whether a real cold-junction sensor contributed this cycle
    pub fn cold_junction_present(&self) -> bool {
        self.cold_junction_present
    }

    /// Feedback source bitmask
    pub fn feedback_source(&self) -> u8 {
        self.feedback.bits()
    }

    /// Feedback source
    pub fn feedback(&self) -> FeedbackSource {
        self.feedback
    }

    /// Mode selected by the last acquisition cycle
    pub fn mode(&self) -> Option<AcquisitionMode> {
        self.mode
    }

    /// Write one line per valid sensor to `out`
    pub fn list_all<W: Write>(&self, out: &mut W) -> fmt::Result {
        for sensor in LISTED_SENSORS {
            if self.is_valid(sensor) {
                write!(
                    out,
                    "\n{:>13}: {:4.1}degC",
                    sensor.name(),
                    self.temperature(sensor)
                )?;
            }
        }
        if !self.is_valid(TempSensor::ColdJunction) {
            out.write_str("\nNo cold-junction sensor on PCB")?;
        }
        Ok(())
    }
}
