//! Temperature acquisition and sensor fusion
//!
//! Each control tick the acquisition polls the thermocouple backend, picks
//! the feedback source and publishes a [`SensorState`] snapshot that the
//! control loop and the UI read.

pub mod acquisition;
pub mod calibration;
pub mod state;

pub use acquisition::{AcquisitionMode, FeedbackSource, ProbeReading, TemperatureAcquisition};
pub use calibration::AdcCalibration;
pub use state::SensorState;

/// Logical temperature sensors
///
/// The numeric ids are stable and used by the serial command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TempSensor {
    /// Cold-junction compensation temperature
    ColdJunction = 0,
    /// Feedback temperature used by the control loop
    Average = 1,
    /// Combined reading of the two built-in thermocouples
    InnerAverage = 2,
    /// Built-in left thermocouple
    Left = 3,
    /// Built-in right thermocouple
    Right = 4,
    /// First extra thermocouple
    Extra1 = 5,
    /// Second extra thermocouple
    Extra2 = 6,
}

impl TempSensor {
    /// Number of valid sensor ids
    pub const COUNT: u8 = 7;

    /// Look up a sensor by its numeric id
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TempSensor::ColdJunction),
            1 => Some(TempSensor::Average),
            2 => Some(TempSensor::InnerAverage),
            3 => Some(TempSensor::Left),
            4 => Some(TempSensor::Right),
            5 => Some(TempSensor::Extra1),
            6 => Some(TempSensor::Extra2),
            _ => None,
        }
    }

    /// Numeric id of this sensor
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Thermocouple channel backing this sensor, if it is a physical channel
    pub fn channel(self) -> Option<usize> {
        match self {
            TempSensor::Left => Some(0),
            TempSensor::Right => Some(1),
            TempSensor::Extra1 => Some(2),
            TempSensor::Extra2 => Some(3),
            _ => None,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            TempSensor::ColdJunction => "Cold junction",
            TempSensor::Average => "Average",
            TempSensor::InnerAverage => "Inner average",
            TempSensor::Left => "Left",
            TempSensor::Right => "Right",
            TempSensor::Extra1 => "Extra 1",
            TempSensor::Extra2 => "Extra 2",
        }
    }
}
