//! DS18B20 digital thermometer
//!
//! Used as the board ambient sensor for cold-junction compensation of the
//! ADC thermocouple path.

use t962_core::traits::{AmbientSensor, AMBIENT_ABSENT_C};
use t962_hal::onewire::{OneWireBus, OneWireError, RomCode};

use crate::onewire::{self, SCRATCHPAD_LEN};

/// One-wire family code of the DS18B20
pub const FAMILY_CODE: u8 = 0x28;

/// Scratchpad temperature after power-up, before the first conversion
pub const POWER_ON_RAW: i16 = 0x0550;

/// Decode the temperature of a DS18B20 scratchpad (°C)
///
/// Returns `None` for the power-on value, which is not a measurement.
pub fn decode(scratchpad: &[u8; SCRATCHPAD_LEN]) -> Option<f32> {
    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    if raw == POWER_ON_RAW {
        return None;
    }
    Some(f32::from(raw) / 16.0)
}

/// DS18B20 on a dedicated one-wire bus
pub struct Ds18b20Ambient<B> {
    bus: B,
    rom: Option<RomCode>,
    last: Option<f32>,
}

impl<B: OneWireBus> Ds18b20Ambient<B> {
    /// Create a driver; call [`scan`](Self::scan) to find the sensor
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            rom: None,
            last: None,
        }
    }

    /// Look for a DS18B20 on the bus
    ///
    /// Returns `Ok(true)` if one was found.
    pub fn scan(&mut self) -> Result<bool, OneWireError> {
        let mut devices: heapless::Vec<RomCode, 4> = heapless::Vec::new();
        onewire::search_all(&mut self.bus, &mut devices)?;
        self.rom = devices.iter().copied().find(|rom| rom.family() == FAMILY_CODE);
        self.last = None;
        Ok(self.rom.is_some())
    }

    /// Collect the previous conversion and start the next one
    pub fn update(&mut self) {
        let Some(rom) = self.rom else {
            return;
        };

        self.last = onewire::read_scratchpad(&mut self.bus, &rom)
            .ok()
            .and_then(|scratchpad| decode(&scratchpad));

        if let Err(_e) = onewire::start_conversion(&mut self.bus) {
            #[cfg(feature = "defmt")]
            defmt::warn!("DS18B20 conversion start failed: {}", _e);
        }
    }

    /// ROM code of the sensor, if one was found
    pub fn rom(&self) -> Option<RomCode> {
        self.rom
    }
}

impl<B> AmbientSensor for Ds18b20Ambient<B> {
    fn read_ambient(&self) -> f32 {
        self.last.unwrap_or(AMBIENT_ABSENT_C)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onewire::sim::{SimBus, SimDevice};

    fn scratchpad(raw: i16) -> [u8; SCRATCHPAD_LEN - 1] {
        let [lsb, msb] = raw.to_le_bytes();
        [lsb, msb, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10]
    }

    #[test]
    fn test_decode() {
        // Datasheet examples
        let cases: [(i16, f32); 5] = [
            (0x0191, 25.0625),
            (0x07D0, 125.0),
            (0x0000, 0.0),
            (-0x0008, -0.5),
            (-0x0370, -55.0),
        ];
        for (raw, expected) in cases {
            let sp = SimDevice::new(SimDevice::rom(FAMILY_CODE, 1), scratchpad(raw)).scratchpad;
            assert_eq!(decode(&sp), Some(expected));
        }
    }

    #[test]
    fn test_power_on_value_ignored() {
        let sp = SimDevice::new(SimDevice::rom(FAMILY_CODE, 1), scratchpad(POWER_ON_RAW))
            .scratchpad;
        assert_eq!(decode(&sp), None);
    }

    #[test]
    fn test_ambient_reading() {
        let device = SimDevice::new(SimDevice::rom(FAMILY_CODE, 9), scratchpad(0x0180));
        let mut sensor = Ds18b20Ambient::new(SimBus::new(&[device]));

        assert!(sensor.scan().unwrap());
        assert_eq!(sensor.read_ambient(), AMBIENT_ABSENT_C);

        sensor.update();
        assert_eq!(sensor.read_ambient(), 24.0);
    }

    #[test]
    fn test_missing_sensor_reads_absent() {
        let other = SimDevice::new(SimDevice::rom(0x3B, 1), [0; 8]);
        let mut sensor = Ds18b20Ambient::new(SimBus::new(&[other]));

        assert!(!sensor.scan().unwrap());
        sensor.update();
        assert_eq!(sensor.read_ambient(), AMBIENT_ABSENT_C);
    }
}
