//! MAX31850K one-wire thermocouple backend
//!
//! Up to four MAX31850K converters share one bus with an optional DS18B20
//! ambient sensor. Each converter is mapped to a thermocouple channel by its
//! hardware address pins (AD0/AD1), which the device reports in its
//! scratchpad.

use t962_core::traits::{ProbeBackend, AMBIENT_ABSENT_C, TC_CHANNELS};
use t962_hal::onewire::{OneWireBus, OneWireError, RomCode};

use super::{ds18b20, TcReading};
use crate::onewire::{self, SCRATCHPAD_LEN};

/// One-wire family code of the MAX31850K
pub const FAMILY_CODE: u8 = 0x3B;

/// Devices tracked during a bus scan
pub const MAX_BUS_DEVICES: usize = 8;

/// Thermocouple fault flag in scratchpad byte 0
const FAULT: u8 = 0x01;
/// Thermocouple open-circuit, short-to-GND, short-to-VCC flags in byte 2
const TC_FAULT_MASK: u8 = 0x07;
/// Hardware address bits in scratchpad byte 4
const ADDRESS_MASK: u8 = 0x0F;

/// Decode a MAX31850K scratchpad
///
/// Returns `None` if the converter flagged a fault.
pub fn decode(scratchpad: &[u8; SCRATCHPAD_LEN]) -> Option<TcReading> {
    if scratchpad[0] & FAULT != 0 || scratchpad[2] & TC_FAULT_MASK != 0 {
        return None;
    }

    // 14-bit hot junction, 0.25 °C per LSB, left aligned
    let hot = i16::from_le_bytes([scratchpad[0], scratchpad[1]]) >> 2;
    // 12-bit cold junction, 0.0625 °C per LSB, left aligned
    let cold = i16::from_le_bytes([scratchpad[2], scratchpad[3]]) >> 4;

    Some(TcReading {
        temperature: f32::from(hot) * 0.25,
        cold_junction: f32::from(cold) * 0.0625,
    })
}

/// Hardware address reported in a MAX31850K scratchpad
pub fn address(scratchpad: &[u8; SCRATCHPAD_LEN]) -> u8 {
    scratchpad[4] & ADDRESS_MASK
}

/// One-wire thermocouple backend
///
/// Call [`scan`](Self::scan) once at boot and [`update`](Self::update) once
/// per control tick, before the acquisition cycle. `update` collects the
/// results of the conversion started by the previous call, so readings lag
/// by one tick.
pub struct OneWireProbes<B> {
    bus: B,
    thermocouples: [Option<RomCode>; TC_CHANNELS],
    ambient_rom: Option<RomCode>,
    readings: [Option<TcReading>; TC_CHANNELS],
    ambient: Option<f32>,
}

impl<B: OneWireBus> OneWireProbes<B> {
    /// Create a backend; nothing is present until [`scan`](Self::scan)
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            thermocouples: [None; TC_CHANNELS],
            ambient_rom: None,
            readings: [None; TC_CHANNELS],
            ambient: None,
        }
    }

    /// Enumerate the bus and map converters to channels
    ///
    /// Returns the number of devices found.
    pub fn scan(&mut self) -> Result<usize, OneWireError> {
        let mut devices: heapless::Vec<RomCode, MAX_BUS_DEVICES> = heapless::Vec::new();
        onewire::search_all(&mut self.bus, &mut devices)?;

        self.thermocouples = [None; TC_CHANNELS];
        self.readings = [None; TC_CHANNELS];
        self.ambient_rom = None;
        self.ambient = None;

        for rom in &devices {
            match rom.family() {
                FAMILY_CODE => {
                    let scratchpad = match onewire::read_scratchpad(&mut self.bus, rom) {
                        Ok(scratchpad) => scratchpad,
                        Err(_e) => {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("MAX31850 {} unreadable: {}", rom, _e);
                            continue;
                        }
                    };
                    let channel = address(&scratchpad) as usize;
                    match self.thermocouples.get_mut(channel) {
                        Some(slot @ None) => *slot = Some(*rom),
                        _ => {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("MAX31850 {} address {} ignored", rom, channel);
                        }
                    }
                }
                ds18b20::FAMILY_CODE if self.ambient_rom.is_none() => {
                    self.ambient_rom = Some(*rom);
                }
                _ => {}
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "One-wire scan: {} devices, thermocouples {}, ambient {}",
            devices.len(),
            self.thermocouples,
            self.ambient_rom
        );

        Ok(devices.len())
    }

    /// Collect the previous conversion and start the next one
    pub fn update(&mut self) {
        for (slot, reading) in self.thermocouples.iter().zip(self.readings.iter_mut()) {
            *reading = slot.and_then(|rom| {
                onewire::read_scratchpad(&mut self.bus, &rom)
                    .ok()
                    .and_then(|scratchpad| decode(&scratchpad))
            });
        }

        self.ambient = self.ambient_rom.and_then(|rom| {
            onewire::read_scratchpad(&mut self.bus, &rom)
                .ok()
                .and_then(|scratchpad| ds18b20::decode(&scratchpad))
        });

        if let Err(_e) = onewire::start_conversion(&mut self.bus) {
            #[cfg(feature = "defmt")]
            defmt::warn!("One-wire conversion start failed: {}", _e);
        }
    }

    /// ROM code mapped to `channel`
    pub fn thermocouple_rom(&self, channel: usize) -> Option<RomCode> {
        self.thermocouples.get(channel).copied().flatten()
    }

    /// ROM code of the ambient sensor
    pub fn ambient_rom(&self) -> Option<RomCode> {
        self.ambient_rom
    }
}

impl<B> ProbeBackend for OneWireProbes<B> {
    fn is_channel_present(&self, channel: usize) -> bool {
        matches!(self.readings.get(channel), Some(Some(_)))
    }

    fn read_temperature(&self, channel: usize) -> f32 {
        self.readings
            .get(channel)
            .copied()
            .flatten()
            .map_or(0.0, |r| r.temperature)
    }

    fn read_local_cold_junction(&self, channel: usize) -> f32 {
        self.readings
            .get(channel)
            .copied()
            .flatten()
            .map_or(0.0, |r| r.cold_junction)
    }

    fn read_ambient_sensor(&self) -> f32 {
        self.ambient.unwrap_or(AMBIENT_ABSENT_C)
    }
}
