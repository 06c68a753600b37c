//! One-wire protocol layer
//!
//! ROM search, device addressing and scratchpad transfers shared by the
//! MAX31850K and DS18B20 drivers.

pub mod bitbang;
#[cfg(test)]
pub(crate) mod sim;

pub use bitbang::BitBangOneWire;

use t962_hal::onewire::{OneWireBus, OneWireError, RomCode};

/// ROM command: enumerate devices
pub const CMD_SEARCH_ROM: u8 = 0xF0;
/// ROM command: address one device
pub const CMD_MATCH_ROM: u8 = 0x55;
/// ROM command: address every device
pub const CMD_SKIP_ROM: u8 = 0xCC;
/// Function command: start a temperature conversion
pub const CMD_CONVERT_T: u8 = 0x44;
/// Function command: read the 9-byte scratchpad
pub const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Scratchpad length of the MAX31850K and DS18B20
pub const SCRATCHPAD_LEN: usize = 9;

/// Dallas/Maxim CRC8 (polynomial x^8 + x^5 + x^4 + 1, reflected)
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// Check the CRC byte of a ROM code
pub fn rom_crc_ok(rom: &RomCode) -> bool {
    crc8(&rom.0[..7]) == rom.0[7]
}

/// Incremental ROM search (Maxim AN187)
///
/// Each call to [`next`](Self::next) walks the search tree once and yields
/// one device.
#[derive(Debug, Clone, Default)]
pub struct RomSearch {
    rom: RomCode,
    /// 1-based bit position of the last branch where 0 was taken
    last_discrepancy: usize,
    done: bool,
}

impl RomSearch {
    /// Start a new search
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the next device on the bus
    ///
    /// Returns `Ok(None)` when every device has been reported.
    pub fn next<B: OneWireBus + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<Option<RomCode>, OneWireError> {
        if self.done || !bus.reset()? {
            self.done = true;
            return Ok(None);
        }

        bus.write_byte(CMD_SEARCH_ROM)?;

        let mut last_zero = 0;
        for bit_number in 1..=64 {
            let index = bit_number - 1;
            let id_bit = bus.read_bit()?;
            let cmp_id_bit = bus.read_bit()?;

            let direction = match (id_bit, cmp_id_bit) {
                // Nobody answered
                (true, true) => {
                    self.done = true;
                    return Ok(None);
                }
                (true, false) => true,
                (false, true) => false,
                (false, false) => {
                    let direction = if bit_number < self.last_discrepancy {
                        self.rom.bit(index)
                    } else {
                        bit_number == self.last_discrepancy
                    };
                    if !direction {
                        last_zero = bit_number;
                    }
                    direction
                }
            };

            self.rom.set_bit(index, direction);
            bus.write_bit(direction)?;
        }

        if !rom_crc_ok(&self.rom) {
            self.done = true;
            return Err(OneWireError::Crc);
        }

        self.last_discrepancy = last_zero;
        if last_zero == 0 {
            self.done = true;
        }

        Ok(Some(self.rom))
    }
}

/// Enumerate every device on the bus into `devices`
///
/// Devices beyond the capacity of `devices` are skipped.
pub fn search_all<B: OneWireBus + ?Sized, const N: usize>(
    bus: &mut B,
    devices: &mut heapless::Vec<RomCode, N>,
) -> Result<(), OneWireError> {
    devices.clear();
    let mut search = RomSearch::new();
    while let Some(rom) = search.next(bus)? {
        if devices.push(rom).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("One-wire device list full, ignoring {}", rom);
            break;
        }
    }
    Ok(())
}

/// Address a single device with Match ROM
pub fn select<B: OneWireBus + ?Sized>(bus: &mut B, rom: &RomCode) -> Result<(), OneWireError> {
    if !bus.reset()? {
        return Err(OneWireError::NoDevice);
    }
    bus.write_byte(CMD_MATCH_ROM)?;
    for &byte in &rom.0 {
        bus.write_byte(byte)?;
    }
    Ok(())
}

/// Read and CRC-check the scratchpad of `rom`
pub fn read_scratchpad<B: OneWireBus + ?Sized>(
    bus: &mut B,
    rom: &RomCode,
) -> Result<[u8; SCRATCHPAD_LEN], OneWireError> {
    select(bus, rom)?;
    bus.write_byte(CMD_READ_SCRATCHPAD)?;

    let mut scratchpad = [0u8; SCRATCHPAD_LEN];
    for byte in scratchpad.iter_mut() {
        *byte = bus.read_byte()?;
    }

    if crc8(&scratchpad[..SCRATCHPAD_LEN - 1]) != scratchpad[SCRATCHPAD_LEN - 1] {
        return Err(OneWireError::Crc);
    }
    Ok(scratchpad)
}

/// Start a conversion on every device at once
pub fn start_conversion<B: OneWireBus + ?Sized>(bus: &mut B) -> Result<(), OneWireError> {
    if !bus.reset()? {
        return Err(OneWireError::NoDevice);
    }
    bus.write_byte(CMD_SKIP_ROM)?;
    bus.write_byte(CMD_CONVERT_T)
}
