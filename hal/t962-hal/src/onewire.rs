//! One-wire bus abstractions
//!
//! Byte-level access to a Dallas/Maxim one-wire bus. The bus master (bit
//! banged GPIO, UART trick or a DS2482 bridge) is provided by the chip HAL.

/// Errors from one-wire bus operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneWireError {
    /// No presence pulse after reset
    NoDevice,
    /// Bus held low
    BusShorted,
    /// CRC of a ROM code or scratchpad did not match
    Crc,
    /// Bus master pin or peripheral failed
    Io,
}

/// 64-bit ROM code of a one-wire device
///
/// Byte 0 is the family code, bytes 1..7 the serial number and byte 7 the
/// CRC8 of the first seven bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RomCode(pub [u8; 8]);

impl RomCode {
    /// Family code of the device
    pub fn family(&self) -> u8 {
        self.0[0]
    }

    /// Read a single bit of the ROM code (LSB of byte 0 is bit 0)
    pub fn bit(&self, index: usize) -> bool {
        self.0[index / 8] & (1 << (index % 8)) != 0
    }

    /// Set a single bit of the ROM code
    pub fn set_bit(&mut self, index: usize, value: bool) {
        let mask = 1 << (index % 8);
        if value {
            self.0[index / 8] |= mask;
        } else {
            self.0[index / 8] &= !mask;
        }
    }
}

/// One-wire bus master
pub trait OneWireBus {
    /// Issue a reset pulse
    ///
    /// Returns `Ok(true)` if at least one device answered with a presence
    /// pulse.
    fn reset(&mut self) -> Result<bool, OneWireError>;

    /// Write a single time slot
    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError>;

    /// Read a single time slot
    fn read_bit(&mut self) -> Result<bool, OneWireError>;

    /// Write a byte, LSB first
    fn write_byte(&mut self, byte: u8) -> Result<(), OneWireError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Read a byte, LSB first
    fn read_byte(&mut self) -> Result<u8, OneWireError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }
}

impl<T: OneWireBus + ?Sized> OneWireBus for &mut T {
    fn reset(&mut self) -> Result<bool, OneWireError> {
        T::reset(self)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError> {
        T::write_bit(self, bit)
    }

    fn read_bit(&mut self) -> Result<bool, OneWireError> {
        T::read_bit(self)
    }
}
