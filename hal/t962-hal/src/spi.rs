//! SPI bus abstractions
//!
//! A bus with several slave-select lines. Devices are addressed by their
//! slave-select index rather than owning a dedicated chip-select pin, which
//! matches bridges such as the SC18IS602B.

/// SPI bus master with indexed slave selects
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Number of slave-select lines on this bus
    fn slave_count(&self) -> u8;

    /// Transfer data in place with slave `slave` selected
    ///
    /// Writes data from the buffer while reading into the same buffer.
    fn transfer_in_place(&mut self, slave: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Read data from slave `slave` (writes zeros)
    fn read(&mut self, slave: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        buf.fill(0);
        self.transfer_in_place(slave, buf)
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
