//! Analog-to-digital converter abstractions
//!
//! Two levels are modelled: a converter that performs single conversions,
//! and a reader that hands out the (possibly post-processed) raw value the
//! application consumes.

/// Errors from a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Channel does not exist on this converter
    InvalidChannel,
    /// Conversion did not complete
    Timeout,
    /// Result was overwritten before it was read
    Overrun,
}

/// Single-shot ADC converter
///
/// Implemented by the chip HAL. Each call performs one conversion.
pub trait AdcConverter {
    /// Resolution of one conversion in bits (10 on the LPC214x)
    const RESOLUTION_BITS: u8;

    /// Convert one sample on `channel`
    fn convert(&mut self, channel: u8) -> Result<u16, AdcError>;
}

/// Raw analog channel reader
///
/// This is the interface the temperature acquisition consumes. Readers never
/// fail; a broken conversion shows up as an implausible value.
pub trait AdcReader {
    /// Read the raw value of `channel`
    fn read_raw(&mut self, channel: u8) -> u16;
}
