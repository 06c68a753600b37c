//! Oversampling ADC front end
//!
//! The thermocouple amplifiers feed the on-chip 10-bit ADC. Summing 16
//! conversions yields 4 extra bits of resolution; the acquisition divides
//! the sum back down to recover the fractional part.

use t962_hal::adc::{AdcConverter, AdcReader};

/// Conversions summed per reading
pub const OVERSAMPLE_COUNT: u16 = 16;

/// ADC reader that sums [`OVERSAMPLE_COUNT`] conversions per reading
pub struct OversamplingAdc<C> {
    converter: C,
    /// Failed conversions since creation
    errors: u32,
}

impl<C: AdcConverter> OversamplingAdc<C> {
    /// Wrap a single-shot converter
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            errors: 0,
        }
    }

    /// Number of failed conversions so far
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    /// Full-scale code of one conversion
    pub fn full_scale() -> u16 {
        u16::MAX
            .checked_shr(16u32.saturating_sub(u32::from(C::RESOLUTION_BITS)))
            .unwrap_or(0)
    }
}

impl<C: AdcConverter> AdcReader for OversamplingAdc<C> {
    fn read_raw(&mut self, channel: u8) -> u16 {
        let mut sum: u16 = 0;
        for _ in 0..OVERSAMPLE_COUNT {
            // A failed conversion reads as full scale so the result is
            // implausibly hot rather than silently cold.
            let sample = match self.converter.convert(channel) {
                Ok(sample) => sample.min(Self::full_scale()),
                Err(_e) => {
                    self.errors = self.errors.saturating_add(1);
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ADC channel {} conversion failed: {}", channel, _e);
                    Self::full_scale()
                }
            };
            sum = sum.saturating_add(sample);
        }
        sum
    }
}
