//! Gain and offset trim for the built-in ADC thermocouple channels

use t962_hal::{NvKey, NvStore};

use crate::config::SetupItem;

/// Per-device trim of the two analog thermocouple amplifiers
///
/// Index 0 is the left channel, index 1 the right channel. A corrected
/// reading is `raw * gain + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcCalibration {
    /// Gain factor per channel
    pub gain: [f32; 2],
    /// Offset in °C per channel
    pub offset: [f32; 2],
}

impl Default for AdcCalibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AdcCalibration {
    /// No correction
    pub const IDENTITY: Self = Self {
        gain: [1.0, 1.0],
        offset: [0.0, 0.0],
    };

    /// Create a calibration from explicit trims
    pub const fn new(gain: [f32; 2], offset: [f32; 2]) -> Self {
        Self { gain, offset }
    }

    /// Load the trims stored in the NV configuration
    ///
    /// Values outside their setup bounds (erased or corrupted storage) leave
    /// the corresponding term at identity.
    pub fn from_store<S: NvStore + ?Sized>(store: &S) -> Self {
        let trim = |key: NvKey, identity: f32| {
            SetupItem::for_key(key)
                .filter(|item| item.contains(store.get_config(key)))
                .map_or(identity, |item| item.scale(store.get_config(key)))
        };

        Self {
            gain: [trim(NvKey::TcLeftGain, 1.0), trim(NvKey::TcRightGain, 1.0)],
            offset: [
                trim(NvKey::TcLeftOffset, 0.0),
                trim(NvKey::TcRightOffset, 0.0),
            ],
        }
    }

    /// Apply the trim of `channel` to a reading
    pub fn apply(&self, channel: usize, value: f32) -> f32 {
        value * self.gain[channel] + self.offset[channel]
    }
}
