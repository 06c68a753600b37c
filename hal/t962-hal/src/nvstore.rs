//! Non-volatile configuration store
//!
//! Small integer settings (fan speed, beep length, calibration trims, ...)
//! are kept in a byte-per-key store. The store is addressed by [`NvKey`].

/// Number of NV configuration keys
pub const NV_KEY_COUNT: usize = 9;

/// Value of an NV byte that has never been programmed
pub const NV_ERASED: i32 = 0xFF;

/// Keys of the NV configuration store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NvKey {
    /// Minimum convection fan speed while a profile runs
    MinFanSpeed = 0,
    /// Length of the end-of-cycle beep (0.1 s units)
    BeepDoneLength = 1,
    /// Controller shutdown temperature (offset by 46 °C)
    StopTemp = 2,
    /// Standby temperature (°C)
    StandbyTemp = 3,
    /// Non-zero when the extra thermocouples drive the feedback
    UseExtTc = 4,
    /// Left ADC channel gain trim (0.01 units)
    TcLeftGain = 5,
    /// Left ADC channel offset trim (0.25 °C units, biased by 100)
    TcLeftOffset = 6,
    /// Right ADC channel gain trim (0.01 units)
    TcRightGain = 7,
    /// Right ADC channel offset trim (0.25 °C units, biased by 100)
    TcRightOffset = 8,
}

impl NvKey {
    /// All keys, in storage order
    pub const ALL: [NvKey; NV_KEY_COUNT] = [
        NvKey::MinFanSpeed,
        NvKey::BeepDoneLength,
        NvKey::StopTemp,
        NvKey::StandbyTemp,
        NvKey::UseExtTc,
        NvKey::TcLeftGain,
        NvKey::TcLeftOffset,
        NvKey::TcRightGain,
        NvKey::TcRightOffset,
    ];

    /// Storage slot of this key
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a key by its storage slot
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Integer configuration store
///
/// Reads never fail: a key that was never written reads as whatever the
/// backing medium holds (typically [`NV_ERASED`]).
pub trait NvStore {
    /// Read the raw value stored under `key`
    fn get_config(&self, key: NvKey) -> i32;

    /// Store a raw value under `key`
    fn set_config(&mut self, key: NvKey, value: i32);
}

impl<T: NvStore + ?Sized> NvStore for &mut T {
    fn get_config(&self, key: NvKey) -> i32 {
        (**self).get_config(key)
    }

    fn set_config(&mut self, key: NvKey, value: i32) {
        (**self).set_config(key, value)
    }
}
