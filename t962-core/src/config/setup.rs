//! Setup menu item registry
//!
//! A fixed table of user-adjustable settings. Each item maps a raw integer
//! in the NV store to a scaled, formatted value:
//! `value = (raw + offset) * multiplier`.

use core::fmt::{self, Write};

use t962_hal::{NvKey, NvStore};

use super::validate::ConfigValidator;

/// Errors from setup registry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Item index outside the table
    InvalidItem,
    /// Output sink rejected the text
    Format,
}

impl From<fmt::Error> for SetupError {
    fn from(_: fmt::Error) -> Self {
        SetupError::Format
    }
}

/// How an item's scaled value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValueFormat {
    /// Minimum field width
    pub width: usize,
    /// Digits after the decimal point
    pub precision: usize,
    /// Always print the sign
    pub signed: bool,
    /// Unit suffix
    pub unit: &'static str,
}

impl ValueFormat {
    /// Plain number with the given width and precision
    pub const fn new(width: usize, precision: usize) -> Self {
        Self {
            width,
            precision,
            signed: false,
            unit: "",
        }
    }

    /// Append a unit suffix
    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Print an explicit `+` for positive values
    pub const fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Write `value` to `out`
    pub fn write<W: Write + ?Sized>(&self, out: &mut W, value: f32) -> fmt::Result {
        if self.signed {
            write!(
                out,
                "{:+w$.p$}{}",
                value,
                self.unit,
                w = self.width,
                p = self.precision
            )
        } else {
            write!(
                out,
                "{:w$.p$}{}",
                value,
                self.unit,
                w = self.width,
                p = self.precision
            )
        }
    }
}

/// One adjustable setting
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupItem {
    /// Menu label
    pub label: &'static str,
    /// Width the label is padded to before the value
    pub column: usize,
    /// Backing NV key
    pub key: NvKey,
    /// Lowest raw value reachable from the menu
    pub min: i32,
    /// Highest raw value reachable from the menu
    pub max: i32,
    /// Added to the raw value before scaling
    pub offset: i32,
    /// Scale from raw units to display units
    pub multiplier: f32,
    /// Rendering of the scaled value
    pub format: ValueFormat,
}

impl SetupItem {
    /// Find the item backed by `key`
    pub fn for_key(key: NvKey) -> Option<&'static SetupItem> {
        SETUP_ITEMS.iter().find(|item| item.key == key)
    }

    /// Scaled value of a raw integer
    pub fn scale(&self, raw: i32) -> f32 {
        raw.saturating_add(self.offset) as f32 * self.multiplier
    }

    /// Raw integer for a scaled value, truncating toward zero
    pub fn unscale(&self, value: f32) -> i32 {
        ((value / self.multiplier) as i32).saturating_sub(self.offset)
    }

    /// Check if `raw` is inside the item bounds
    pub fn contains(&self, raw: i32) -> bool {
        (self.min..=self.max).contains(&raw)
    }

    /// Clamp `raw` into the item bounds
    pub fn clamp(&self, raw: i32) -> i32 {
        raw.clamp(self.min, self.max)
    }

    /// Write the label and `value` to `out`
    pub fn write_formatted<W: Write + ?Sized>(&self, out: &mut W, value: f32) -> fmt::Result {
        write!(out, "{:<w$}", self.label, w = self.column)?;
        self.format.write(out, value)
    }
}

/// The setup menu, in display order
pub static SETUP_ITEMS: [SetupItem; 9] = [
    SetupItem {
        label: "Min fan speed",
        column: 17,
        key: NvKey::MinFanSpeed,
        min: 0,
        max: 254,
        offset: 0,
        multiplier: 1.0,
        format: ValueFormat::new(4, 0),
    },
    SetupItem {
        label: "Cycle done beep",
        column: 16,
        key: NvKey::BeepDoneLength,
        min: 0,
        max: 254,
        offset: 0,
        multiplier: 0.1,
        format: ValueFormat::new(4, 1).unit("s"),
    },
    SetupItem {
        label: "Max. Int. Temp.",
        column: 16,
        key: NvKey::StopTemp,
        min: 154,
        max: 254,
        offset: 46,
        multiplier: 1.0,
        format: ValueFormat::new(4, 0).unit("C"),
    },
    SetupItem {
        label: "Standby Temp.",
        column: 16,
        key: NvKey::StandbyTemp,
        min: 10,
        max: 80,
        offset: 0,
        multiplier: 1.0,
        format: ValueFormat::new(4, 0).unit("C"),
    },
    SetupItem {
        label: "Use ext. TC as FB",
        column: 18,
        key: NvKey::UseExtTc,
        min: 0,
        max: 1,
        offset: 0,
        multiplier: 1.0,
        format: ValueFormat::new(1, 0),
    },
    SetupItem {
        label: "Left TC gain",
        column: 16,
        key: NvKey::TcLeftGain,
        min: 10,
        max: 190,
        offset: 0,
        multiplier: 0.01,
        format: ValueFormat::new(5, 2),
    },
    SetupItem {
        label: "Left TC offset",
        column: 16,
        key: NvKey::TcLeftOffset,
        min: 0,
        max: 200,
        offset: -100,
        multiplier: 0.25,
        format: ValueFormat::new(5, 2).signed(),
    },
    SetupItem {
        label: "Right TC gain",
        column: 16,
        key: NvKey::TcRightGain,
        min: 10,
        max: 190,
        offset: 0,
        multiplier: 0.01,
        format: ValueFormat::new(5, 2),
    },
    SetupItem {
        label: "Right TC offset",
        column: 16,
        key: NvKey::TcRightOffset,
        min: 0,
        max: 200,
        offset: -100,
        multiplier: 0.25,
        format: ValueFormat::new(5, 2).signed(),
    },
];

/// `fmt::Write` sink over a byte buffer that silently drops what does not fit
///
/// Truncation happens on a character boundary, so the written prefix is
/// always valid UTF-8.
struct TruncatingWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut end = s.len().min(self.buf.len() - self.len);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf[self.len..self.len + end].copy_from_slice(&s.as_bytes()[..end]);
        self.len += end;
        Ok(())
    }
}

/// Setup registry over an NV store
///
/// Every write goes through the store and is followed by the
/// [`ConfigValidator`] hook.
pub struct Setup<S, V> {
    store: S,
    validator: V,
}

impl<S: NvStore, V: ConfigValidator> Setup<S, V> {
    /// Create a registry over `store`
    pub fn new(store: S, validator: V) -> Self {
        Self { store, validator }
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Backing store, mutable
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the backing store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Number of items in the table
    pub fn item_count(&self) -> usize {
        SETUP_ITEMS.len()
    }

    /// Descriptor of `item`
    pub fn item(&self, item: usize) -> Result<&'static SetupItem, SetupError> {
        SETUP_ITEMS.get(item).ok_or(SetupError::InvalidItem)
    }

    fn raw_value(&self, item: usize) -> Result<i32, SetupError> {
        let entry = self.item(item)?;
        Ok(self.store.get_config(entry.key))
    }

    /// Scaled value of `item`
    pub fn value(&self, item: usize) -> Result<f32, SetupError> {
        let entry = self.item(item)?;
        Ok(entry.scale(self.store.get_config(entry.key)))
    }

    /// Store a raw value for `item`
    ///
    /// No clamping is done here; the validator hook runs afterwards.
    pub fn set_value(&mut self, item: usize, raw: i32) -> Result<(), SetupError> {
        let entry = self.item(item)?;
        self.store.set_config(entry.key, raw);
        self.validator.validate(&mut self.store);
        Ok(())
    }

    /// Store a scaled value for `item`
    pub fn set_real_value(&mut self, item: usize, value: f32) -> Result<(), SetupError> {
        let raw = self.item(item)?.unscale(value);
        self.set_value(item, raw)
    }

    /// Add `delta` raw steps to `item`, clamped to its bounds
    pub fn increase_value(&mut self, item: usize, delta: i32) -> Result<(), SetupError> {
        let raw = self.raw_value(item)?.saturating_add(delta);
        let clamped = self.item(item)?.clamp(raw);
        self.set_value(item, clamped)
    }

    /// Subtract `delta` raw steps from `item`, clamped to its bounds
    pub fn decrease_value(&mut self, item: usize, delta: i32) -> Result<(), SetupError> {
        let raw = self.raw_value(item)?.saturating_sub(delta);
        let clamped = self.item(item)?.clamp(raw);
        self.set_value(item, clamped)
    }

    /// Write the formatted line of `item` to `out`
    pub fn print_formatted_value<W: Write + ?Sized>(
        &self,
        item: usize,
        out: &mut W,
    ) -> Result<(), SetupError> {
        let entry = self.item(item)?;
        entry.write_formatted(out, self.value(item)?)?;
        Ok(())
    }

    /// Format `item` into `buf`, truncating to its length
    ///
    /// Returns the number of bytes written.
    pub fn format_value_into(&self, item: usize, buf: &mut [u8]) -> Result<usize, SetupError> {
        let mut writer = TruncatingWriter { buf, len: 0 };
        self.print_formatted_value(item, &mut writer)?;
        Ok(writer.len)
    }

    /// Format `item` into a fixed-capacity string, truncating to `N` bytes
    pub fn formatted_value<const N: usize>(
        &self,
        item: usize,
    ) -> Result<heapless::String<N>, SetupError> {
        let mut buf = [0u8; N];
        let len = self.format_value_into(item, &mut buf)?;
        let text = core::str::from_utf8(&buf[..len]).map_err(|_| SetupError::Format)?;

        let mut out = heapless::String::new();
        out.push_str(text).map_err(|_| SetupError::Format)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NvCache, ReflowDefaults};
    use proptest::prelude::*;

    const FAN: usize = 0;
    const BEEP: usize = 1;
    const STOP_TEMP: usize = 2;
    const STANDBY_TEMP: usize = 3;
    const EXT_TC: usize = 4;
    const LEFT_OFFSET: usize = 6;

    fn setup() -> Setup<NvCache, ReflowDefaults> {
        let mut setup = Setup::new(NvCache::new(), ReflowDefaults);
        // Populate defaults over the erased cache
        setup.validator.validate(&mut setup.store);
        setup
    }

    #[test]
    fn test_item_count() {
        assert_eq!(setup().item_count(), SETUP_ITEMS.len());
    }

    #[test]
    fn test_invalid_item() {
        let mut setup = setup();
        let count = setup.item_count();
        assert_eq!(setup.value(count), Err(SetupError::InvalidItem));
        assert_eq!(setup.set_value(count, 1), Err(SetupError::InvalidItem));
        assert_eq!(setup.increase_value(usize::MAX, 1), Err(SetupError::InvalidItem));
        assert_eq!(
            setup.format_value_into(count, &mut [0u8; 8]),
            Err(SetupError::InvalidItem)
        );
    }

    #[test]
    fn test_scaled_value() {
        let mut setup = setup();
        setup.set_value(STOP_TEMP, 204).unwrap();
        assert_eq!(setup.value(STOP_TEMP), Ok(250.0));

        setup.set_value(BEEP, 15).unwrap();
        assert!((setup.value(BEEP).unwrap() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_set_real_value_with_offset() {
        let mut setup = setup();
        setup.set_real_value(LEFT_OFFSET, -2.5).unwrap();
        assert_eq!(setup.store().get_config(NvKey::TcLeftOffset), 90);
        assert_eq!(setup.value(LEFT_OFFSET), Ok(-2.5));
    }

    #[test]
    fn test_increase_clamps_to_max() {
        let mut setup = setup();
        setup.set_value(EXT_TC, 0).unwrap();
        setup.increase_value(EXT_TC, 1).unwrap();
        assert_eq!(setup.value(EXT_TC), Ok(1.0));
        setup.increase_value(EXT_TC, 1).unwrap();
        assert_eq!(setup.value(EXT_TC), Ok(1.0));
    }

    #[test]
    fn test_decrease_clamps_to_min() {
        let mut setup = setup();
        setup.decrease_value(STOP_TEMP, 1000).unwrap();
        assert_eq!(setup.store().get_config(NvKey::StopTemp), 154);
        assert_eq!(setup.value(STOP_TEMP), Ok(200.0));
    }

    #[test]
    fn test_formatted_value() {
        let mut setup = setup();
        setup.set_value(FAN, 8).unwrap();
        setup.set_value(BEEP, 10).unwrap();
        setup.set_value(LEFT_OFFSET, 104).unwrap();

        let fan: heapless::String<32> = setup.formatted_value(FAN).unwrap();
        assert_eq!(fan.as_str(), "Min fan speed       8");

        let beep: heapless::String<32> = setup.formatted_value(BEEP).unwrap();
        assert_eq!(beep.as_str(), "Cycle done beep  1.0s");

        let offset: heapless::String<32> = setup.formatted_value(LEFT_OFFSET).unwrap();
        assert_eq!(offset.as_str(), "Left TC offset  +1.00");
    }

    #[test]
    fn test_format_truncates() {
        let mut setup = setup();
        setup.set_value(STOP_TEMP, 204).unwrap();

        let mut buf = [0u8; 8];
        let len = setup.format_value_into(STOP_TEMP, &mut buf).unwrap();
        assert_eq!(len, 8);
        assert_eq!(&buf, b"Max. Int");

        let mut full = [0u8; 64];
        let len = setup.format_value_into(STOP_TEMP, &mut full).unwrap();
        assert_eq!(&full[..len], b"Max. Int. Temp.  250C");
    }

    #[test]
    fn test_print_formatted_value() {
        let mut setup = setup();
        setup.set_value(EXT_TC, 1).unwrap();

        let mut out: heapless::String<32> = heapless::String::new();
        setup.print_formatted_value(EXT_TC, &mut out).unwrap();
        assert_eq!(out.as_str(), "Use ext. TC as FB 1");
    }

    #[test]
    fn test_write_above_range_clamps_to_max() {
        let mut setup = setup();
        setup.set_real_value(STOP_TEMP, 302.0).unwrap();
        assert_eq!(setup.store().get_config(NvKey::StopTemp), 254);
        assert_eq!(setup.value(STOP_TEMP), Ok(300.0));

        setup.set_value(FAN, 255).unwrap();
        assert_eq!(setup.value(FAN), Ok(254.0));
    }

    #[test]
    fn test_menu_lines() {
        let mut setup = setup();
        setup.set_value(STANDBY_TEMP, 50).unwrap();
        setup.set_value(EXT_TC, 0).unwrap();

        let standby: heapless::String<32> = setup.formatted_value(STANDBY_TEMP).unwrap();
        assert_eq!(standby.as_str(), "Standby Temp.     50C");

        let ext: heapless::String<32> = setup.formatted_value(EXT_TC).unwrap();
        assert_eq!(ext.as_str(), "Use ext. TC as FB 0");
    }

    /// Validator counting how often it runs
    #[derive(Default)]
    struct CountingValidator(usize);

    impl ConfigValidator for CountingValidator {
        fn validate<S: NvStore + ?Sized>(&mut self, _store: &mut S) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_every_write_runs_validator() {
        let mut setup = Setup::new(NvCache::new(), CountingValidator::default());

        setup.set_value(FAN, 10).unwrap();
        assert_eq!(setup.validator.0, 1);
        setup.set_real_value(BEEP, 2.0).unwrap();
        assert_eq!(setup.validator.0, 2);
        setup.increase_value(FAN, 1).unwrap();
        assert_eq!(setup.validator.0, 3);
        setup.decrease_value(FAN, 1).unwrap();
        assert_eq!(setup.validator.0, 4);

        // Rejected writes and reads do not validate
        assert!(setup.set_value(setup.item_count(), 1).is_err());
        setup.value(FAN).unwrap();
        assert_eq!(setup.validator.0, 4);
    }

    proptest! {
        #[test]
        fn prop_increase_decrease_stay_in_bounds(
            item in 0..SETUP_ITEMS.len(),
            start in 0i32..=255,
            delta in any::<i32>(),
            increase in any::<bool>(),
        ) {
            let mut setup = setup();
            let entry = setup.item(item).unwrap();
            setup.store_mut().set_config(entry.key, entry.clamp(start));

            if increase {
                setup.increase_value(item, delta).unwrap();
            } else {
                setup.decrease_value(item, delta).unwrap();
            }

            prop_assert!(entry.contains(setup.store().get_config(entry.key)));
        }

        #[test]
        fn prop_real_value_round_trip(item in 0..SETUP_ITEMS.len(), raw_fraction in 0.0f32..=1.0) {
            let mut setup = setup();
            let entry = setup.item(item).unwrap();
            let raw = entry.min + ((entry.max - entry.min) as f32 * raw_fraction) as i32;
            let value = entry.scale(raw);

            setup.set_real_value(item, value).unwrap();
            let read_back = setup.value(item).unwrap();

            prop_assert!((read_back - value).abs() <= entry.multiplier * 1.001 + 1e-4);
        }
    }
}
