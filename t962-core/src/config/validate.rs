//! Post-write validation of the NV configuration

use t962_hal::nvstore::NV_ERASED;
use t962_hal::{NvKey, NvStore};

use super::setup::SetupItem;

/// Hook run after every configuration write
///
/// Implementations enforce consistency across related settings.
pub trait ConfigValidator {
    /// Check and repair the values in `store`
    fn validate<S: NvStore + ?Sized>(&mut self, store: &mut S);
}

/// Factory defaults for every NV key
pub const FACTORY_DEFAULTS: [(NvKey, i32); 9] = [
    (NvKey::MinFanSpeed, 8),
    (NvKey::BeepDoneLength, 10),
    (NvKey::StopTemp, 204),
    (NvKey::StandbyTemp, 50),
    (NvKey::UseExtTc, 0),
    (NvKey::TcLeftGain, 100),
    (NvKey::TcLeftOffset, 100),
    (NvKey::TcRightGain, 100),
    (NvKey::TcRightOffset, 100),
];

/// Validator of the reflow controller settings
///
/// Erased keys get their factory default, anything else outside the setup
/// bounds is clamped into them.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReflowDefaults;

impl ConfigValidator for ReflowDefaults {
    fn validate<S: NvStore + ?Sized>(&mut self, store: &mut S) {
        for (key, default) in FACTORY_DEFAULTS {
            let raw = store.get_config(key);
            let repaired = if raw == NV_ERASED {
                default
            } else {
                match SetupItem::for_key(key) {
                    Some(item) => item.clamp(raw),
                    None => raw,
                }
            };

            if repaired != raw {
                #[cfg(feature = "defmt")]
                defmt::warn!("NV {} out of range ({}), set to {}", key, raw, repaired);
                store.set_config(key, repaired);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NvCache;

    #[test]
    fn test_defaults_cover_every_key() {
        for key in NvKey::ALL {
            assert!(FACTORY_DEFAULTS.iter().any(|(k, _)| *k == key));
        }
    }

    #[test]
    fn test_defaults_within_bounds() {
        for (key, default) in FACTORY_DEFAULTS {
            let item = SetupItem::for_key(key).unwrap();
            assert!(item.contains(default), "{:?}", key);
        }
    }

    #[test]
    fn test_erased_store_gets_defaults() {
        let mut store = NvCache::new();
        ReflowDefaults.validate(&mut store);

        for (key, default) in FACTORY_DEFAULTS {
            assert_eq!(store.get_config(key), default);
        }
    }

    #[test]
    fn test_out_of_range_clamped() {
        let mut store = NvCache::new();
        ReflowDefaults.validate(&mut store);

        store.set_config(NvKey::StandbyTemp, 200);
        store.set_config(NvKey::StopTemp, 3);
        ReflowDefaults.validate(&mut store);

        assert_eq!(store.get_config(NvKey::StandbyTemp), 80);
        assert_eq!(store.get_config(NvKey::StopTemp), 154);
    }

    #[test]
    fn test_valid_values_untouched() {
        let mut store = NvCache::new();
        ReflowDefaults.validate(&mut store);
        store.set_config(NvKey::MinFanSpeed, 33);
        store.mark_clean();

        ReflowDefaults.validate(&mut store);
        assert_eq!(store.get_config(NvKey::MinFanSpeed), 33);
        assert!(!store.is_dirty());
    }
}
