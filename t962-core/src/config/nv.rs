//! RAM copy of the NV configuration and its flash image
//!
//! Settings are edited in RAM through [`NvCache`] and written back to flash
//! as a postcard-encoded [`NvImage`] when dirty.

use serde::{Deserialize, Serialize};

use t962_hal::flash::FlashError;
use t962_hal::nvstore::{NV_ERASED, NV_KEY_COUNT};
use t962_hal::{FlashStorage, NvKey, NvStore, StorageKey};

/// Magic number to identify a valid NV image
pub const NV_MAGIC: u32 = 0x5439_3632; // "T962"

/// Current NV image version
pub const NV_VERSION: u8 = 1;

/// Upper bound of an encoded image
pub const NV_IMAGE_MAX_SIZE: usize = 32;

/// Errors from NV persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvError {
    /// Flash operation failed
    Flash(FlashError),
    /// Encoding failed
    Serialize,
    /// Decoding failed
    Deserialize,
    /// Magic or version mismatch
    VersionMismatch,
    /// Checksum mismatch
    Crc,
}

impl From<FlashError> for NvError {
    fn from(e: FlashError) -> Self {
        NvError::Flash(e)
    }
}

/// NV configuration as stored in flash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvImage {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// One byte per [`NvKey`]
    pub values: [u8; NV_KEY_COUNT],
    /// CRC32 over magic, version and values
    pub crc: u32,
}

impl NvImage {
    /// Build an image with a valid header and CRC
    pub fn new(values: [u8; NV_KEY_COUNT]) -> Self {
        let mut image = Self {
            magic: NV_MAGIC,
            version: NV_VERSION,
            values,
            crc: 0,
        };
        image.update_crc();
        image
    }

    /// Check if magic and version match
    pub fn is_valid(&self) -> bool {
        self.magic == NV_MAGIC && self.version == NV_VERSION
    }

    /// Calculate CRC32 for the image (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.values);
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

/// In-RAM NV configuration
///
/// Starts out erased (every key reads [`NV_ERASED`]). Writes saturate to
/// `0..=254`, so a stored value never reads back as erased, and mark the
/// cache dirty when the value changes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvCache {
    values: [u8; NV_KEY_COUNT],
    dirty: bool,
}

impl Default for NvCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NvCache {
    /// Erased cache
    pub const fn new() -> Self {
        Self {
            values: [NV_ERASED as u8; NV_KEY_COUNT],
            dirty: false,
        }
    }

    /// Check if the cache holds unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget about unsaved changes
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Snapshot of the cache as a flash image
    pub fn to_image(&self) -> NvImage {
        NvImage::new(self.values)
    }

    /// Replace the cache contents with a verified image
    pub fn load_image(&mut self, image: &NvImage) -> Result<(), NvError> {
        if !image.is_valid() {
            return Err(NvError::VersionMismatch);
        }
        if !image.verify_crc() {
            return Err(NvError::Crc);
        }
        self.values = image.values;
        self.dirty = false;
        Ok(())
    }

    /// Encode the cache into `buf`, returning the encoded length
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, NvError> {
        postcard::to_slice(&self.to_image(), buf)
            .map(|used| used.len())
            .map_err(|_| NvError::Serialize)
    }

    /// Decode an encoded image into the cache
    pub fn decode(&mut self, bytes: &[u8]) -> Result<(), NvError> {
        let image: NvImage = postcard::from_bytes(bytes).map_err(|_| NvError::Deserialize)?;
        self.load_image(&image)
    }

    /// Write the cache to flash if it changed
    pub async fn save<F: FlashStorage>(&mut self, flash: &mut F) -> Result<(), NvError> {
        if !self.dirty {
            return Ok(());
        }

        let mut buf = [0u8; NV_IMAGE_MAX_SIZE];
        let len = self.encode(&mut buf)?;
        flash.write(StorageKey::NvConfig, &buf[..len]).await?;
        self.dirty = false;

        #[cfg(feature = "defmt")]
        defmt::info!("NV configuration saved ({} bytes)", len);
        Ok(())
    }

    /// Load the cache from flash
    ///
    /// On error the cache is left unchanged.
    pub async fn restore<F: FlashStorage>(&mut self, flash: &mut F) -> Result<(), NvError> {
        let mut buf = [0u8; NV_IMAGE_MAX_SIZE];
        let len = flash.read(StorageKey::NvConfig, &mut buf).await?;
        self.decode(&buf[..len])
    }
}

impl NvStore for NvCache {
    fn get_config(&self, key: NvKey) -> i32 {
        i32::from(self.values[key.index()])
    }

    fn set_config(&mut self, key: NvKey, value: i32) {
        let value = value.clamp(0, NV_ERASED - 1) as u8;
        let slot = &mut self.values[key.index()];
        if *slot != value {
            *slot = value;
            self.dirty = true;
        }
    }
}
