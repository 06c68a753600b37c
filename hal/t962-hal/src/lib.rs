//! T-962 Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the reflow controller
//! logic is written against. Chip support (LPC214x, host mocks, ...) provides
//! the implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  t962-core (acquisition, setup table)   │
//! └─────────────────────────────────────────┘
//!            │                     │
//!            ▼                     ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │  t962-drivers    │──▶│ t962-hal (this   │
//! │  MAX31850/31855  │   │ crate - traits)  │
//! └──────────────────┘   └──────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`adc::AdcReader`] - Raw analog conversions
//! - [`onewire::OneWireBus`] - Dallas/Maxim one-wire bus
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`spi::SpiBus`] - Multi-slave SPI bus operations
//! - [`flash::FlashStorage`] - Persistent key-value blobs
//! - [`nvstore::NvStore`] - Integer configuration store

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;
pub mod i2c;
pub mod nvstore;
pub mod onewire;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use adc::AdcReader;
pub use flash::{FlashStorage, StorageKey};
pub use i2c::I2cBus;
pub use nvstore::{NvKey, NvStore};
pub use onewire::OneWireBus;
pub use spi::SpiBus;
