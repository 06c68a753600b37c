//! Configuration
//!
//! The setup menu table, post-write validation and the NV cache persisted
//! to flash as postcard binary data.

pub mod nv;
pub mod setup;
pub mod validate;

pub use nv::{NvCache, NvError, NvImage};
pub use setup::{Setup, SetupError, SetupItem, ValueFormat, SETUP_ITEMS};
pub use validate::{ConfigValidator, ReflowDefaults, FACTORY_DEFAULTS};
