//! Board-agnostic core logic for the T-962 reflow controller firmware
//!
//! This crate contains the application logic that does not depend on
//! specific hardware implementations:
//!
//! - Thermocouple probe backend traits
//! - Temperature acquisition and feedback selection
//! - Setup menu registry over the NV configuration
//! - NV configuration cache and its flash image

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod sensor;
pub mod traits;
