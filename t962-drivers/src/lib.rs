//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in t962-core and t962-hal:
//!
//! - Thermocouple backends (MAX31850K on one-wire, MAX31855 behind an
//!   SC18IS602B I2C-to-SPI bridge)
//! - DS18B20 ambient sensor
//! - One-wire bus master over embedded-hal pins
//! - Oversampling ADC front end
//!
//! A firmware image picks exactly one thermocouple backend by the concrete
//! type it hands to `TemperatureAcquisition`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adc;
pub mod bridge;
pub mod compat;
pub mod onewire;
pub mod sensor;
