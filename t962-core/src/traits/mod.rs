//! Hardware abstraction traits
//!
//! These traits define the interface between the sensor fusion logic and
//! the probe drivers.

pub mod probe;

pub use probe::{AmbientSensor, NoAmbient, ProbeBackend, AMBIENT_ABSENT_C, TC_CHANNELS};
