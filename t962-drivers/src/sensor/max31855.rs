//! MAX31855 thermocouple converters on an indexed SPI bus
//!
//! Each converter sits on its own slave select of the bus (normally the
//! SC18IS602B bridge). The MAX31855 is read-only: clocking out 32 bits
//! returns the latest conversion.
//!
//! Frame layout (MSB first):
//!
//! | Bits  | Content                                  |
//! |-------|------------------------------------------|
//! | 31:18 | thermocouple, signed, 0.25 °C per LSB    |
//! | 16    | fault                                    |
//! | 15:4  | internal (cold junction), 0.0625 °C/LSB  |
//! | 2:0   | short to VCC, short to GND, open circuit |

use t962_core::traits::{AmbientSensor, ProbeBackend, TC_CHANNELS};
use t962_hal::spi::SpiBus;

use super::TcReading;

/// Frame length in bytes
pub const FRAME_LEN: usize = 4;

/// Any fault flagged in bits 2:0
const FAULT: u32 = 1 << 16;

/// Decode a 32-bit MAX31855 frame
///
/// Returns `None` for a faulted converter and for frames that are all zeros
/// or all ones, which is what an empty slave select reads back.
pub fn decode(frame: u32) -> Option<TcReading> {
    if frame == 0 || frame == u32::MAX || frame & FAULT != 0 {
        return None;
    }

    let hot = (frame as i32) >> 18;
    let cold = ((frame << 16) as i32) >> 20;

    Some(TcReading {
        temperature: hot as f32 * 0.25,
        cold_junction: cold as f32 * 0.0625,
    })
}

/// SPI thermocouple backend
///
/// Slave select `n` is thermocouple channel `n`. The ambient sensor is
/// supplied separately since the MAX31855 has no bus for one.
pub struct SpiBridgeProbes<S, A> {
    spi: S,
    ambient: A,
    readings: [Option<TcReading>; TC_CHANNELS],
}

impl<S: SpiBus, A: AmbientSensor> SpiBridgeProbes<S, A> {
    /// Create a backend; nothing is present until [`update`](Self::update)
    pub fn new(spi: S, ambient: A) -> Self {
        Self {
            spi,
            ambient,
            readings: [None; TC_CHANNELS],
        }
    }

    /// Read a frame from every slave select
    pub fn update(&mut self) {
        let slaves = usize::from(self.spi.slave_count()).min(TC_CHANNELS);

        for (channel, reading) in self.readings.iter_mut().enumerate() {
            if channel >= slaves {
                *reading = None;
                continue;
            }

            let mut frame = [0u8; FRAME_LEN];
            *reading = match self.spi.read(channel as u8, &mut frame) {
                Ok(()) => decode(u32::from_be_bytes(frame)),
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("MAX31855 channel {} transfer failed", channel);
                    None
                }
            };
        }
    }

    /// Ambient sensor, e.g. to update it alongside the probes
    pub fn ambient_mut(&mut self) -> &mut A {
        &mut self.ambient
    }

    /// Release the bus and ambient sensor
    pub fn release(self) -> (S, A) {
        (self.spi, self.ambient)
    }
}

impl<S, A: AmbientSensor> ProbeBackend for SpiBridgeProbes<S, A> {
    fn is_channel_present(&self, channel: usize) -> bool {
        matches!(self.readings.get(channel), Some(Some(_)))
    }

    fn read_temperature(&self, channel: usize) -> f32 {
        self.readings
            .get(channel)
            .copied()
            .flatten()
            .map_or(0.0, |r| r.temperature)
    }

    fn read_local_cold_junction(&self, channel: usize) -> f32 {
        self.readings
            .get(channel)
            .copied()
            .flatten()
            .map_or(0.0, |r| r.cold_junction)
    }

    fn read_ambient_sensor(&self) -> f32 {
        self.ambient.read_ambient()
    }
}
