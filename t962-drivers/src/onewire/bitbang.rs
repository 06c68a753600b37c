//! Bit-banged one-wire master over an open-drain GPIO
//!
//! Standard-speed timing from Maxim application note 126.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use t962_hal::onewire::{OneWireBus, OneWireError};

// Standard speed slot timings in microseconds
const WRITE_ONE_LOW_US: u32 = 6;
const WRITE_ONE_RELEASE_US: u32 = 64;
const WRITE_ZERO_LOW_US: u32 = 60;
const WRITE_ZERO_RELEASE_US: u32 = 10;
const READ_LOW_US: u32 = 6;
const READ_SAMPLE_US: u32 = 9;
const READ_RELEASE_US: u32 = 55;
const RESET_LOW_US: u32 = 480;
const RESET_PRESENCE_US: u32 = 70;
const RESET_RELEASE_US: u32 = 410;

/// One-wire master on a single open-drain pin
///
/// Driving the pin high releases the bus to the external pull-up.
pub struct BitBangOneWire<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> BitBangOneWire<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Create a bus master; the pin is released immediately
    pub fn new(mut pin: P, delay: D) -> Result<Self, OneWireError> {
        pin.set_high().map_err(|_| OneWireError::Io)?;
        Ok(Self { pin, delay })
    }

    /// Release the pin and delay provider
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn drive_low(&mut self) -> Result<(), OneWireError> {
        self.pin.set_low().map_err(|_| OneWireError::Io)
    }

    fn release_bus(&mut self) -> Result<(), OneWireError> {
        self.pin.set_high().map_err(|_| OneWireError::Io)
    }

    fn sample(&mut self) -> Result<bool, OneWireError> {
        self.pin.is_high().map_err(|_| OneWireError::Io)
    }
}

impl<P, D> OneWireBus for BitBangOneWire<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn reset(&mut self) -> Result<bool, OneWireError> {
        if !self.sample()? {
            return Err(OneWireError::BusShorted);
        }

        self.drive_low()?;
        self.delay.delay_us(RESET_LOW_US);
        self.release_bus()?;
        self.delay.delay_us(RESET_PRESENCE_US);
        let presence = !self.sample()?;
        self.delay.delay_us(RESET_RELEASE_US);
        Ok(presence)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError> {
        let (low, release) = if bit {
            (WRITE_ONE_LOW_US, WRITE_ONE_RELEASE_US)
        } else {
            (WRITE_ZERO_LOW_US, WRITE_ZERO_RELEASE_US)
        };
        self.drive_low()?;
        self.delay.delay_us(low);
        self.release_bus()?;
        self.delay.delay_us(release);
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, OneWireError> {
        self.drive_low()?;
        self.delay.delay_us(READ_LOW_US);
        self.release_bus()?;
        self.delay.delay_us(READ_SAMPLE_US);
        let bit = self.sample()?;
        self.delay.delay_us(READ_RELEASE_US);
        Ok(bit)
    }
}
