//! SC18IS602B I2C-to-SPI bridge
//!
//! The bridge buffers up to 200 bytes. A transfer is an I2C write of a
//! function byte selecting the slave (bits 3:0, one per SS line) followed by
//! the data to clock out; the bytes clocked in are then fetched with a plain
//! I2C read of the same length.

use t962_hal::i2c::I2cBus;
use t962_hal::spi::{Mode, Phase, Polarity, SpiBus};

/// Address with A2..A0 tied low
pub const BASE_ADDRESS: u8 = 0x28;

/// Largest single SPI transfer
pub const MAX_TRANSFER: usize = 200;

/// Slave-select outputs (SS0..SS3)
pub const SLAVE_COUNT: u8 = 4;

/// Function ID: configure SPI interface
const FN_CONFIGURE: u8 = 0xF0;

const CPOL: u8 = 1 << 3;
const CPHA: u8 = 1 << 2;

/// SPI clock rate generated by the bridge (7.3728 MHz crystal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiClock {
    /// 1843 kHz
    Khz1843 = 0b00,
    /// 461 kHz
    Khz461 = 0b01,
    /// 115 kHz
    Khz115 = 0b10,
    /// 58 kHz
    Khz58 = 0b11,
}

/// Errors from bridge operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError<E> {
    /// Underlying I2C transaction failed
    I2c(E),
    /// Slave select index out of range
    InvalidSlave,
    /// Transfer exceeds the bridge buffer
    TooLong,
}

/// SC18IS602B bridge on an I2C bus
pub struct Sc18is602b<I> {
    i2c: I,
    address: u8,
}

impl<I: I2cBus> Sc18is602b<I> {
    /// Create a driver for the bridge with address pins `a2a1a0` (0..=7)
    pub fn new(i2c: I, a2a1a0: u8) -> Self {
        Self {
            i2c,
            address: BASE_ADDRESS | (a2a1a0 & 0x07),
        }
    }

    /// 7-bit I2C address of the bridge
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Set SPI mode and clock, MSB first
    pub fn configure(&mut self, mode: Mode, clock: SpiClock) -> Result<(), BridgeError<I::Error>> {
        let (polarity, phase) = mode.into();

        let mut config = clock as u8;
        if polarity == Polarity::IdleHigh {
            config |= CPOL;
        }
        if phase == Phase::CaptureOnSecondTransition {
            config |= CPHA;
        }

        self.i2c
            .write(self.address, &[FN_CONFIGURE, config])
            .map_err(BridgeError::I2c)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("SC18IS602B @{=u8:#x}: {} {}", self.address, mode, clock);

        Ok(())
    }

    /// Release the I2C bus
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2cBus> SpiBus for Sc18is602b<I> {
    type Error = BridgeError<I::Error>;

    fn slave_count(&self) -> u8 {
        SLAVE_COUNT
    }

    fn transfer_in_place(&mut self, slave: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        if slave >= SLAVE_COUNT {
            return Err(BridgeError::InvalidSlave);
        }
        if data.len() > MAX_TRANSFER {
            return Err(BridgeError::TooLong);
        }

        let mut frame = [0u8; MAX_TRANSFER + 1];
        frame[0] = 1 << slave;
        frame[1..=data.len()].copy_from_slice(data);

        self.i2c
            .write(self.address, &frame[..=data.len()])
            .map_err(BridgeError::I2c)?;
        self.i2c.read(self.address, data).map_err(BridgeError::I2c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Write(u8, Vec<u8>),
        Read(u8, usize),
    }

    /// Mock I2C bus logging transactions and answering reads from a buffer
    #[derive(Default)]
    struct MockI2c {
        ops: Vec<Op>,
        response: Vec<u8>,
        fail: bool,
    }

    impl I2cBus for MockI2c {
        type Error = &'static str;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.ops.push(Op::Write(address, data.to_vec()));
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
            self.ops.push(Op::Read(address, buf.len()));
            buf.copy_from_slice(&self.response[..buf.len()]);
            Ok(())
        }
    }

    #[test]
    fn test_address_pins() {
        assert_eq!(Sc18is602b::new(MockI2c::default(), 0).address(), 0x28);
        assert_eq!(Sc18is602b::new(MockI2c::default(), 5).address(), 0x2D);
        assert_eq!(Sc18is602b::new(MockI2c::default(), 0xFF).address(), 0x2F);
    }

    #[test]
    fn test_configure() {
        let mut bridge = Sc18is602b::new(MockI2c::default(), 0);
        bridge.configure(Mode::Mode0, SpiClock::Khz1843).unwrap();
        bridge.configure(Mode::Mode1, SpiClock::Khz461).unwrap();
        bridge.configure(Mode::Mode3, SpiClock::Khz58).unwrap();

        assert_eq!(
            bridge.release().ops,
            vec![
                Op::Write(0x28, vec![0xF0, 0x00]),
                Op::Write(0x28, vec![0xF0, 0x05]),
                Op::Write(0x28, vec![0xF0, 0x0F]),
            ]
        );
    }

    #[test]
    fn test_read_frame() {
        let i2c = MockI2c {
            response: vec![0x19, 0x00, 0x19, 0x00],
            ..Default::default()
        };
        let mut bridge = Sc18is602b::new(i2c, 1);

        let mut buf = [0xAAu8; 4];
        bridge.read(2, &mut buf).unwrap();
        assert_eq!(buf, [0x19, 0x00, 0x19, 0x00]);

        assert_eq!(
            bridge.release().ops,
            vec![Op::Write(0x29, vec![0x04, 0, 0, 0, 0]), Op::Read(0x29, 4)]
        );
    }

    #[test]
    fn test_invalid_slave() {
        let mut bridge = Sc18is602b::new(MockI2c::default(), 0);
        let mut buf = [0u8; 4];
        assert_eq!(bridge.read(4, &mut buf), Err(BridgeError::InvalidSlave));
    }

    #[test]
    fn test_transfer_too_long() {
        let mut bridge = Sc18is602b::new(MockI2c::default(), 0);
        let mut buf = [0u8; MAX_TRANSFER + 1];
        assert_eq!(bridge.transfer_in_place(0, &mut buf), Err(BridgeError::TooLong));
        assert!(bridge.release().ops.is_empty());
    }

    #[test]
    fn test_i2c_error() {
        let i2c = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut bridge = Sc18is602b::new(i2c, 0);
        assert_eq!(
            bridge.configure(Mode::Mode0, SpiClock::Khz115),
            Err(BridgeError::I2c("nack"))
        );
    }
}
