//! Adapters from embedded-hal 1.0 peripherals to the t962-hal bus traits

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use t962_hal::i2c::I2cBus;

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<ErrorKind> for I2cBusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Bus => I2cBusError::Bus,
            ErrorKind::ArbitrationLoss => I2cBusError::ArbitrationLost,
            ErrorKind::NoAcknowledge(_) => I2cBusError::Nack,
            ErrorKind::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}

/// [`I2cBus`] over any embedded-hal blocking I2C master
pub struct EhI2c<T> {
    inner: T,
}

impl<T: I2c> EhI2c<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn release(self) -> T {
        self.inner
    }
}

impl<T: I2c> I2cBus for EhI2c<T> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner
            .write(address, data)
            .map_err(|e| e.kind().into())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read(address, buf).map_err(|e| e.kind().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Sc18is602b;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};
    use t962_hal::spi::SpiBus;

    /// Mock embedded-hal bus answering reads with an incrementing pattern
    #[derive(Default)]
    struct MockEh {
        written: Vec<(u8, Vec<u8>)>,
        nack: bool,
    }

    impl ErrorType for MockEh {
        type Error = ErrorKind;
    }

    impl I2c for MockEh {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                match op {
                    Operation::Write(data) => self.written.push((address, data.to_vec())),
                    Operation::Read(buf) => {
                        for (i, byte) in buf.iter_mut().enumerate() {
                            *byte = i as u8;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_and_read() {
        let mut bus = EhI2c::new(MockEh::default());
        bus.write(0x28, &[0xF0, 0x00]).unwrap();

        let mut buf = [0xFFu8; 3];
        I2cBus::read(&mut bus, 0x28, &mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2]);
        assert_eq!(bus.release().written, vec![(0x28, vec![0xF0, 0x00])]);
    }

    #[test]
    fn test_nack_maps_to_error() {
        let mut bus = EhI2c::new(MockEh {
            nack: true,
            ..Default::default()
        });
        assert_eq!(bus.write(0x28, &[0]), Err(I2cBusError::Nack));
    }

    #[test]
    fn test_bridge_over_embedded_hal() {
        let mut bridge = Sc18is602b::new(EhI2c::new(MockEh::default()), 0);
        let mut frame = [0u8; 4];
        bridge.read(1, &mut frame).unwrap();
        assert_eq!(frame, [0, 1, 2, 3]);

        let written = bridge.release().release().written;
        assert_eq!(written, vec![(0x28, vec![0x02, 0, 0, 0, 0])]);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(I2cBusError::from(ErrorKind::Bus), I2cBusError::Bus);
        assert_eq!(
            I2cBusError::from(ErrorKind::ArbitrationLoss),
            I2cBusError::ArbitrationLost
        );
        assert_eq!(I2cBusError::from(ErrorKind::Other), I2cBusError::Other);
    }
}
