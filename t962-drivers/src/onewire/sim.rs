//! Simulated one-wire bus for tests
//!
//! Models wired-AND behaviour of a handful of devices answering Search ROM,
//! Match ROM, Skip ROM, Convert T and Read Scratchpad at the bit level.

use t962_hal::onewire::{OneWireBus, OneWireError, RomCode};

use super::{
    crc8, CMD_CONVERT_T, CMD_MATCH_ROM, CMD_READ_SCRATCHPAD, CMD_SEARCH_ROM, CMD_SKIP_ROM,
    SCRATCHPAD_LEN,
};

#[derive(Debug, Clone)]
pub struct SimDevice {
    pub rom: RomCode,
    pub scratchpad: [u8; SCRATCHPAD_LEN],
}

impl SimDevice {
    /// Device with a CRC-correct scratchpad built from `data`
    pub fn new(rom: RomCode, data: [u8; SCRATCHPAD_LEN - 1]) -> Self {
        let mut scratchpad = [0u8; SCRATCHPAD_LEN];
        scratchpad[..SCRATCHPAD_LEN - 1].copy_from_slice(&data);
        scratchpad[SCRATCHPAD_LEN - 1] = crc8(&data);
        Self { rom, scratchpad }
    }

    /// CRC-correct ROM code for `family` and `serial`
    pub fn rom(family: u8, serial: u32) -> RomCode {
        let mut rom = [0u8; 8];
        rom[0] = family;
        rom[1..5].copy_from_slice(&serial.to_le_bytes());
        rom[7] = crc8(&rom[..7]);
        RomCode(rom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    RomCommand,
    Search { bit: usize, step: u8 },
    MatchRom { bit: usize },
    Function,
    ReadScratchpad { bit: usize },
    Idle,
}

pub struct SimBus {
    devices: Vec<SimDevice>,
    active: Vec<bool>,
    phase: Phase,
    shift: u8,
    bits: u8,
    matched: RomCode,
    selected: Option<usize>,
    conversions: usize,
}

impl SimBus {
    pub fn new(devices: &[SimDevice]) -> Self {
        Self {
            devices: devices.to_vec(),
            active: vec![true; devices.len()],
            phase: Phase::Idle,
            shift: 0,
            bits: 0,
            matched: RomCode::default(),
            selected: None,
            conversions: 0,
        }
    }

    pub fn conversions(&self) -> usize {
        self.conversions
    }

    pub fn device_mut(&mut self, index: usize) -> &mut SimDevice {
        &mut self.devices[index]
    }

    /// Collect a command byte; returns it once 8 bits arrived
    fn shift_in(&mut self, bit: bool) -> Option<u8> {
        if bit {
            self.shift |= 1 << self.bits;
        }
        self.bits += 1;
        if self.bits == 8 {
            let byte = self.shift;
            self.shift = 0;
            self.bits = 0;
            Some(byte)
        } else {
            None
        }
    }

    /// Wired-AND of `f` over the active devices (idle bus reads 1)
    fn wired_and(&self, f: impl Fn(&SimDevice) -> bool) -> bool {
        self.devices
            .iter()
            .zip(&self.active)
            .filter(|(_, active)| **active)
            .all(|(device, _)| f(device))
    }
}

impl OneWireBus for SimBus {
    fn reset(&mut self) -> Result<bool, OneWireError> {
        self.phase = Phase::RomCommand;
        self.shift = 0;
        self.bits = 0;
        self.active = vec![true; self.devices.len()];
        self.selected = None;
        Ok(!self.devices.is_empty())
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError> {
        match self.phase {
            Phase::RomCommand => match self.shift_in(bit) {
                Some(CMD_SEARCH_ROM) => self.phase = Phase::Search { bit: 0, step: 0 },
                Some(CMD_MATCH_ROM) => self.phase = Phase::MatchRom { bit: 0 },
                Some(CMD_SKIP_ROM) => self.phase = Phase::Function,
                Some(_) => self.phase = Phase::Idle,
                None => {}
            },
            Phase::Search { bit: index, step: 2 } => {
                for (device, active) in self.devices.iter().zip(self.active.iter_mut()) {
                    if device.rom.bit(index) != bit {
                        *active = false;
                    }
                }
                self.phase = if index == 63 {
                    Phase::Idle
                } else {
                    Phase::Search {
                        bit: index + 1,
                        step: 0,
                    }
                };
            }
            Phase::MatchRom { bit: index } => {
                self.matched.set_bit(index, bit);
                if index == 63 {
                    self.selected = self.devices.iter().position(|d| d.rom == self.matched);
                    for (i, active) in self.active.iter_mut().enumerate() {
                        *active = Some(i) == self.selected;
                    }
                    self.phase = Phase::Function;
                } else {
                    self.phase = Phase::MatchRom { bit: index + 1 };
                }
            }
            Phase::Function => match self.shift_in(bit) {
                Some(CMD_CONVERT_T) => {
                    self.conversions += 1;
                    self.phase = Phase::Idle;
                }
                Some(CMD_READ_SCRATCHPAD) => self.phase = Phase::ReadScratchpad { bit: 0 },
                Some(_) => self.phase = Phase::Idle,
                None => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, OneWireError> {
        let value = match self.phase {
            Phase::Search { bit, step: 0 } => {
                self.phase = Phase::Search { bit, step: 1 };
                self.wired_and(|d| d.rom.bit(bit))
            }
            Phase::Search { bit, step: 1 } => {
                self.phase = Phase::Search { bit, step: 2 };
                self.wired_and(|d| !d.rom.bit(bit))
            }
            Phase::ReadScratchpad { bit } => {
                self.phase = Phase::ReadScratchpad { bit: bit + 1 };
                if bit < SCRATCHPAD_LEN * 8 {
                    self.wired_and(|d| d.scratchpad[bit / 8] & (1 << (bit % 8)) != 0)
                } else {
                    true
                }
            }
            _ => true,
        };
        Ok(value)
    }
}
