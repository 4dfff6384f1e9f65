//! Stand-in I2C device for platforms without i2c-dev.
//!
//! This exists so the crate (and binary) can compile off Linux; replayed logs
//! still work there, only live sampling is unavailable.

use crate::collector::lis3dh::RegisterBus;
use crate::collector::source::CollectorError;
use std::path::Path;

#[derive(Debug)]
pub struct UnsupportedI2cDevice {
    _private: (),
}

impl UnsupportedI2cDevice {
    /// Always fails with [`CollectorError::Unsupported`].
    pub fn open(_path: impl AsRef<Path>, _address: u8) -> Result<Self, CollectorError> {
        Err(CollectorError::Unsupported)
    }
}

impl RegisterBus for UnsupportedI2cDevice {
    fn write_register(&mut self, _register: u8, _value: u8) -> Result<(), CollectorError> {
        Err(CollectorError::Unsupported)
    }

    fn read_registers(&mut self, _register: u8, _buf: &mut [u8]) -> Result<(), CollectorError> {
        Err(CollectorError::Unsupported)
    }
}
