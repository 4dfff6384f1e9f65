//! Linux i2c-dev implementation of [`RegisterBus`].
//!
//! Opens the `/dev/i2c-N` character device, binds it to a slave address with
//! the `I2C_SLAVE` ioctl, and issues plain write / write-then-read
//! transactions. Register reads are two separate transfers; no repeated
//! start is attempted.

use crate::collector::lis3dh::RegisterBus;
use crate::collector::source::CollectorError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// `I2C_SLAVE` request number from `linux/i2c-dev.h`.
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// An open i2c-dev handle bound to one slave address.
#[derive(Debug)]
pub struct LinuxI2cDevice {
    file: File,
    path: PathBuf,
    address: u8,
}

impl LinuxI2cDevice {
    /// Open the bus device and select the slave address.
    pub fn open(path: impl AsRef<Path>, address: u8) -> Result<Self, CollectorError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| CollectorError::Io(format!("open {}: {e}", path.display())))?;

        // SAFETY: the fd is owned by `file` and stays open for the call;
        // I2C_SLAVE takes the address by value.
        let rc = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(address),
            )
        };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            return Err(CollectorError::Io(format!(
                "select slave 0x{address:02X} on {}: {err}",
                path.display()
            )));
        }

        Ok(Self {
            file,
            path,
            address,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

impl RegisterBus for LinuxI2cDevice {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), CollectorError> {
        self.file.write_all(&[register, value])?;
        Ok(())
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), CollectorError> {
        self.file.write_all(&[register])?;
        self.file.read_exact(buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_bus_fails() {
        let err = LinuxI2cDevice::open("/dev/i2c-does-not-exist", 0x19).unwrap_err();
        match err {
            CollectorError::Io(message) => assert!(message.contains("i2c-does-not-exist")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
