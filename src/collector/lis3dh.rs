//! LIS3DH 3-axis accelerometer driver.
//!
//! The driver is written against [`RegisterBus`] so it can sit on the Linux
//! i2c-dev interface or on an in-memory register map in tests. It only knows
//! the fixed power-up sequence (100 Hz, all axes, ±2 g) and how to turn the
//! six output registers into g.

use crate::collector::source::{CollectorError, SampleSource};
use crate::collector::types::AccelSample;
use tracing::{debug, info};

/// Default 7-bit address with SA0 pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x19;

/// Expected WHO_AM_I register value.
pub const WHO_AM_I_VALUE: u8 = 0x33;

/// LSB per g of the left-justified 16-bit output at ±2 g.
pub const COUNTS_PER_G: f64 = 16384.0;

/// Register addresses used by the driver.
pub mod regs {
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG4: u8 = 0x23;
    pub const OUT_X_L: u8 = 0x28;

    /// Set on the sub-address to auto-increment during multi-byte reads
    pub const AUTO_INCREMENT: u8 = 0x80;
}

/// 100 Hz output data rate, normal mode, X/Y/Z enabled.
const CTRL_REG1_100HZ_XYZ: u8 = 0x57;

/// ±2 g full scale, continuous update, high-resolution off.
const CTRL_REG4_2G: u8 = 0x00;

/// Register-level access to a device on a bus.
pub trait RegisterBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), CollectorError>;

    /// Read `buf.len()` bytes starting at `register`.
    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), CollectorError>;

    fn read_register(&mut self, register: u8) -> Result<u8, CollectorError> {
        let mut buf = [0u8; 1];
        self.read_registers(register, &mut buf)?;
        Ok(buf[0])
    }
}

pub struct Lis3dh<B> {
    bus: B,
}

impl<B: RegisterBus> Lis3dh<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Check that the device on the bus identifies as a LIS3DH.
    pub fn probe(&mut self) -> Result<(), CollectorError> {
        let id = self.bus.read_register(regs::WHO_AM_I)?;
        if id != WHO_AM_I_VALUE {
            return Err(CollectorError::UnexpectedDevice(id));
        }
        debug!("LIS3DH identified (WHO_AM_I = 0x{id:02X})");
        Ok(())
    }

    /// Probe the device and apply the power-up configuration.
    pub fn init(&mut self) -> Result<(), CollectorError> {
        self.probe()?;
        self.bus.write_register(regs::CTRL_REG1, CTRL_REG1_100HZ_XYZ)?;
        self.bus.write_register(regs::CTRL_REG4, CTRL_REG4_2G)?;
        info!("LIS3DH initialised (100Hz, XYZ, ±2g)");
        Ok(())
    }

    /// Burst-read the three axes and convert to g.
    pub fn read_sample(&mut self) -> Result<AccelSample, CollectorError> {
        let mut raw = [0u8; 6];
        self.bus
            .read_registers(regs::OUT_X_L | regs::AUTO_INCREMENT, &mut raw)?;

        Ok(AccelSample::new(
            counts_to_g(raw[0], raw[1]),
            counts_to_g(raw[2], raw[3]),
            counts_to_g(raw[4], raw[5]),
        ))
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: RegisterBus> SampleSource for Lis3dh<B> {
    fn next_sample(&mut self) -> Result<Option<AccelSample>, CollectorError> {
        self.read_sample().map(Some)
    }
}

/// Assemble a little-endian axis reading and scale it to g.
pub fn counts_to_g(low: u8, high: u8) -> f64 {
    f64::from(i16::from_le_bytes([low, high])) / COUNTS_PER_G
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Register map that honours the auto-increment bit.
    #[derive(Default)]
    struct FakeBus {
        registers: HashMap<u8, u8>,
        writes: Vec<(u8, u8)>,
    }

    impl FakeBus {
        fn with_device(id: u8) -> Self {
            let mut bus = Self::default();
            bus.registers.insert(regs::WHO_AM_I, id);
            bus
        }

        fn set_axes(&mut self, x: i16, y: i16, z: i16) {
            for (offset, value) in [x, y, z].into_iter().enumerate() {
                let [low, high] = value.to_le_bytes();
                let base = regs::OUT_X_L + 2 * offset as u8;
                self.registers.insert(base, low);
                self.registers.insert(base + 1, high);
            }
        }
    }

    impl RegisterBus for FakeBus {
        fn write_register(&mut self, register: u8, value: u8) -> Result<(), CollectorError> {
            self.writes.push((register, value));
            self.registers.insert(register, value);
            Ok(())
        }

        fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), CollectorError> {
            let increment = register & regs::AUTO_INCREMENT != 0;
            let start = register & !regs::AUTO_INCREMENT;
            for (i, byte) in buf.iter_mut().enumerate() {
                let addr = if increment { start + i as u8 } else { start };
                *byte = self.registers.get(&addr).copied().unwrap_or(0);
            }
            Ok(())
        }
    }

    #[test]
    fn test_counts_to_g() {
        assert_eq!(counts_to_g(0x00, 0x40), 1.0);
        assert_eq!(counts_to_g(0x00, 0xC0), -1.0);
        assert_eq!(counts_to_g(0x00, 0x00), 0.0);
        assert_eq!(counts_to_g(0x00, 0x20), 0.5);
    }

    #[test]
    fn test_init_writes_power_up_sequence() {
        let mut sensor = Lis3dh::new(FakeBus::with_device(WHO_AM_I_VALUE));
        sensor.init().unwrap();

        assert_eq!(
            sensor.bus_mut().writes,
            vec![(regs::CTRL_REG1, 0x57), (regs::CTRL_REG4, 0x00)]
        );
    }

    #[test]
    fn test_probe_rejects_wrong_device() {
        let mut sensor = Lis3dh::new(FakeBus::with_device(0x68));
        match sensor.init() {
            Err(CollectorError::UnexpectedDevice(id)) => assert_eq!(id, 0x68),
            other => panic!("expected UnexpectedDevice, got {other:?}"),
        }
        assert!(sensor.bus_mut().writes.is_empty());
    }

    #[test]
    fn test_read_sample_scales_axes() {
        let mut bus = FakeBus::with_device(WHO_AM_I_VALUE);
        bus.set_axes(8192, -4096, 16384);
        let mut sensor = Lis3dh::new(bus);

        let sample = sensor.next_sample().unwrap().unwrap();
        assert_eq!(sample.x, 0.5);
        assert_eq!(sample.y, -0.25);
        assert_eq!(sample.z, 1.0);
        assert!((sample.magnitude() - (0.25f64 + 0.0625 + 1.0).sqrt()).abs() < 1e-12);
    }
}
