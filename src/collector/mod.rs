//! Sample collection for the motion sensor agent.
//!
//! This module provides the LIS3DH driver, the platform I2C backend, a replay
//! source for recorded logs, and the background thread that polls a source
//! at a fixed cadence.

pub mod lis3dh;
pub mod replay;
pub mod sampler;
pub mod source;
pub mod types;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(target_os = "linux"))]
pub mod unsupported;

// Re-export commonly used types
pub use lis3dh::{Lis3dh, RegisterBus, DEFAULT_ADDRESS, WHO_AM_I_VALUE};
pub use replay::ReplaySource;
pub use sampler::{Collector, CollectorConfig};
pub use source::{CollectorError, SampleSource};
pub use types::{AccelSample, CollectorEvent};

#[cfg(target_os = "linux")]
pub use linux::LinuxI2cDevice;

/// Platform I2C device type alias
#[cfg(target_os = "linux")]
pub type I2cDevice = LinuxI2cDevice;

#[cfg(not(target_os = "linux"))]
pub use unsupported::UnsupportedI2cDevice;

/// Platform I2C device type alias
#[cfg(not(target_os = "linux"))]
pub type I2cDevice = UnsupportedI2cDevice;
