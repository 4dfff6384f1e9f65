//! Motion Sensor Agent - RUN/STOP activity detection from a LIS3DH.
//!
//! The agent samples a triaxial accelerometer at a fixed cadence, reduces
//! each sample to its magnitude, and keeps a running mean of the
//! sample-to-sample change in magnitude over a bounded window. The mean is
//! compared against a threshold to classify the device as RUN or STOP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Motion Sensor Agent                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Collector  │──▶│ Change rate │──▶│ Classifier  │       │
//! │  │ (LIS3DH/I2C)│   │  (window N) │   │ (RUN/STOP)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │  Session    │                     │    Sinks    │       │
//! │  │   Stats     │                     │ (csv/jsonl) │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use motion_sensor_agent::collector::AccelSample;
//! use motion_sensor_agent::core::{MotionMonitor, MotionState};
//!
//! let mut monitor = MotionMonitor::new(100, 0.07).unwrap();
//! let report = monitor.process(&AccelSample::new(0.0, 0.0, 1.0)).unwrap();
//! assert_eq!(report.state, MotionState::Stop);
//! ```

pub mod agent;
pub mod collector;
pub mod config;
pub mod core;
pub mod sink;
pub mod stats;

// Re-export key types at crate root for convenience
pub use agent::{Flow, SampleLoop};
pub use collector::{
    AccelSample, Collector, CollectorConfig, CollectorError, CollectorEvent, SampleSource,
};
pub use config::{Config, ConfigError, SensorConfig};
pub use self::core::{
    classify, magnitude, BufferError, ChangeRateTracker, MotionClassifier, MotionMonitor,
    MotionReport, MotionState, RingBuffer,
};
pub use sink::ReportSink;
pub use stats::{SessionLog, SessionStats, SharedSessionLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
