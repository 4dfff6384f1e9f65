//! Streaming motion statistics.
//!
//! This module contains:
//! - A fixed-capacity ring buffer with overwrite-on-full semantics
//! - The incremental mean-of-change-rate tracker
//! - RUN/STOP threshold classification
//! - The per-sample monitor that ties them together

pub mod change_rate;
pub mod classifier;
pub mod monitor;
pub mod ring_buffer;

// Re-export commonly used types
pub use change_rate::ChangeRateTracker;
pub use classifier::{classify, MotionClassifier, MotionState, DEFAULT_THRESHOLD};
pub use monitor::{magnitude, MotionMonitor, MotionReport};
pub use ring_buffer::{BufferError, RingBuffer};
