//! Sample types produced by the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One triaxial acceleration reading, already scaled to g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    /// Time the sample was read
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelSample {
    /// Create a sample stamped with the current time.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            x,
            y,
            z,
        }
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f64 {
        crate::core::magnitude(self.x, self.y, self.z)
    }
}

/// Messages sent from the sampling thread to the consumer.
#[derive(Debug, Clone)]
pub enum CollectorEvent {
    /// A new sample was read
    Sample(AccelSample),
    /// A read failed; sampling continues on the next tick
    ReadError(String),
    /// The source has no more samples (replay reached EOF)
    Exhausted,
}
