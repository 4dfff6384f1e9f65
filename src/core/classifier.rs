//! Threshold classification of the running mean change rate.

use serde::{Deserialize, Serialize};

/// Default RUN/STOP threshold on the mean change rate, in g.
pub const DEFAULT_THRESHOLD: f64 = 0.07;

/// Binary activity state of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MotionState {
    Run,
    Stop,
}

impl MotionState {
    /// Numeric status code (1 = run, 0 = stop).
    pub fn code(self) -> u8 {
        match self {
            MotionState::Run => 1,
            MotionState::Stop => 0,
        }
    }
}

impl std::fmt::Display for MotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionState::Run => write!(f, "RUN"),
            MotionState::Stop => write!(f, "STOP"),
        }
    }
}

/// Classify a mean change rate. RUN only when strictly above the threshold.
pub fn classify(mean_change_rate: f64, threshold: f64) -> MotionState {
    if mean_change_rate > threshold {
        MotionState::Run
    } else {
        MotionState::Stop
    }
}

/// A classifier bound to a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionClassifier {
    threshold: f64,
}

impl MotionClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, mean_change_rate: f64) -> MotionState {
        classify(mean_change_rate, self.threshold)
    }
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
