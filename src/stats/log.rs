//! Session statistics for the sampling agent.
//!
//! Counters are atomics so the log can be shared between the sampling loop
//! and anything reporting on it. Totals can be persisted and are reloaded on
//! the next run, so `status` shows cumulative figures.

use crate::core::MotionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Counters for the current (and, when persisted, previous) sessions.
#[derive(Debug)]
pub struct SessionLog {
    /// Samples run through the monitor
    samples_processed: AtomicU64,
    /// Failed sensor reads
    read_errors: AtomicU64,
    /// Samples classified RUN
    run_samples: AtomicU64,
    /// Samples classified STOP
    stop_samples: AtomicU64,
    /// RUN <-> STOP transitions
    state_changes: AtomicU64,
    /// Failed sink writes
    sink_errors: AtomicU64,
    session_id: Uuid,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            samples_processed: AtomicU64::new(0),
            read_errors: AtomicU64::new(0),
            run_samples: AtomicU64::new(0),
            stop_samples: AtomicU64::new(0),
            state_changes: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a log that loads and saves totals at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            warn!("Could not load previous session stats: {e}");
        }

        log
    }

    /// Record one classified sample.
    pub fn record_sample(&self, state: MotionState, state_changed: bool) {
        self.samples_processed.fetch_add(1, Ordering::Relaxed);
        match state {
            MotionState::Run => self.run_samples.fetch_add(1, Ordering::Relaxed),
            MotionState::Stop => self.stop_samples.fetch_add(1, Ordering::Relaxed),
        };
        if state_changed {
            self.state_changes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Get the current statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            samples_processed: self.samples_processed.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            run_samples: self.run_samples.load(Ordering::Relaxed),
            stop_samples: self.stop_samples.load(Ordering::Relaxed),
            state_changes: self.state_changes.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            session_id: self.session_id,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Samples processed: {}\n\
             - RUN samples: {}\n\
             - STOP samples: {}\n\
             - State changes: {}\n\
             - Read errors: {}\n\
             - Sink errors: {}\n\
             - Session duration: {} seconds",
            stats.samples_processed,
            stats.run_samples,
            stats.stop_samples,
            stats.state_changes,
            stats.read_errors,
            stats.sink_errors,
            stats.session_duration_secs
        )
    }

    /// Save totals to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                samples_processed: stats.samples_processed,
                read_errors: stats.read_errors,
                run_samples: stats.run_samples,
                stop_samples: stats.stop_samples,
                state_changes: stats.state_changes,
                sink_errors: stats.sink_errors,
                last_session_id: stats.session_id,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load totals from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.samples_processed
                    .store(persisted.samples_processed, Ordering::Relaxed);
                self.read_errors
                    .store(persisted.read_errors, Ordering::Relaxed);
                self.run_samples
                    .store(persisted.run_samples, Ordering::Relaxed);
                self.stop_samples
                    .store(persisted.stop_samples, Ordering::Relaxed);
                self.state_changes
                    .store(persisted.state_changes, Ordering::Relaxed);
                self.sink_errors
                    .store(persisted.sink_errors, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.samples_processed.store(0, Ordering::Relaxed);
        self.read_errors.store(0, Ordering::Relaxed);
        self.run_samples.store(0, Ordering::Relaxed);
        self.stop_samples.store(0, Ordering::Relaxed);
        self.state_changes.store(0, Ordering::Relaxed);
        self.sink_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub samples_processed: u64,
    pub read_errors: u64,
    pub run_samples: u64,
    pub stop_samples: u64,
    pub state_changes: u64,
    pub sink_errors: u64,
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// On-disk totals.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedStats {
    pub samples_processed: u64,
    pub read_errors: u64,
    pub run_samples: u64,
    pub stop_samples: u64,
    pub state_changes: u64,
    pub sink_errors: u64,
    pub last_session_id: Uuid,
    pub last_updated: DateTime<Utc>,
}

/// Thread-safe shared session log.
pub type SharedSessionLog = Arc<SessionLog>;

/// Create a new shared session log.
pub fn create_shared_log() -> SharedSessionLog {
    Arc::new(SessionLog::new())
}

/// Create a new shared session log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedSessionLog {
    Arc::new(SessionLog::with_persistence(path))
}
