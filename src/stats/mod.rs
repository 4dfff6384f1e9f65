//! Session statistics for the motion sensor agent.
//!
//! Tracks how many samples were processed and classified, and how many reads
//! or writes failed, so a running or finished session can be audited.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, PersistedStats, SessionLog,
    SessionStats, SharedSessionLog,
};
