//! Output sinks for per-sample motion reports.
//!
//! A sink decides formatting and persistence; the sample loop only hands it
//! each [`MotionReport`] in order.

pub mod writers;

use crate::core::MotionReport;

/// Consumer of motion reports.
pub trait ReportSink {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Write one report.
    fn emit(&mut self, report: &MotionReport) -> std::io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// Re-export commonly used types
pub use writers::{ConsoleSink, CsvSink, JsonlSink, MemorySink};
