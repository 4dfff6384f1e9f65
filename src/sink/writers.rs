//! Concrete report sinks.

use crate::core::MotionReport;
use crate::sink::ReportSink;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Open a file for appending, creating it and its parent directory if needed.
fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Appends `x,y,z` lines with four decimals, flushed after every sample.
pub struct CsvSink<W: Write> {
    writer: W,
}

impl CsvSink<BufWriter<File>> {
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(open_append(path.as_ref())?))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn name(&self) -> &str {
        "csv"
    }

    fn emit(&mut self, report: &MotionReport) -> io::Result<()> {
        writeln!(
            self.writer,
            "{:.4},{:.4},{:.4}",
            report.x, report.y, report.z
        )?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Appends one JSON object per report.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl JsonlSink<BufWriter<File>> {
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(open_append(path.as_ref())?))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonlSink<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn emit(&mut self, report: &MotionReport) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, report).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Human-readable per-sample line.
pub struct ConsoleSink<W: Write> {
    writer: W,
    /// Print only samples where the state changed
    transitions_only: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout(transitions_only: bool) -> Self {
        Self::new(io::stdout(), transitions_only)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, transitions_only: bool) -> Self {
        Self {
            writer,
            transitions_only,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn emit(&mut self, report: &MotionReport) -> io::Result<()> {
        if self.transitions_only && !report.state_changed {
            return Ok(());
        }
        writeln!(
            self.writer,
            "Acceleration: X={:.4} g, Y={:.4} g, Z={:.4} g, Mean Change Rate: {:.4} [{}]",
            report.x, report.y, report.z, report.mean_change_rate, report.state
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps every report in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<MotionReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all reports received so far.
    pub fn reports(&self) -> Vec<MotionReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn emit(&mut self, report: &MotionReport) -> io::Result<()> {
        self.reports
            .lock()
            .map_err(|_| io::Error::other("memory sink lock poisoned"))?
            .push(report.clone());
        Ok(())
    }
}
