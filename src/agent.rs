//! The sample loop: collector events in, classified reports out.
//!
//! [`SampleLoop`] owns the [`MotionMonitor`] exclusively, so every tracker
//! update runs to completion on the consuming thread. Sink failures are
//! logged and counted but never stop sampling.

use crate::collector::{AccelSample, CollectorEvent};
use crate::core::{BufferError, MotionMonitor, MotionReport};
use crate::sink::ReportSink;
use crate::stats::SharedSessionLog;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The source is exhausted or disconnected
    Finished,
}

pub struct SampleLoop {
    monitor: MotionMonitor,
    sinks: Vec<Box<dyn ReportSink>>,
    log: SharedSessionLog,
}

impl SampleLoop {
    pub fn new(monitor: MotionMonitor, log: SharedSessionLog) -> Self {
        Self {
            monitor,
            sinks: Vec::new(),
            log,
        }
    }

    /// Add an output sink; reports go to sinks in insertion order.
    pub fn add_sink(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    /// Run one sample through the monitor and all sinks.
    pub fn handle_sample(&mut self, sample: &AccelSample) -> Result<MotionReport, BufferError> {
        let report = self.monitor.process(sample)?;
        self.log.record_sample(report.state, report.state_changed);

        if report.state_changed {
            info!(
                state = %report.state,
                mean_change_rate = report.mean_change_rate,
                "Motion state changed"
            );
        }

        for sink in &mut self.sinks {
            if let Err(e) = sink.emit(&report) {
                warn!("Sink {} failed: {e}", sink.name());
                self.log.record_sink_error();
            }
        }

        Ok(report)
    }

    /// Process one collector event.
    pub fn handle_event(&mut self, event: CollectorEvent) -> Flow {
        match event {
            CollectorEvent::Sample(sample) => {
                if let Err(e) = self.handle_sample(&sample) {
                    error!("Tracker update failed: {e}");
                }
                Flow::Continue
            }
            CollectorEvent::ReadError(e) => {
                debug!("Skipping failed read: {e}");
                self.log.record_read_error();
                Flow::Continue
            }
            CollectorEvent::Exhausted => {
                info!("Sample source exhausted");
                Flow::Finished
            }
        }
    }

    /// Wait up to `timeout` for one event and process it.
    pub fn poll(&mut self, receiver: &Receiver<CollectorEvent>, timeout: Duration) -> Flow {
        match receiver.recv_timeout(timeout) {
            Ok(event) => self.handle_event(event),
            Err(RecvTimeoutError::Timeout) => Flow::Continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Collector disconnected unexpectedly");
                Flow::Finished
            }
        }
    }

    /// Process events until `running` is cleared or the source finishes.
    pub fn run(&mut self, receiver: &Receiver<CollectorEvent>, running: &AtomicBool) -> Flow {
        while running.load(Ordering::SeqCst) {
            if self.poll(receiver, Duration::from_millis(100)) == Flow::Finished {
                return Flow::Finished;
            }
        }
        Flow::Continue
    }

    /// Flush every sink.
    pub fn flush(&mut self) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.flush() {
                warn!("Flushing sink {} failed: {e}", sink.name());
                self.log.record_sink_error();
            }
        }
    }

    pub fn monitor(&self) -> &MotionMonitor {
        &self.monitor
    }

    pub fn log(&self) -> &SharedSessionLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MotionState;
    use crate::sink::MemorySink;
    use crate::stats::create_shared_log;
    use std::io;

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        fn emit(&mut self, _report: &MotionReport) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    fn sample_loop() -> (SampleLoop, MemorySink) {
        let monitor = MotionMonitor::new(3, 0.07).unwrap();
        let mut sample_loop = SampleLoop::new(monitor, create_shared_log());
        let sink = MemorySink::new();
        sample_loop.add_sink(Box::new(sink.clone()));
        (sample_loop, sink)
    }

    #[test]
    fn test_events_reach_sinks_in_order() {
        let (mut sample_loop, sink) = sample_loop();

        for z in [1.0, 1.2, 1.5, 1.1] {
            let flow = sample_loop.handle_event(CollectorEvent::Sample(AccelSample::new(0.0, 0.0, z)));
            assert_eq!(flow, Flow::Continue);
        }

        let reports = sink.reports();
        assert_eq!(reports.len(), 4);
        assert_eq!(
            reports.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert!((reports[3].mean_change_rate - 0.3).abs() < 1e-9);
        assert_eq!(reports[3].state, MotionState::Run);
    }

    #[test]
    fn test_read_errors_are_counted_not_fatal() {
        let (mut sample_loop, sink) = sample_loop();

        let flow = sample_loop.handle_event(CollectorEvent::ReadError("nack".into()));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(sample_loop.log().stats().read_errors, 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_exhausted_finishes() {
        let (mut sample_loop, _) = sample_loop();
        assert_eq!(
            sample_loop.handle_event(CollectorEvent::Exhausted),
            Flow::Finished
        );
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let monitor = MotionMonitor::new(3, 0.07).unwrap();
        let mut sample_loop = SampleLoop::new(monitor, create_shared_log());
        let memory = MemorySink::new();
        sample_loop.add_sink(Box::new(FailingSink));
        sample_loop.add_sink(Box::new(memory.clone()));

        sample_loop
            .handle_sample(&AccelSample::new(0.0, 0.0, 1.0))
            .unwrap();

        assert_eq!(memory.len(), 1);
        assert_eq!(sample_loop.log().stats().sink_errors, 1);
        assert_eq!(sample_loop.log().stats().samples_processed, 1);
    }

    #[test]
    fn test_poll_times_out_and_detects_disconnect() {
        let (mut sample_loop, _) = sample_loop();
        let (sender, receiver) = crossbeam_channel::bounded::<CollectorEvent>(1);

        assert_eq!(
            sample_loop.poll(&receiver, Duration::from_millis(10)),
            Flow::Continue
        );
        drop(sender);
        assert_eq!(
            sample_loop.poll(&receiver, Duration::from_millis(10)),
            Flow::Finished
        );
    }
}
