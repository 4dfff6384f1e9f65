//! Background sampling thread.
//!
//! The collector owns a [`SampleSource`] and polls it on a dedicated thread at
//! a fixed cadence, forwarding [`CollectorEvent`]s over a bounded channel.
//! Stopping joins the thread and hands the source back, so a paused collector
//! can be restarted without reopening the bus.

use crate::collector::source::{CollectorError, SampleSource};
use crate::collector::types::CollectorEvent;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How long a blocked send waits before re-checking the running flag.
const SEND_RETRY: Duration = Duration::from_millis(100);

/// Sampling cadence and channel sizing.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Time between the starts of two consecutive reads
    pub interval: Duration,
    /// Bound on queued, unconsumed events
    pub channel_capacity: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            channel_capacity: 1_024,
        }
    }
}

pub struct Collector<S> {
    config: CollectorConfig,
    source: Option<S>,
    sender: Sender<CollectorEvent>,
    receiver: Receiver<CollectorEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<S>>,
}

impl<S: SampleSource + Send + 'static> Collector<S> {
    /// Create a stopped collector around a source.
    pub fn new(config: CollectorConfig, source: S) -> Self {
        // Use a bounded channel to prevent unbounded memory growth
        let (sender, receiver) = bounded(config.channel_capacity.max(1));

        Self {
            config,
            source: Some(source),
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start sampling in a background thread.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if let Some(handle) = &self.thread_handle {
            if !handle.is_finished() {
                return Err(CollectorError::AlreadyRunning);
            }
        }
        // Reclaim the source from a thread that ended on its own
        self.stop();
        let mut source = self.source.take().ok_or(CollectorError::SourceLost)?;

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let interval = self.config.interval;

        let handle = thread::spawn(move || {
            run_sampling_loop(&mut source, &sender, &running, interval);
            running.store(false, Ordering::SeqCst);
            source
        });

        info!(interval_ms = interval.as_millis() as u64, "Collector started");
        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop sampling and wait for the thread to hand the source back.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            match handle.join() {
                Ok(source) => self.source = Some(source),
                Err(_) => error!("Sampling thread panicked"),
            }
            info!("Collector stopped");
        }
    }

    /// Check if the sampling thread is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for collector events.
    pub fn receiver(&self) -> &Receiver<CollectorEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<CollectorEvent> {
        self.receiver.try_recv().ok()
    }
}

impl<S> Drop for Collector<S> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Poll the source until stopped or exhausted.
fn run_sampling_loop<S: SampleSource>(
    source: &mut S,
    sender: &Sender<CollectorEvent>,
    running: &AtomicBool,
    interval: Duration,
) {
    while running.load(Ordering::SeqCst) {
        let tick = Instant::now();

        let event = match source.next_sample() {
            Ok(Some(sample)) => CollectorEvent::Sample(sample),
            Ok(None) => {
                debug!("Sample source exhausted");
                forward(sender, running, CollectorEvent::Exhausted);
                return;
            }
            Err(e) => {
                warn!("Sample read failed: {e}");
                CollectorEvent::ReadError(e.to_string())
            }
        };

        if !forward(sender, running, event) {
            return;
        }

        let remaining = interval.saturating_sub(tick.elapsed());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }
}

/// Send an event, giving up if the consumer is gone or we were stopped.
///
/// Samples are never dropped on a full channel: a missing sample would turn
/// two non-adjacent readings into one delta.
fn forward(sender: &Sender<CollectorEvent>, running: &AtomicBool, event: CollectorEvent) -> bool {
    let mut pending = event;
    loop {
        match sender.send_timeout(pending, SEND_RETRY) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(event)) => {
                if !running.load(Ordering::SeqCst) {
                    return false;
                }
                pending = event;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
