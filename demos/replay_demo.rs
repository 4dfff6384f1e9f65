//! Demonstration of offline RUN/STOP classification.
//!
//! This example shows how to:
//! 1. Record a synthetic rest → shake → rest session as an x,y,z log
//! 2. Replay the log through a collector
//! 3. Classify it with a sample loop and inspect the transitions
//!
//! Run with: cargo run --example replay_demo

use std::f64::consts::PI;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use motion_sensor_agent::{
    agent::SampleLoop,
    collector::{Collector, CollectorConfig, ReplaySource},
    core::MotionMonitor,
    sink::{ConsoleSink, MemorySink},
    stats::SessionLog,
};

fn main() {
    println!("Motion Sensor Agent - Replay Demo");
    println!("=================================");
    println!();

    // Write a synthetic log: 2s at rest, 3s shaking, 2s at rest (100 Hz)
    let path = std::env::temp_dir().join("motion_replay_demo.csv");
    {
        let mut file = std::fs::File::create(&path).expect("Failed to create demo log");
        for i in 0..700 {
            let t = i as f64 / 100.0;
            let shake = if (2.0..5.0).contains(&t) {
                0.4 * (2.0 * PI * 3.0 * t).sin()
            } else {
                0.0
            };
            let (x, y, z) = (0.01, -0.02 + shake, 1.0 + shake / 2.0);
            writeln!(file, "{x:.4},{y:.4},{z:.4}").expect("Failed to write demo log");
        }
    }
    println!("Wrote synthetic session to {}", path.display());
    println!();

    let source = ReplaySource::open(&path).expect("Failed to open demo log");
    let mut collector = Collector::new(
        CollectorConfig {
            interval: Duration::ZERO,
            ..CollectorConfig::default()
        },
        source,
    );

    let log = std::sync::Arc::new(SessionLog::new());
    let monitor = MotionMonitor::new(100, 0.07).expect("Window capacity must be positive");
    let mut sample_loop = SampleLoop::new(monitor, log.clone());

    let memory = MemorySink::new();
    sample_loop.add_sink(Box::new(memory.clone()));
    sample_loop.add_sink(Box::new(ConsoleSink::stdout(true)));

    println!("State changes:");
    collector.start().expect("Failed to start collector");
    let running = AtomicBool::new(true);
    sample_loop.run(collector.receiver(), &running);
    collector.stop();

    println!();
    for report in memory.reports().iter().filter(|r| r.state_changed) {
        println!(
            "  sample {:>4} ({:.2}s): {} (mean {:.4})",
            report.sequence,
            report.sequence as f64 / 100.0,
            report.state,
            report.mean_change_rate
        );
    }

    println!();
    println!("{}", log.summary());
    println!();
    println!("Demo complete!");

    let _ = std::fs::remove_file(&path);
}
