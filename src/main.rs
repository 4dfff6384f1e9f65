//! Motion Sensor Agent CLI
//!
//! Samples a LIS3DH accelerometer and classifies the device as RUN or STOP.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use motion_sensor_agent::{
    agent::{Flow, SampleLoop},
    collector::{
        Collector, CollectorConfig, I2cDevice, Lis3dh, ReplaySource, SampleSource,
    },
    config::{Config, SensorConfig},
    core::MotionMonitor,
    sink::{ConsoleSink, CsvSink, JsonlSink, ReportSink},
    stats::{create_shared_log_with_persistence, PersistedStats},
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motion-sensor")]
#[command(version = VERSION)]
#[command(about = "LIS3DH motion sampler with RUN/STOP classification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sampling and classifying
    Start {
        /// I2C bus device (overrides config)
        #[arg(long)]
        bus: Option<PathBuf>,

        /// 7-bit I2C address, e.g. 0x19 (overrides config)
        #[arg(long, value_parser = parse_address)]
        address: Option<u8>,

        /// Milliseconds between samples (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Number of change-rate values averaged (overrides config)
        #[arg(long)]
        window: Option<usize>,

        /// RUN threshold on the mean change rate (overrides config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Log file receiving one line per sample (overrides config)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Log file format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Re-classify a recorded x,y,z log instead of reading the sensor
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Print only state changes instead of every sample
        #[arg(long)]
        quiet: bool,
    },

    /// Check that a LIS3DH answers on the bus
    Probe {
        /// I2C bus device (overrides config)
        #[arg(long)]
        bus: Option<PathBuf>,

        /// 7-bit I2C address (overrides config)
        #[arg(long, value_parser = parse_address)]
        address: Option<u8>,
    },

    /// Pause sampling in a running agent
    Pause,

    /// Resume sampling in a running agent
    Resume,

    /// Show configuration and cumulative statistics
    Status,

    /// Show configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// x,y,z per line
    Csv,
    /// One JSON report per line
    Jsonl,
}

struct StartArgs {
    bus: Option<PathBuf>,
    address: Option<u8>,
    interval_ms: Option<u64>,
    window: Option<usize>,
    threshold: Option<f64>,
    output: Option<PathBuf>,
    format: OutputFormat,
    replay: Option<PathBuf>,
    quiet: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    SensorConfig::parse_address(s).map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start {
            bus,
            address,
            interval_ms,
            window,
            threshold,
            output,
            format,
            replay,
            quiet,
        } => cmd_start(StartArgs {
            bus,
            address,
            interval_ms,
            window,
            threshold,
            output,
            format,
            replay,
            quiet,
        }),
        Commands::Probe { bus, address } => cmd_probe(bus, address),
        Commands::Pause => cmd_set_paused(true),
        Commands::Resume => cmd_set_paused(false),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {e}");
        Config::default()
    })
}

fn cmd_start(args: StartArgs) -> anyhow::Result<()> {
    let mut config = load_config();
    if let Some(bus) = args.bus {
        config.sensor.bus_path = bus;
    }
    if let Some(address) = args.address {
        config.sensor.address = address;
    }
    if let Some(ms) = args.interval_ms {
        config.sample_interval = Duration::from_millis(ms);
    }
    if let Some(window) = args.window {
        config.window_capacity = window;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }
    config.validate()?;
    if args.replay.as_ref() == Some(&config.output_path) {
        bail!("Replay file and output file must differ");
    }

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    println!("Motion Sensor Agent v{VERSION}");
    println!();

    // Replays run as fast as the consumer keeps up
    let (source, interval): (Box<dyn SampleSource + Send>, Duration) = match &args.replay {
        Some(path) => {
            let source = ReplaySource::open(path)
                .with_context(|| format!("Could not open replay file {}", path.display()))?;
            println!("  Source: replay of {}", path.display());
            let source: Box<dyn SampleSource + Send> = Box::new(source);
            (source, Duration::ZERO)
        }
        None => {
            let device = I2cDevice::open(&config.sensor.bus_path, config.sensor.address)
                .context("Could not open the I2C bus")?;
            let mut sensor = Lis3dh::new(device);
            sensor.init().context("Could not initialise the LIS3DH")?;
            println!(
                "  Source: LIS3DH at 0x{:02X} on {}",
                config.sensor.address,
                config.sensor.bus_path.display()
            );
            let source: Box<dyn SampleSource + Send> = Box::new(sensor);
            (source, config.sample_interval)
        }
    };

    println!("  Sample interval: {}ms", config.sample_interval.as_millis());
    println!("  Window: {} samples", config.window_capacity);
    println!("  Threshold: {}", config.threshold);
    println!("  Output: {}", config.output_path.display());

    let session_log = create_shared_log_with_persistence(config.stats_path());
    println!("  Session ID: {}", session_log.session_id());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let monitor = MotionMonitor::new(config.window_capacity, config.threshold)?;
    let mut sample_loop = SampleLoop::new(monitor, session_log.clone());

    let file_sink: Box<dyn ReportSink> = match args.format {
        OutputFormat::Csv => Box::new(CsvSink::append(&config.output_path).with_context(|| {
            format!("Could not open output file {}", config.output_path.display())
        })?),
        OutputFormat::Jsonl => {
            Box::new(JsonlSink::append(&config.output_path).with_context(|| {
                format!("Could not open output file {}", config.output_path.display())
            })?)
        }
    };
    sample_loop.add_sink(file_sink);
    sample_loop.add_sink(Box::new(ConsoleSink::stdout(args.quiet)));

    let mut collector = Collector::new(
        CollectorConfig {
            interval,
            ..CollectorConfig::default()
        },
        source,
    );

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    // Support pause/resume from another process by polling the config file.
    let mut paused = config.paused;
    let mut last_config_check = Instant::now();

    if paused {
        println!("Sampling is currently paused.");
        println!("Run `motion-sensor resume` to start sampling.");
        println!();
    } else {
        collector.start()?;
    }

    let receiver = collector.receiver().clone();

    while running.load(Ordering::SeqCst) {
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;

                    if paused {
                        info!("Pausing sampling");
                        collector.stop();

                        // Finish whatever was already read
                        while let Some(event) = collector.try_recv() {
                            sample_loop.handle_event(event);
                        }
                        sample_loop.flush();
                    } else {
                        info!("Resuming sampling");
                        collector.start()?;
                    }
                }
            }
            last_config_check = Instant::now();
        }

        if paused {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        if sample_loop.poll(&receiver, Duration::from_millis(100)) == Flow::Finished {
            break;
        }
    }

    println!();
    println!("Stopping sampling...");
    collector.stop();

    // The thread is joined, so every event it sent is already queued
    while let Some(event) = collector.try_recv() {
        if sample_loop.handle_event(event) == Flow::Finished {
            break;
        }
    }
    sample_loop.flush();

    if let Err(e) = session_log.save() {
        eprintln!("Warning: Could not save session stats: {e}");
    }

    let monitor = sample_loop.monitor();
    println!();
    println!(
        "Final mean change rate: {:.4} ({})",
        monitor.mean_change_rate(),
        monitor
            .state()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "no samples".to_string())
    );
    println!();
    println!("{}", session_log.summary());

    Ok(())
}

fn cmd_probe(bus: Option<PathBuf>, address: Option<u8>) -> anyhow::Result<()> {
    let config = load_config();
    let bus = bus.unwrap_or(config.sensor.bus_path);
    let address = address.unwrap_or(config.sensor.address);

    let device = I2cDevice::open(&bus, address).context("Could not open the I2C bus")?;
    let mut sensor = Lis3dh::new(device);

    match sensor.probe() {
        Ok(()) => {
            println!("LIS3DH found at 0x{address:02X} on {} ✓", bus.display());
            Ok(())
        }
        Err(e) => bail!("No LIS3DH at 0x{address:02X} on {}: {e}", bus.display()),
    }
}

fn cmd_set_paused(paused: bool) -> anyhow::Result<()> {
    let mut config = load_config();
    config.paused = paused;
    config.save().context("Error saving config")?;

    if paused {
        println!("Sampling paused. Use 'motion-sensor resume' to continue.");
    } else {
        println!("Sampling resumed.");
    }
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = load_config();

    println!("Motion Sensor Agent Status");
    println!("==========================");
    println!();

    println!("Configuration:");
    println!("  Bus: {}", config.sensor.bus_path.display());
    println!("  Address: 0x{:02X}", config.sensor.address);
    println!("  Sample interval: {}ms", config.sample_interval.as_millis());
    println!("  Window: {} samples", config.window_capacity);
    println!("  Threshold: {}", config.threshold);
    println!("  Output: {}", config.output_path.display());
    println!("  Paused: {}", config.paused);
    println!();

    let stats_path = config.stats_path();
    if !stats_path.exists() {
        println!("No previous session data found.");
        return Ok(());
    }

    let content = std::fs::read_to_string(&stats_path)
        .with_context(|| format!("Could not read {}", stats_path.display()))?;
    let stats: PersistedStats = serde_json::from_str(&content)
        .with_context(|| format!("Could not parse {}", stats_path.display()))?;

    println!("Cumulative Statistics:");
    println!("  Samples processed: {}", stats.samples_processed);
    println!("  RUN samples: {}", stats.run_samples);
    println!("  STOP samples: {}", stats.stop_samples);
    println!("  State changes: {}", stats.state_changes);
    println!("  Read errors: {}", stats.read_errors);
    println!("  Sink errors: {}", stats.sink_errors);
    println!(
        "  Last updated: {}",
        stats.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
