// Module declarations for the application's core components
pub mod config;         // Configuration file and flag handling
pub mod datalog_writer; // JSON lines file sink
pub mod error;          // Inverter error taxonomy
pub mod influx;         // InfluxDB sink
pub mod omnik;          // Omnik datalogger protocol and client
pub mod options;        // Command line options parsing
pub mod poller;         // Single-shot and repeating poll loop
pub mod prelude;        // Common imports and types
pub mod sink;           // Metrics sink capability
pub mod utils;          // Field parsing helpers

// Get the package version from Cargo.toml
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::datalog_writer::DatalogWriter;
use crate::influx::Influx;
use crate::prelude::*;
use std::io::Write;

fn init_logging(level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Builds the sinks named in the configuration, in the order readings are
/// handed to them.
pub fn sinks(config: &Config) -> Result<Sinks> {
    let mut sinks = Sinks::new();

    if let Some(influx) = config.influx() {
        sinks.push(Influx::new(influx.clone())?);
    }
    if let Some(path) = config.datalog_file() {
        sinks.push(DatalogWriter::new(path)?);
    }

    Ok(sinks.or_stdout())
}

/// Main application entry point
///
/// Loads configuration, wires the inverter client to the configured sinks
/// and polls until done or interrupted.
pub async fn app(options: Options) -> Result<()> {
    let config = Config::load(&options)?;

    let level = options.loglevel.as_deref().unwrap_or(config.loglevel());
    init_logging(level);

    info!("omnik-bridge {} starting", CARGO_PKG_VERSION);
    if let Some(file) = &options.config_file {
        info!("Read configuration from {}", file);
    }
    config.log();

    let inverter = Inverter::from_config(config.inverter());
    info!(
        "polling inverter {} (serial number {})",
        inverter.identity().address(),
        inverter.identity().serial_number
    );

    let poller = Poller::new(inverter, sinks(&config)?, config.mode()?)
        .with_sink_failure(config.sink_failure());
    match poller.mode() {
        Mode::Once => info!("polling once"),
        Mode::Repeat(interval) => info!("polling every {}s", interval.as_secs()),
    }

    tokio::select! {
        result = poller.run() => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown signal received, exiting");
            Ok(())
        }
    }
}
