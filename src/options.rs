use crate::poller::{SinkFailurePolicy, MIN_REPEAT_INTERVAL};
use clap::Parser;

/// Omnik Bridge - polls an Omnik inverter datalogger and records its readings
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Options {
    /// Config file to read instead of the device flags
    #[clap(short = 'c', long = "config", conflicts_with_all = ["ip", "port", "serial_number"])]
    pub config_file: Option<String>,

    /// IP address of the inverter
    #[clap(short = 'i', long = "ip", required_unless_present = "config_file")]
    pub ip: Option<String>,

    /// Port number of the inverter
    #[clap(short = 'p', long = "port", required_unless_present = "config_file")]
    pub port: Option<u16>,

    /// Serial number of the logger
    #[clap(short = 's', long = "serial-number", required_unless_present = "config_file")]
    pub serial_number: Option<u64>,

    /// Repeat every n seconds
    #[clap(short = 'r', long = "repeat-interval", value_parser = repeat_interval)]
    pub repeat_interval: Option<u64>,

    /// Hostname or ip of influxdb instance [default: localhost]
    #[clap(long = "influxdb-host", requires = "influxdb_database")]
    pub influxdb_host: Option<String>,

    /// Port number of influxdb instance [default: 8086]
    #[clap(long = "influxdb-port", requires = "influxdb_database")]
    pub influxdb_port: Option<u16>,

    /// Name of the influxdb database to store datapoints
    #[clap(long = "influxdb-database")]
    pub influxdb_database: Option<String>,

    /// Append readings as JSON lines to this file
    #[clap(long = "datalog-file")]
    pub datalog_file: Option<String>,

    /// What to do when a sink rejects a reading while repeating [default: abort]
    #[clap(long = "sink-failure", value_enum)]
    pub sink_failure: Option<SinkFailurePolicy>,

    /// Log level (overridden by RUST_LOG)
    #[clap(short = 'l', long = "loglevel")]
    pub loglevel: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}

fn repeat_interval(value: &str) -> Result<u64, String> {
    let secs: u64 = value.parse().map_err(|e| format!("{}", e))?;
    if secs < MIN_REPEAT_INTERVAL.as_secs() {
        return Err(format!(
            "repeat_interval should be >= {}",
            MIN_REPEAT_INTERVAL.as_secs()
        ));
    }
    Ok(secs)
}
