use crate::prelude::*;
use crate::omnik::inverter::DEFAULT_TIMEOUT_SECS;
use crate::poller::MIN_REPEAT_INTERVAL;

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub inverter: Inverter,

    #[serde(default)]
    pub influx: Option<Influx>,

    /// Optional path to append readings to as JSON lines
    pub datalog_file: Option<String>,

    /// Poll once when absent
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub repeat_interval: Option<Duration>,

    #[serde(default)]
    pub sink_failure: SinkFailurePolicy,

    #[serde(default = "Config::default_loglevel")]
    pub loglevel: String,
}

// Inverter {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Inverter {
    pub host: String,
    pub port: u16,
    pub serial_number: u64,

    pub timeout: Option<u64>,
}
impl Inverter {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn serial_number(&self) -> u64 {
        self.serial_number
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
} // }}}

// Influx {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Influx {
    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,

    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,

    pub database: String,

    #[serde(default = "Config::default_influx_measurement")]
    pub measurement: String,
}
impl Influx {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &Option<String> {
        &self.username
    }

    pub fn password(&self) -> &Option<String> {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }
} // }}}

impl Config {
    pub fn new(file: String) -> Result<Self> {
        let content = std::fs::read_to_string(&file)
            .map_err(|err| anyhow!("error reading {}: {}", file, err))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from command line flags alone.
    pub fn from_options(options: &Options) -> Result<Self> {
        let (host, port, serial_number) =
            match (&options.ip, options.port, options.serial_number) {
                (Some(host), Some(port), Some(serial_number)) => (host.clone(), port, serial_number),
                _ => bail!("--ip, --port and --serial-number are required without --config"),
            };

        let config = Self {
            inverter: Inverter {
                host,
                port,
                serial_number,
                timeout: None,
            },
            influx: Self::influx_from_options(options),
            datalog_file: options.datalog_file.clone(),
            repeat_interval: options.repeat_interval.map(Duration::from_secs),
            sink_failure: options.sink_failure.unwrap_or_default(),
            loglevel: options.loglevel.clone().unwrap_or_else(Self::default_loglevel),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reads the config file if one was given, with any sink or interval
    /// flags taking precedence over it.
    pub fn load(options: &Options) -> Result<Self> {
        let file = match &options.config_file {
            Some(file) => file,
            None => return Self::from_options(options),
        };

        let mut config = Self::new(file.clone())?;
        if let Some(influx) = Self::influx_from_options(options) {
            config.influx = Some(influx);
        }
        if let Some(datalog_file) = &options.datalog_file {
            config.datalog_file = Some(datalog_file.clone());
        }
        if let Some(secs) = options.repeat_interval {
            config.repeat_interval = Some(Duration::from_secs(secs));
        }
        if let Some(policy) = options.sink_failure {
            config.sink_failure = policy;
        }
        if let Some(loglevel) = &options.loglevel {
            config.loglevel = loglevel.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn influx_from_options(options: &Options) -> Option<Influx> {
        options.influxdb_database.as_ref().map(|database| Influx {
            enabled: true,
            url: format!(
                "http://{}:{}",
                options.influxdb_host.as_deref().unwrap_or("localhost"),
                options.influxdb_port.unwrap_or(8086)
            ),
            username: None,
            password: None,
            database: database.clone(),
            measurement: Self::default_influx_measurement(),
        })
    }

    pub fn inverter(&self) -> &Inverter {
        &self.inverter
    }

    pub fn influx(&self) -> Option<&Influx> {
        self.influx.as_ref().filter(|i| i.enabled())
    }

    pub fn datalog_file(&self) -> Option<&str> {
        self.datalog_file.as_deref()
    }

    pub fn mode(&self) -> Result<Mode> {
        Mode::from_interval(self.repeat_interval)
    }

    pub fn sink_failure(&self) -> SinkFailurePolicy {
        self.sink_failure
    }

    pub fn loglevel(&self) -> &str {
        &self.loglevel
    }

    pub fn log(&self) {
        info!("Configuration loaded successfully:");
        info!("  Inverter:");
        info!("    Host: {}", self.inverter.host);
        info!("    Port: {}", self.inverter.port);
        info!("    Serial Number: {}", self.inverter.serial_number);
        info!("    Timeout: {}s", self.inverter.timeout());
        match self.repeat_interval {
            Some(interval) => info!("  Repeat Interval: {}s", interval.as_secs()),
            None => info!("  Repeat Interval: none (single poll)"),
        }

        info!("  InfluxDB: {}", if self.influx().is_some() { "enabled" } else { "disabled" });
        if let Some(influx) = self.influx() {
            info!("    URL: {}", influx.url);
            info!("    Database: {}", influx.database);
            info!("    Measurement: {}", influx.measurement);
        }

        info!("  Datalog File: {}", self.datalog_file().unwrap_or("none"));
        info!("  Sink Failure: {:?}", self.sink_failure);
        info!("  Log Level: {}", self.loglevel);
    }

    fn validate(&self) -> Result<()> {
        if self.inverter.port == 0 {
            bail!("inverter.port must be between 1 and 65535");
        }
        if self.inverter.host.is_empty() {
            bail!("inverter.host cannot be empty");
        }
        if self.inverter.timeout() == 0 {
            bail!("inverter.timeout must be at least 1 second");
        }

        if let Some(interval) = self.repeat_interval {
            if interval < MIN_REPEAT_INTERVAL {
                bail!(
                    "repeat_interval should be >= {}s",
                    MIN_REPEAT_INTERVAL.as_secs()
                );
            }
        }

        if let Some(influx) = self.influx() {
            if let Err(e) = url::Url::parse(&influx.url) {
                bail!("Invalid InfluxDB URL: {}", e);
            }
            if influx.database.is_empty() {
                bail!("InfluxDB database name cannot be empty");
            }
            if influx.measurement.is_empty() {
                bail!("InfluxDB measurement name cannot be empty");
            }
        }

        if let Some(file) = &self.datalog_file {
            if file.is_empty() {
                bail!("datalog_file cannot be empty");
            }
        }

        Ok(())
    }

    fn default_enabled() -> bool {
        true
    }

    fn default_loglevel() -> String {
        "info".to_string()
    }

    fn default_influx_measurement() -> String {
        "production_metrics".to_string()
    }
}
