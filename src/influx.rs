use crate::prelude::*;

use async_trait::async_trait;
use reqwest::Url;

/// Writes readings to an InfluxDB 1.x database over its HTTP API.
#[derive(Clone, Debug)]
pub struct Influx {
    config: config::Influx,
    url: Url,
    client: reqwest::Client,
}

impl Influx {
    pub fn new(config: config::Influx) -> Result<Self> {
        let mut url = Url::parse(config.url())
            .with_context(|| format!("invalid influx url {}", config.url()))?;

        // keep any path prefix when joining the endpoint names
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            config,
            url,
            client: reqwest::Client::new(),
        })
    }

    fn request(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.url.join(path)?;
        let request = self.client.post(url);

        Ok(match (self.config.username(), self.config.password()) {
            (Some(u), p) => request.basic_auth(u, p.as_ref()),
            _ => request,
        })
    }

    fn database(&self) -> &str {
        self.config.database()
    }
}

#[async_trait]
impl MetricsSink for Influx {
    async fn start(&self) -> Result<()> {
        info!("initializing influx at {}", self.url);

        let query = format!("CREATE DATABASE \"{}\"", self.database().replace('"', "\\\""));
        self.request("query")?
            .query(&[("q", query.as_str())])
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("creating influx database {}", self.database()))?;

        info!("influx database {} ready", self.database());

        Ok(())
    }

    async fn accept(&self, record: &MeasurementRecord) -> Result<()> {
        let line = line_protocol(self.config.measurement(), record)?;
        trace!("Sending to InfluxDB: {}", line);

        self.request("write")?
            .query(&[("db", self.database()), ("precision", "ns")])
            .body(line)
            .send()
            .await?
            .error_for_status()
            .context("influx write failed")?;

        debug!("sent reading at {} to InfluxDB", record.observed_at);

        Ok(())
    }
}

/// One line-protocol point: all readings as fields, timestamped in
/// nanoseconds at `observed_at`.
pub fn line_protocol(measurement: &str, record: &MeasurementRecord) -> Result<String> {
    let timestamp = record
        .observed_at
        .timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("timestamp out of range: {}", record.observed_at))?;

    let fields = [
        ("energy_today", record.energy_today_kwh),
        ("energy_total", record.energy_total_kwh),
        ("input_voltage", record.input_voltage_v),
        ("input_current", record.input_current_a),
        ("output_voltage", record.output_voltage_v),
        ("output_current", record.output_current_a),
        ("output_frequency", record.output_frequency_hz),
        ("temperature", record.temperature_c),
    ]
    .iter()
    .map(|(name, value)| format!("{}={}", name, value))
    .collect::<Vec<_>>()
    .join(",");

    Ok(format!(
        "{} power={}i,{} {}",
        escape_measurement(measurement),
        record.power_w,
        fields,
        timestamp
    ))
}

fn escape_measurement(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn record() -> MeasurementRecord {
        MeasurementRecord {
            serial_number: "NLDN302013P00001".to_string(),
            power_w: 1234,
            energy_today_kwh: 5.67,
            energy_total_kwh: 12345.6,
            input_voltage_v: 300.1,
            input_current_a: 4.2,
            output_voltage_v: 230.5,
            output_current_a: 5.3,
            output_frequency_hz: 50.01,
            temperature_c: 35.5,
            observed_at: DateTime::from(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
        }
    }

    #[test]
    fn formats_a_point() {
        let line = line_protocol("production_metrics", &record()).unwrap();
        assert_eq!(
            line,
            "production_metrics power=1234i,energy_today=5.67,energy_total=12345.6,\
             input_voltage=300.1,input_current=4.2,output_voltage=230.5,output_current=5.3,\
             output_frequency=50.01,temperature=35.5 1700000000000000000"
        );
    }

    fn endpoint(url: &str, path: &str) -> String {
        let influx = Influx::new(config::Influx {
            enabled: true,
            url: url.to_string(),
            username: None,
            password: None,
            database: "solar".to_string(),
            measurement: "production_metrics".to_string(),
        })
        .unwrap();
        influx.request(path).unwrap().build().unwrap().url().to_string()
    }

    #[test]
    fn endpoints_keep_path_prefix() {
        assert_eq!(endpoint("http://host:8086", "write"), "http://host:8086/write");
        assert_eq!(endpoint("http://host:8086/", "query"), "http://host:8086/query");
        assert_eq!(endpoint("http://host:8086/influx", "write"), "http://host:8086/influx/write");
        assert_eq!(endpoint("http://host:8086/influx/", "write"), "http://host:8086/influx/write");
    }

    #[test]
    fn escapes_measurement_name() {
        let line = line_protocol("solar plant,a", &record()).unwrap();
        assert!(line.starts_with("solar\\ plant\\,a power=1234i,"));
    }
}
