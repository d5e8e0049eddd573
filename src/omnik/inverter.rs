use crate::prelude::*;
use crate::omnik::packet::{self, MeasurementRecord};

use {
    async_trait::async_trait,
    std::io,
    std::time::Duration,
    tokio::io::{AsyncReadExt, AsyncWriteExt},
    tokio::net::TcpStream,
};

/// Default bound on each of connect, send and receive.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Largest response read in one exchange.
const MAX_RESPONSE_SIZE: usize = 1024;

/// Something that can produce one reading per call.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self) -> std::result::Result<MeasurementRecord, InverterError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub host: String,
    pub port: u16,
    pub serial_number: u64,
}

impl Identity {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&config::Inverter> for Identity {
    fn from(inverter: &config::Inverter) -> Self {
        Self {
            host: inverter.host().to_string(),
            port: inverter.port(),
            serial_number: inverter.serial_number(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Inverter {
    identity: Identity,
    timeout: Duration,
    query: Vec<u8>,
}

impl Inverter {
    pub fn new(identity: Identity) -> Self {
        Self::with_timeout(identity, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(identity: Identity, timeout: Duration) -> Self {
        let query = packet::encode_query(identity.serial_number);
        Self {
            identity,
            timeout,
            query,
        }
    }

    pub fn from_config(inverter: &config::Inverter) -> Self {
        Self::with_timeout(
            inverter.into(),
            Duration::from_secs(inverter.timeout()),
        )
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn query(&self) -> &[u8] {
        &self.query
    }

    async fn exchange(&self) -> std::result::Result<Vec<u8>, CommunicationError> {
        let address = self.identity.address();
        let fail = |stage, source| CommunicationError::new(address.clone(), stage, source);

        let mut stream = self
            .bounded(TcpStream::connect((self.identity.host.as_str(), self.identity.port)))
            .await
            .map_err(|e| fail(Stage::Connect, e))?;

        trace!("inverter {}: TX {:02x?}", address, self.query);
        self.bounded(stream.write_all(&self.query))
            .await
            .map_err(|e| fail(Stage::Send, e))?;

        let mut buf = vec![0; MAX_RESPONSE_SIZE];
        let len = self
            .bounded(stream.read(&mut buf))
            .await
            .map_err(|e| fail(Stage::Receive, e))?;
        buf.truncate(len);

        debug!("inverter {}: RX {} bytes", address, len);

        Ok(buf)
    }

    async fn bounded<T>(&self, op: impl std::future::Future<Output = io::Result<T>>) -> io::Result<T> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(r) => r,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {}s", self.timeout.as_secs_f64()),
            )),
        }
    }
}

#[async_trait]
impl Fetch for Inverter {
    /// One request/response exchange. The connection is dropped before
    /// returning on every path.
    async fn fetch(&self) -> std::result::Result<MeasurementRecord, InverterError> {
        let response = self.exchange().await?;
        let record = packet::decode_response(&response)?;

        info!(
            "inverter {}: {} W, {} kWh today, {} kWh total, {} C",
            record.serial_number.trim(),
            record.power_w,
            record.energy_today_kwh,
            record.energy_total_kwh,
            record.temperature_c
        );

        Ok(record)
    }
}
