use std::fmt;

use thiserror::Error;

/// Every way a single exchange with the datalogger can fail.
///
/// Both kinds are recoverable: the poller treats either one as "this cycle
/// produced no record".
#[derive(Debug, Error)]
pub enum InverterError {
    #[error(transparent)]
    Communication(#[from] CommunicationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Which part of the exchange a `CommunicationError` happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Send,
    Receive,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Connect => write!(f, "connect"),
            Stage::Send => write!(f, "send"),
            Stage::Receive => write!(f, "receive"),
        }
    }
}

#[derive(Debug, Error)]
#[error("error while retrieving data from inverter at {address} ({stage})")]
pub struct CommunicationError {
    pub address: String,
    pub stage: Stage,
    #[source]
    pub source: std::io::Error,
}

impl CommunicationError {
    pub fn new(address: impl Into<String>, stage: Stage, source: std::io::Error) -> Self {
        Self {
            address: address.into(),
            stage,
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.source.kind() == std::io::ErrorKind::TimedOut
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response too short: got {len} bytes, need at least {required}")]
    TooShort { len: usize, required: usize },
    #[error("malformed response field: {0}")]
    Field(String),
    #[error("serial number is not valid text")]
    SerialNumber(#[from] std::str::Utf8Error),
}
