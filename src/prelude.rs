pub use anyhow::{anyhow, bail, Context, Result};
pub use log::{debug, error, info, trace, warn};

pub use crate::config::{self, Config};
pub use crate::error::{CommunicationError, DecodeError, InverterError, Stage};
pub use crate::omnik;
pub use crate::omnik::inverter::{Fetch, Identity, Inverter};
pub use crate::omnik::packet::MeasurementRecord;
pub use crate::options::Options;
pub use crate::poller::{Mode, Poller, SinkFailurePolicy};
pub use crate::sink::{MetricsSink, Sinks};
pub use crate::utils::Utils;
