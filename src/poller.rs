use crate::prelude::*;

use serde::Deserialize;
use std::time::Duration;

/// Shortest interval allowed between two polls.
pub const MIN_REPEAT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Poll exactly once and surface any failure.
    Once,
    /// Poll forever, sleeping the given interval after every cycle.
    Repeat(Duration),
}

impl Mode {
    pub fn repeat(interval: Duration) -> Result<Self> {
        if interval < MIN_REPEAT_INTERVAL {
            bail!(
                "repeat interval should be >= {}s, got {}s",
                MIN_REPEAT_INTERVAL.as_secs(),
                interval.as_secs()
            );
        }
        Ok(Self::Repeat(interval))
    }

    pub fn from_interval(interval: Option<Duration>) -> Result<Self> {
        match interval {
            Some(interval) => Self::repeat(interval),
            None => Ok(Self::Once),
        }
    }
}

/// What the repeating loop does when a sink rejects a record. A sink that
/// fails to start always ends the run, whatever the policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkFailurePolicy {
    /// Stop polling and return the sink error.
    #[default]
    Abort,
    /// Log the error and carry on with the next cycle.
    Skip,
}

enum Cycle {
    Delivered,
    Missed(InverterError),
}

pub struct Poller<F, S> {
    source: F,
    sink: S,
    mode: Mode,
    on_sink_failure: SinkFailurePolicy,
}

impl<F: Fetch, S: MetricsSink> Poller<F, S> {
    pub fn new(source: F, sink: S, mode: Mode) -> Self {
        Self {
            source,
            sink,
            mode,
            on_sink_failure: SinkFailurePolicy::default(),
        }
    }

    pub fn with_sink_failure(mut self, policy: SinkFailurePolicy) -> Self {
        self.on_sink_failure = policy;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Prepares the sink, then polls according to the mode. In repeating
    /// mode this only returns on a sink failure under `SinkFailurePolicy::Abort`.
    pub async fn run(&self) -> Result<()> {
        self.sink.start().await?;

        match self.mode {
            Mode::Once => self.once().await,
            Mode::Repeat(interval) => self.repeat(interval).await,
        }
    }

    async fn once(&self) -> Result<()> {
        match self.cycle().await? {
            Cycle::Delivered => Ok(()),
            Cycle::Missed(err) => Err(err.into()),
        }
    }

    async fn repeat(&self, interval: Duration) -> Result<()> {
        loop {
            match self.cycle().await {
                Ok(Cycle::Delivered) => {}
                Ok(Cycle::Missed(err)) => {
                    warn!("no reading this cycle: {:#}", anyhow::Error::from(err));
                }
                Err(err) => match self.on_sink_failure {
                    SinkFailurePolicy::Abort => return Err(err.context("sink rejected reading")),
                    SinkFailurePolicy::Skip => error!("sink rejected reading: {:#}", err),
                },
            }

            trace!("sleeping {}s until next poll", interval.as_secs());
            tokio::time::sleep(interval).await;
        }
    }

    // inverter failures come back as Missed, sink failures as Err
    async fn cycle(&self) -> Result<Cycle> {
        let record = match self.source.fetch().await {
            Ok(record) => record,
            Err(err) => return Ok(Cycle::Missed(err)),
        };

        self.sink.accept(&record).await?;

        Ok(Cycle::Delivered)
    }
}
