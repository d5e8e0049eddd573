use crate::prelude::*;

use async_trait::async_trait;
use std::io::Write;

/// Somewhere to put decoded readings.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// One-time preparation before the first record, e.g. creating a database.
    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn accept(&self, record: &MeasurementRecord) -> Result<()>;
}

/// Prints each record as indented JSON on stdout.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

#[async_trait]
impl MetricsSink for StdoutSink {
    async fn accept(&self, record: &MeasurementRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Hands every record to each configured sink in order, stopping at the
/// first failure.
#[derive(Default)]
pub struct Sinks {
    sinks: Vec<Box<dyn MetricsSink>>,
}

impl Sinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl MetricsSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Falls back to stdout when nothing else was configured.
    pub fn or_stdout(mut self) -> Self {
        if self.is_empty() {
            info!("no sink configured, printing readings to stdout");
            self.push(StdoutSink);
        }
        self
    }
}

#[async_trait]
impl MetricsSink for Sinks {
    async fn start(&self) -> Result<()> {
        for sink in &self.sinks {
            sink.start().await?;
        }
        Ok(())
    }

    async fn accept(&self, record: &MeasurementRecord) -> Result<()> {
        for sink in &self.sinks {
            sink.accept(record).await?;
        }
        Ok(())
    }
}
