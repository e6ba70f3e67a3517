//! Normalized readings and the sources producing them

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{self, Sensor};

mod fixed;
pub use fixed::*;

mod system;
pub use system::*;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no reading available for {0}")]
    Unavailable(Sensor),
    #[error("no value configured for channel {0}")]
    MissingValue(String),
}

/// Source of normalized readings
#[async_trait]
pub trait ReadingSource: Send {
    /// Sample the underlying counters. Called once per polling interval, before the channels
    /// are read.
    async fn refresh(&mut self) {}

    /// Current reading for a channel, in [0, 1]
    fn read(&self, channel: &models::Channel) -> Result<f64, SourceError>;
}

/// Build the source described by the configuration
pub fn from_config(config: &models::Source) -> Box<dyn ReadingSource> {
    match config {
        models::Source::System(system) => Box::new(SystemReadings::new(system.clone())),
        models::Source::Fixed(fixed) => Box::new(FixedReadings::new(fixed.clone())),
    }
}

/// Reading of every channel at a given time, by channel name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readings(BTreeMap<String, f64>);

impl Readings {
    /// Reading of a channel, 0 if it was never read
    pub fn get(&self, channel: &str) -> f64 {
        self.0.get(channel).copied().unwrap_or(0.)
    }

    pub fn insert(&mut self, channel: impl Into<String>, value: f64) {
        self.0.insert(channel.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> std::iter::FromIterator<(S, f64)> for Readings {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Previous and current readings, always from two consecutive polls
///
/// The pair is replaced as a whole, so a reader never sees halves of different generations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingSnapshot {
    pub previous: Arc<Readings>,
    pub current: Arc<Readings>,
}

impl ReadingSnapshot {
    /// Snapshot following this one, where `current` becomes the new reading
    pub fn advance(&self, current: Readings) -> Self {
        Self {
            previous: self.current.clone(),
            current: Arc::new(current),
        }
    }

    /// Previous and current reading of a channel
    pub fn pair(&self, channel: &str) -> (f64, f64) {
        (self.previous.get(channel), self.current.get(channel))
    }
}

/// Read every channel from `source`, keeping the last known value of channels that fail
pub fn poll(
    source: &dyn ReadingSource,
    channels: &[models::Channel],
    last: &Readings,
) -> Readings {
    channels
        .iter()
        .map(|channel| {
            let value = match source.read(channel) {
                Ok(value) => value,
                Err(error) => {
                    debug!(channel = %channel.name, error = %error, "keeping last reading");
                    last.get(&channel.name)
                }
            };

            (channel.name.as_str(), value)
        })
        .collect()
}
