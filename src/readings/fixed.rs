use async_trait::async_trait;

use super::{ReadingSource, SourceError};
use crate::models;

/// Source returning the readings written in the configuration
pub struct FixedReadings {
    config: models::FixedSource,
}

impl FixedReadings {
    pub fn new(config: models::FixedSource) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ReadingSource for FixedReadings {
    fn read(&self, channel: &models::Channel) -> Result<f64, SourceError> {
        self.config
            .values
            .get(&channel.name)
            .copied()
            .ok_or_else(|| SourceError::MissingValue(channel.name.clone()))
    }
}
