use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SystemSource {
    /// Number of SSH sessions shown as a full reading
    #[validate(range(min = 1))]
    pub max_sessions: u32,
    /// Network throughput shown as a full reading, in bytes per second
    #[validate(range(min = 1))]
    pub network_max_bytes: u64,
}

impl Default for SystemSource {
    fn default() -> Self {
        Self {
            max_sessions: 3,
            network_max_bytes: 1 << 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixedSource {
    /// Reading of every channel, by channel name
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", deny_unknown_fields)]
pub enum Source {
    /// Linux procfs and sysfs counters
    System(SystemSource),
    /// Constant readings from the configuration
    Fixed(FixedSource),
}

impl Default for Source {
    fn default() -> Self {
        Self::System(SystemSource::default())
    }
}

impl Validate for Source {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Source::System(source) => source.validate(),
            Source::Fixed(_) => Ok(()),
        }
    }
}
