use std::collections::BTreeSet;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

mod channels;
pub use channels::*;

mod devices;
pub use devices::*;

mod sources;
pub use sources::*;

/// Longest pulse decay or delay, in milliseconds
pub const MAX_PULSE_DURATION: u32 = 3_600_000;

fn default_false() -> bool {
    false
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalConfig {
    /// Frames rendered per second
    #[validate(range(min = 1, max = 1000))]
    pub frame_rate: u32,
    /// Interval between two sensor polls, in milliseconds
    #[validate(range(min = 10))]
    pub poll_interval: u32,
}

impl GlobalConfig {
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.frame_rate as u64)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval as _)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            frame_rate: 50,
            poll_interval: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Animation {
    /// Degrees a ring turns every frame
    #[validate(range(min = -359, max = 359))]
    pub rotation_step: i32,
    /// Brightness of the bar peak LED at the start of a pulse
    pub pulse_peak_brightness: u8,
    /// Duration of the pulse decay, in milliseconds
    #[validate(range(max = MAX_PULSE_DURATION))]
    pub pulse_decay: u32,
    /// Rest between two pulses, in milliseconds
    #[validate(range(max = MAX_PULSE_DURATION))]
    pub pulse_delay: u32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            rotation_step: 7,
            pulse_peak_brightness: 100,
            pulse_decay: 500,
            pulse_delay: 2000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("channel {channel}: LED {index} is out of the device range (0..{led_count})")]
    LedOutOfRange {
        channel: String,
        index: usize,
        led_count: usize,
    },
    #[error("channel {0} has no LEDs")]
    NoLeds(String),
    #[error("duplicate channel name: {0}")]
    DuplicateChannel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub animation: Animation,
    pub device: Device,
    pub source: Source,
    pub channels: Vec<Channel>,
}

impl Config {
    /// Check the configuration against the device it drives
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.global.validate()?;
        self.animation.validate()?;
        self.device.validate()?;
        self.source.validate()?;

        let led_count = self.device.hardware_led_count();
        let mut names = BTreeSet::new();

        for channel in &self.channels {
            channel.validate()?;

            if !names.insert(channel.name.as_str()) {
                return Err(ConfigError::DuplicateChannel(channel.name.clone()));
            }

            if channel.leds.is_empty() {
                return Err(ConfigError::NoLeds(channel.name.clone()));
            }

            if let Some(&index) = channel.leds.iter().find(|&&index| index >= led_count) {
                return Err(ConfigError::LedOutOfRange {
                    channel: channel.name.clone(),
                    index,
                    led_count,
                });
            }
        }

        Ok(())
    }

    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        use tokio::io::AsyncReadExt;

        let mut file = tokio::fs::File::open(path).await?;
        let mut full = String::new();
        file.read_to_string(&mut full).await?;

        let config = Self::parse(&full)?;

        debug!(
            path = %path.display(),
            channels = %config.channels.len(),
            "loaded",
        );

        Ok(config)
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: Default::default(),
            animation: Default::default(),
            device: Default::default(),
            source: Default::default(),
            channels: default_channels(),
        }
    }
}
