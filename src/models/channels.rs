use parse_display::Display;
use serde_derive::{Deserialize, Serialize};
use strum_macros::EnumIter;
use validator::Validate;

/// Telemetry signal a channel displays
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum Sensor {
    /// Processor busy time
    Cpu,
    /// Memory in use
    Memory,
    /// SoC temperature, 100 °C is full scale
    Temperature,
    /// Network throughput
    Network,
    /// Open SSH sessions
    Sessions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum ChannelMode {
    /// Rotating segment on a circular group of LEDs
    Ring,
    /// Level meter with a pulsing peak on a linear group of LEDs
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Channel {
    #[validate(length(min = 1))]
    pub name: String,
    pub sensor: Sensor,
    pub mode: ChannelMode,
    /// Device LED indices, in display order
    pub leds: Vec<usize>,
}

impl Channel {
    pub fn new(name: &str, sensor: Sensor, mode: ChannelMode, leds: &[usize]) -> Self {
        Self {
            name: name.to_owned(),
            sensor,
            mode,
            leds: leds.to_vec(),
        }
    }
}

/// Wiring of the PiGlow board
///
/// The two rings are the blue and white LEDs of each arm, the bars run along the arms from the
/// green LED in to the red LED out.
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::new("cpu", Sensor::Cpu, ChannelMode::Ring, &[4, 11, 14]),
        Channel::new("sessions", Sensor::Sessions, ChannelMode::Ring, &[9, 10, 12]),
        Channel::new("cpu-bar", Sensor::Cpu, ChannelMode::Bar, &[5, 8, 7, 6]),
        Channel::new("memory", Sensor::Memory, ChannelMode::Bar, &[13, 15, 16, 17]),
        Channel::new("temperature", Sensor::Temperature, ChannelMode::Bar, &[3, 2, 1, 0]),
    ]
}
