use ambassador::{delegatable_trait, Delegate};
use derive_more::From;
use serde_derive::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use validator::Validate;

use super::default_false;

/// Number of LEDs on a PiGlow board
pub const PIGLOW_LED_COUNT: u32 = 18;

fn default_led_count() -> u32 {
    PIGLOW_LED_COUNT
}

#[delegatable_trait]
pub trait DeviceConfig: Sync + Send {
    fn hardware_led_count(&self) -> usize;
}

macro_rules! impl_device_config {
    ($t:ty) => {
        impl DeviceConfig for $t {
            fn hardware_led_count(&self) -> usize {
                self.hardware_led_count as _
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DummyDeviceMode {
    /// One log line listing the brightness values
    Text,
    /// One log line with a grayscale truecolor strip
    Ansi,
}

impl Default for DummyDeviceMode {
    fn default() -> Self {
        Self::Text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Dummy {
    #[validate(range(min = 1))]
    pub hardware_led_count: u32,
    pub mode: DummyDeviceMode,
}

impl_device_config!(Dummy);

impl Default for Dummy {
    fn default() -> Self {
        Self {
            hardware_led_count: PIGLOW_LED_COUNT,
            mode: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct File {
    #[serde(default = "default_led_count")]
    #[validate(range(min = 1))]
    pub hardware_led_count: u32,
    #[validate(length(min = 1))]
    pub output: String,
    #[serde(default = "default_false")]
    pub print_time_stamp: bool,
}

impl_device_config!(File);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr, Delegate, From)]
#[serde(rename_all = "lowercase", tag = "type", deny_unknown_fields)]
#[delegate(DeviceConfig)]
pub enum Device {
    Dummy(Dummy),
    File(File),
}

impl Default for Device {
    fn default() -> Self {
        Self::Dummy(Dummy::default())
    }
}

impl Validate for Device {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Device::Dummy(device) => device.validate(),
            Device::File(device) => device.validate(),
        }
    }
}
