use std::fmt::Write;

use async_trait::async_trait;

use super::{DeviceError, DeviceImpl};
use crate::models;

pub struct DummyDevice {
    mode: models::DummyDeviceMode,
    buf: String,
}

impl DummyDevice {
    pub fn new(config: &models::Dummy) -> Self {
        Self {
            mode: config.mode,
            buf: String::new(),
        }
    }
}

#[async_trait]
impl DeviceImpl for DummyDevice {
    async fn set_led_data(&mut self, led_data: &[u8]) -> Result<(), DeviceError> {
        self.buf.clear();

        // Write to log when we get new data
        match self.mode {
            models::DummyDeviceMode::Text => {
                for (i, led) in led_data.iter().enumerate() {
                    if i > 0 {
                        self.buf.push(' ');
                    }
                    write!(&mut self.buf, "{:3}", led)?;
                }

                info!(leds = %self.buf);
            }

            models::DummyDeviceMode::Ansi => {
                // Build a truecolor ANSI sequence for all LEDs
                for &led in led_data {
                    write!(
                        &mut self.buf,
                        "\x1B[38;2;{value};{value};{value}m█",
                        value = led
                    )?;
                }

                // Reset
                write!(&mut self.buf, "\x1B[0m")?;

                info!("{}", &self.buf);
            }
        }

        Ok(())
    }
}
