use async_trait::async_trait;
use thiserror::Error;

use crate::{
    dispatcher::LedSink,
    models::{self, DeviceConfig},
};

// Device implementation modules

mod dummy;
mod file;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

#[async_trait]
trait DeviceImpl: Send {
    /// Show the given brightness values on the device
    ///
    /// # Panics
    ///
    /// Implementations are allowed to panic if led_data.len() != hardware_led_count. The [Device]
    /// wrapper is responsible for ensuring the given slice is the right size.
    async fn set_led_data(&mut self, led_data: &[u8]) -> Result<(), DeviceError>;
}

/// LED sink backed by a device implementation
///
/// Writes go to a staging buffer that persists across frames. A flush publishes the staging
/// buffer as the next frame, which [Device::update] then pushes to the hardware.
pub struct Device {
    name: String,
    inner: Box<dyn DeviceImpl>,
    staging: Vec<u8>,
    frame: Vec<u8>,
    pending: bool,
    notified_out_of_range: bool,
}

impl Device {
    fn build_inner(config: &models::Device) -> Result<Box<dyn DeviceImpl>, DeviceError> {
        let inner: Box<dyn DeviceImpl> = match config {
            models::Device::Dummy(dummy) => Box::new(dummy::DummyDevice::new(dummy)),
            models::Device::File(file) => Box::new(file::FileDevice::new(file)?),
        };

        Ok(inner)
    }

    #[instrument(skip(config))]
    pub async fn new(name: &str, config: &models::Device) -> Result<Self, DeviceError> {
        let led_count = config.hardware_led_count();
        let kind: &'static str = config.into();
        let inner = Self::build_inner(config)?;

        info!(
            kind = %kind,
            leds = %led_count,
            "initialized device"
        );

        Ok(Self {
            name: name.to_owned(),
            inner,
            staging: vec![0; led_count],
            frame: vec![0; led_count],
            // The hardware state is unknown until the first push
            pending: true,
            notified_out_of_range: false,
        })
    }

    /// Last flushed frame
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Turn every LED of the staging buffer off
    pub fn clear(&mut self) {
        self.staging.fill(0);
    }

    /// Push the last flushed frame to the device, if it was not pushed yet
    #[instrument]
    pub async fn update(&mut self) -> Result<(), DeviceError> {
        if self.pending {
            self.inner.set_led_data(&self.frame).await?;
            self.pending = false;
        }

        Ok(())
    }
}

impl LedSink for Device {
    fn write(&mut self, index: usize, brightness: u8) {
        if let Some(led) = self.staging.get_mut(index) {
            *led = brightness;
        } else if !self.notified_out_of_range {
            self.notified_out_of_range = true;
            warn!(
                index = %index,
                led_count = %self.staging.len(),
                "ignoring write to a LED out of range"
            );
        }
    }

    fn flush(&mut self) {
        if self.frame != self.staging {
            self.frame.copy_from_slice(&self.staging);
            self.pending = true;
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("name", &self.name).finish()
    }
}
