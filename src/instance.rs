use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    animation::AnimationTiming,
    dispatcher::Dispatcher,
    models::Config,
    readings::{self, ReadingSnapshot, ReadingSource},
};

mod device;
pub use device::*;

mod poller;
use poller::*;

mod renderer;
use renderer::*;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
    #[error("task error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A display instance: one reading source driving one LED device
pub struct Instance {
    config: Arc<Config>,
    device: Device,
    source: Box<dyn ReadingSource>,
}

impl Instance {
    pub async fn new(config: Config) -> Result<Self, InstanceError> {
        let device = Device::new("glowstat", &config.device).await?;
        let source = readings::from_config(&config.source);

        Ok(Self {
            config: Arc::new(config),
            device,
            source,
        })
    }

    /// Run the polling and rendering tasks until `token` is cancelled
    ///
    /// The device is left with every LED off when this returns.
    #[instrument(skip(token))]
    pub async fn run(self, token: CancellationToken) -> Result<(), InstanceError> {
        let (snapshot_tx, snapshot_rx) = watch::channel(ReadingSnapshot::default());

        let timing = AnimationTiming::new(&self.config.animation, self.config.global.frame_rate);
        let dispatcher = Dispatcher::new(&self.config.channels, &timing);

        let poller = Poller::new(
            self.source,
            self.config.channels.clone(),
            self.config.global.poll_interval(),
            snapshot_tx,
        );
        let renderer = Renderer::new(
            dispatcher,
            self.device,
            self.config.global.frame_interval(),
            snapshot_rx,
        );

        info!(
            channels = %self.config.channels.len(),
            frame_rate = %self.config.global.frame_rate,
            "starting"
        );

        let poller = tokio::spawn(poller.run(token.clone()));
        let rendered = renderer.run(token.clone()).await;

        // Stop the poller as well if the renderer failed on its own
        token.cancel();
        poller.await?;

        info!("stopped");
        rendered.map(|_| ())
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("channels", &self.config.channels.len())
            .field("device", &self.device)
            .finish()
    }
}
