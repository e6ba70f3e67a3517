use std::time::Duration;

use tokio::{select, sync::watch, time};
use tokio_util::sync::CancellationToken;

use super::{Device, InstanceError};
use crate::{
    dispatcher::{Dispatcher, LedSink},
    readings::ReadingSnapshot,
};

/// Renders one frame per frame interval from the latest snapshot
pub struct Renderer {
    dispatcher: Dispatcher,
    device: Device,
    interval: Duration,
    rx: watch::Receiver<ReadingSnapshot>,
}

impl Renderer {
    pub fn new(
        dispatcher: Dispatcher,
        device: Device,
        interval: Duration,
        rx: watch::Receiver<ReadingSnapshot>,
    ) -> Self {
        Self {
            dispatcher,
            device,
            interval,
            rx,
        }
    }

    async fn render(&mut self) -> Result<(), InstanceError> {
        // Clone the pair so the poller is never blocked by a frame
        let snapshot = self.rx.borrow().clone();

        self.dispatcher.render_frame(&snapshot, &mut self.device);
        self.device.update().await?;

        Ok(())
    }

    /// Turn every LED off and push the blank frame
    async fn shutdown(&mut self) -> Result<(), InstanceError> {
        self.device.clear();
        self.device.flush();
        self.device.update().await?;
        Ok(())
    }

    /// Render until `token` is cancelled, then leave the device blank
    ///
    /// Returns the device so its final frame can be inspected.
    pub async fn run(mut self, token: CancellationToken) -> Result<Device, InstanceError> {
        let mut interval = time::interval(self.interval);
        // Skip the backlog after a stall instead of rendering a burst of frames
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            select! {
                biased;

                _ = token.cancelled() => {
                    debug!("renderer cancelled");
                    break;
                },
                _ = interval.tick() => {
                    if let Err(error) = self.render().await {
                        error!(error = %error, "device update failed");
                        self.shutdown().await.ok();
                        return Err(error);
                    }
                },
            }
        }

        self.shutdown().await?;
        Ok(self.device)
    }
}
