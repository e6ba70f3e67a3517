use std::time::Duration;

use tokio::{select, sync::watch, time};
use tokio_util::sync::CancellationToken;

use crate::{
    models,
    readings::{self, ReadingSnapshot, ReadingSource},
};

/// Reads every channel once per polling interval and publishes the snapshot
pub struct Poller {
    source: Box<dyn ReadingSource>,
    channels: Vec<models::Channel>,
    interval: Duration,
    snapshot: ReadingSnapshot,
    tx: watch::Sender<ReadingSnapshot>,
}

impl Poller {
    pub fn new(
        source: Box<dyn ReadingSource>,
        channels: Vec<models::Channel>,
        interval: Duration,
        tx: watch::Sender<ReadingSnapshot>,
    ) -> Self {
        Self {
            source,
            channels,
            interval,
            snapshot: ReadingSnapshot::default(),
            tx,
        }
    }

    async fn poll(&mut self) {
        self.source.refresh().await;

        let current = readings::poll(&*self.source, &self.channels, &self.snapshot.current);
        self.snapshot = self.snapshot.advance(current);

        trace!(snapshot = ?self.snapshot, "polled");

        // Both halves of the pair are replaced at once
        self.tx.send_replace(self.snapshot.clone());
    }

    pub async fn run(mut self, token: CancellationToken) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            select! {
                _ = token.cancelled() => {
                    debug!("poller cancelled");
                    break;
                },
                _ = interval.tick() => {
                    self.poll().await;
                },
            }
        }
    }
}
