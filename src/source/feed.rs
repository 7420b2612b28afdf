//! Depth-1 handoff between pose detection and the frame loop. Writers always
//! overwrite; the reader only ever sees the latest sample.

use super::PoseSource;
use crate::common::PoseSample;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub fn pose_feed() -> (PoseFeedSender, PoseFeed) {
    let (tx, rx) = watch::channel(None);
    (PoseFeedSender { tx }, PoseFeed { rx })
}

#[derive(Clone)]
pub struct PoseFeedSender {
    tx: watch::Sender<Option<PoseSample>>,
}

impl PoseFeedSender {
    /// Replaces whatever sample is pending. Returns false once the reader is gone.
    pub fn publish(&self, sample: Option<PoseSample>) -> bool {
        self.tx.send(sample).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A fresh detection result; `None` means no player in view
    Sample(Option<PoseSample>),
    /// Nothing new arrived within the wait
    Idle,
    /// Every sender has been dropped
    Closed,
}

pub struct PoseFeed {
    rx: watch::Receiver<Option<PoseSample>>,
}

impl PoseFeed {
    /// Waits at most `wait` for a sample newer than the last one taken.
    pub async fn next(&mut self, wait: Duration) -> FeedEvent {
        match tokio::time::timeout(wait, self.rx.changed()).await {
            Ok(Ok(())) => FeedEvent::Sample(self.rx.borrow_and_update().clone()),
            Ok(Err(_)) => FeedEvent::Closed,
            Err(_) => FeedEvent::Idle,
        }
    }

    /// Latest sample without waiting, if one arrived since the last read
    pub fn try_next(&mut self) -> Option<Option<PoseSample>> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }
}

/// Polls `source` once per `interval` and publishes into the feed until cancelled.
pub fn spawn_source_pump<S>(
    mut source: S,
    sender: PoseFeedSender,
    interval: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()>
where
    S: PoseSource + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("Pose source {} started", source.name());
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    let sample = source.next_sample().await;
                    if !sender.publish(sample) {
                        debug!("Pose feed reader dropped, stopping {}", source.name());
                        break;
                    }
                }
            }
        }
        info!("Pose source {} stopped", source.name());
    })
}
