use crate::{
    config::Configuration,
    error::AppError,
    game::{GameSnapshot, GameStateMachine, GameStateMachineBuilder},
    source::{FeedEvent, PoseFeed},
    task::TaskCatalog,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the frame loop task. The loop is the only writer of the game
/// context; everyone else reads the published snapshots.
pub struct Coordinator {
    frame_task: Option<JoinHandle<GameSnapshot>>,
    cancel_token: CancellationToken,
    snapshots: watch::Receiver<GameSnapshot>,
}

impl Coordinator {
    fn new(machine: GameStateMachine, feed: PoseFeed, frame_interval: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let (snapshot_tx, snapshots) = watch::channel(machine.snapshot());

        Self {
            frame_task: Some(Self::start_frame_task(
                machine,
                feed,
                snapshot_tx,
                frame_interval,
                cancel_token.clone(),
            )),
            cancel_token,
            snapshots,
        }
    }

    fn start_frame_task(
        mut machine: GameStateMachine,
        mut feed: PoseFeed,
        snapshot_tx: watch::Sender<GameSnapshot>,
        frame_interval: Duration,
        cancel_token: CancellationToken,
    ) -> JoinHandle<GameSnapshot> {
        tokio::spawn(async move {
            tracing::info!("Frame loop started, {}ms per frame", frame_interval.as_millis());
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => break,
                    event = feed.next(frame_interval) => {
                        let sample = match event {
                            FeedEvent::Sample(sample) => sample,
                            // No fresh detection in time, run the frame without one
                            FeedEvent::Idle => None,
                            FeedEvent::Closed => {
                                tracing::warn!("Pose feed closed, stopping frame loop");
                                break;
                            }
                        };
                        machine.update(sample.as_ref());
                        snapshot_tx.send_replace(machine.snapshot());
                    }
                }
            }
            machine.shutdown();
            let last = machine.snapshot();
            snapshot_tx.send_replace(last.clone());
            tracing::info!("Frame loop stopped at frame {}", last.frame);
            last
        })
    }

    /// Receiver that sees a new snapshot after every frame
    pub fn snapshots(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Stops the loop and waits for it, returning the final snapshot.
    pub async fn shutdown(mut self) -> Result<GameSnapshot, AppError> {
        self.stop();
        let Some(frame_task) = self.frame_task.take() else {
            return Ok(self.latest());
        };
        frame_task
            .await
            .map_err(|e| AppError::Shutdown(e.to_string()))
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    machine: Option<GameStateMachine>,
    feed: Option<PoseFeed>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            machine: None,
            feed: None,
        }
    }

    // Sets the frame rate, this will override the default configuration.
    pub fn fps(mut self, fps: u32) -> Self {
        self.configuration.frame_loop.fps = fps;
        self
    }

    // Sets the task seed, this will override the default configuration.
    pub fn seed(mut self, seed: u64) -> Self {
        self.configuration.seed = Some(seed);
        self
    }

    // Uses a prepared machine instead of building one from the configuration.
    pub fn machine(mut self, machine: GameStateMachine) -> Self {
        self.machine = Some(machine);
        self
    }

    pub fn feed(mut self, feed: PoseFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Coordinator, AppError> {
        self.configuration.validate()?;
        let feed = self
            .feed
            .ok_or(AppError::Coordinator("Pose feed not set".to_string()))?;
        let machine = match self.machine {
            Some(machine) => machine,
            None => {
                let catalog = TaskCatalog::load(self.configuration.catalog_path.as_deref())?;
                GameStateMachineBuilder::from_config(&self.configuration)
                    .catalog(Arc::new(catalog))
                    .build()?
            }
        };
        Ok(Coordinator::new(
            machine,
            feed,
            self.configuration.frame_loop.frame_interval(),
        ))
    }
}
