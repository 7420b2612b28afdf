use fitness_dice::common::{Clock, SystemClock};
use fitness_dice::config::Configuration;
use fitness_dice::coordinator::CoordinatorBuilder;
use fitness_dice::error::AppError;
use fitness_dice::game::{GameStateMachineBuilder, PerformanceMonitor};
use fitness_dice::source::{pose_feed, spawn_source_pump, PosePreset, ScriptStep, ScriptedPoseSource};
use fitness_dice::task::TaskCatalog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Level;

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// A player who jumps, rolls, and then squats, over and over.
fn demo_script() -> Vec<ScriptStep> {
    let mut script = vec![
        ScriptStep::pose(PosePreset::Standing, Duration::from_millis(1000)),
        ScriptStep::pose(PosePreset::Jumping, Duration::from_millis(200)),
        ScriptStep::pose(PosePreset::Standing, Duration::from_millis(300)),
        ScriptStep::pose(PosePreset::HandsUp, Duration::from_millis(1300)),
        ScriptStep::pose(PosePreset::Standing, Duration::from_millis(6000)),
    ];
    for _ in 0..20 {
        script.push(ScriptStep::pose(PosePreset::Squatting, Duration::from_millis(600)));
        script.push(ScriptStep::pose(PosePreset::Standing, Duration::from_millis(600)));
    }
    script.push(ScriptStep::absent(Duration::from_secs(2)));
    script
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let configuration = Configuration::load(config_path.as_deref())?;
    init_logging(configuration.level()?);

    let catalog = Arc::new(TaskCatalog::load(configuration.catalog_path.as_deref())?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let monitor = PerformanceMonitor::new();
    let machine = GameStateMachineBuilder::from_config(&configuration)
        .catalog(catalog)
        .clock(Arc::clone(&clock))
        .observer(Box::new(monitor.clone()))
        .build()?;

    let (sender, feed) = pose_feed();
    let source = ScriptedPoseSource::new(demo_script(), clock)
        .looping(true)
        .with_jitter(2.0, configuration.seed.unwrap_or_default())
        .with_policy(configuration.pose);
    let pump_token = CancellationToken::new();
    let pump = spawn_source_pump(
        source,
        sender,
        configuration.frame_loop.frame_interval(),
        pump_token.clone(),
    );

    let coordinator = CoordinatorBuilder::new(configuration)
        .machine(machine)
        .feed(feed)
        .build()?;

    let mut snapshots = coordinator.snapshots();
    let mut last_state = snapshots.borrow().state;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.state != last_state {
                    last_state = snapshot.state;
                    tracing::info!(
                        "[{}] {} | score {}",
                        snapshot.state_name,
                        snapshot.status,
                        snapshot.score
                    );
                }
            }
        }
    }

    let last = coordinator.shutdown().await?;
    pump_token.cancel();
    pump.await.map_err(|e| AppError::Shutdown(e.to_string()))?;

    let stats = monitor.get_stats();
    tracing::info!(
        "Final score {} after {} tasks, {} frames, avg update {:.0}us, {} overruns",
        last.score,
        last.completed_tasks,
        stats.total_frames,
        stats.average_update_us,
        stats.update_overruns
    );
    Ok(())
}
