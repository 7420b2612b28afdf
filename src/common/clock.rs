use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for every timer in the game. Tests drive a [`ManualClock`].
pub trait Clock: Send + Sync {
    /// Monotonic time since the clock started
    fn now(&self) -> Duration;

    /// Wall-clock time, used only for record keeping
    fn wall_time(&self) -> DateTime<Utc>;
}

pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    elapsed_us: Arc<AtomicU64>,
    epoch: DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            elapsed_us: Arc::new(AtomicU64::new(0)),
            epoch: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed_us
            .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.elapsed_us.store(to.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.elapsed_us.load(Ordering::SeqCst))
    }

    fn wall_time(&self) -> DateTime<Utc> {
        self.epoch + chrono::Duration::microseconds(self.elapsed_us.load(Ordering::SeqCst) as i64)
    }
}
