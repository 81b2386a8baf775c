use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Quiet period a resize burst must respect before the chart is redrawn.
pub const RESIZE_QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Trailing-edge debouncer: of a burst of calls, only the last one settles.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: AtomicU64::new(0),
        }
    }

    /// Waits out the quiet period. Returns `true` when no later call arrived
    /// in the meantime.
    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiet).await;
        self.generation.load(Ordering::SeqCst) == ticket
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(RESIZE_QUIET_PERIOD)
    }
}
