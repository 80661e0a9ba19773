use crate::config::DelayRange;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Randomized pauses between network-visible actions
///
/// Owns a single random source seeded once when the controller is created. The
/// orchestrator creates one per run and lends it to each stage.
#[derive(Debug)]
pub struct Politeness {
    rng: StdRng,
}

impl Politeness {
    /// Seed from the current time
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    /// Deterministic controller, used by tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Delay drawn uniformly from `[min_ms, max_ms)`; a degenerate range yields `min_ms`
    pub fn interval(&mut self, min_ms: u64, max_ms: u64) -> Duration {
        if max_ms <= min_ms {
            return Duration::from_millis(min_ms);
        }
        Duration::from_millis(self.rng.random_range(min_ms..max_ms))
    }

    /// Sleep for an interval drawn from `range`
    pub async fn pause(&mut self, range: DelayRange) -> Duration {
        let delay = self.interval(range.min_ms, range.max_ms);
        ::log::trace!("Politeness pause of {} ms", delay.as_millis());
        tokio::time::sleep(delay).await;
        delay
    }
}
