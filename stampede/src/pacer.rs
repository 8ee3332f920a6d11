use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Randomized think-time between a virtual user's units of work.
///
/// Each user owns its own pacer. Delays are whole milliseconds drawn uniformly from `[0, max)`.
pub(crate) struct Pacer {
    max_ms: u64,
    rng: SmallRng,
}

impl Pacer {
    pub fn new(max: Duration) -> Self {
        Self::with_rng(max, SmallRng::from_entropy())
    }

    pub fn seeded(max: Duration, seed: u64) -> Self {
        Self::with_rng(max, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(max: Duration, rng: SmallRng) -> Self {
        Self {
            max_ms: max.as_millis().try_into().unwrap_or(u64::MAX),
            rng,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        if self.max_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(self.rng.gen_range(0..self.max_ms))
        }
    }

    pub async fn wait(&mut self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            // NOTE: An issuer that never hits a pending future would otherwise never give the
            // worker thread back.
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}
