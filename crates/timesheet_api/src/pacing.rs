//! Minimum-interval pacing for outbound requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Serializes request starts so consecutive calls are at least `cooldown` apart. Clones share the same clock.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    cooldown: Duration,
    last_start: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_start: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits until the previous request is at least one cooldown old, then claims the slot.
    pub async fn wait_turn(&self) {
        if self.cooldown.is_zero() {
            return;
        }
        let mut guard = self.last_start.lock().await;
        if let Some(last) = *guard {
            sleep_until(last + self.cooldown).await;
        }
        *guard = Some(Instant::now());
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::RequestPacer;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test]
    async fn zero_cooldown_never_waits() {
        let pacer = RequestPacer::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            pacer.wait_turn().await;
        }
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn clones_share_the_same_slot() {
        let pacer = RequestPacer::new(Duration::from_millis(40));
        let other = pacer.clone();

        pacer.wait_turn().await;
        let start = Instant::now();
        other.wait_turn().await;

        assert!(start.elapsed() >= Duration::from_millis(35));
        assert_eq!(other.cooldown(), Duration::from_millis(40));
    }
}
