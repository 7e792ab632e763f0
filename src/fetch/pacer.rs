//! Request pacing against the fixtures feed.
//!
//! All workers share one [`RequestPacer`]; before every network attempt a
//! worker reserves the next request slot, so attempts across the whole pool
//! are spaced at least the configured delay apart. The delay applies to the
//! very first attempt too, keeping the client respectful even on a cold run.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces network requests a fixed minimum interval apart.
///
/// Designed to be wrapped in `Arc` and shared across spawned tasks. The slot
/// reservation happens under a short-lived lock; the actual waiting happens
/// after the lock is released, so workers queue up without serializing their
/// entire attempts.
#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    disabled: bool,
    /// Time at which the most recently reserved request slot becomes due.
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    /// Creates a pacer enforcing `delay` between request starts.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            disabled: delay.is_zero(),
            next_slot: Mutex::new(None),
        }
    }

    /// Creates a pacer that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether pacing is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the configured inter-request delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until the next request may start.
    ///
    /// Every call reserves a slot `delay` after the previous slot or after
    /// now, whichever is later, and sleeps until it is due. Each attempt
    /// therefore waits at least `delay` before hitting the network.
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(previous) => previous.max(now) + self.delay,
                None => now + self.delay,
            };
            *next_slot = Some(slot);
            slot
        };

        tokio::time::sleep_until(slot).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_disabled_pacer_does_not_wait() {
        let pacer = RequestPacer::disabled();
        assert!(pacer.is_disabled());

        let start = Instant::now();
        for _ in 0..50 {
            pacer.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_first_acquire_applies_delay() {
        let pacer = RequestPacer::new(Duration::from_millis(50));
        let start = Instant::now();
        pacer.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_sequential_acquires_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_millis(30));
        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        pacer.acquire().await;
        // Three slots at 30ms spacing.
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_concurrent_acquires_are_spaced() {
        let pacer = Arc::new(RequestPacer::new(Duration::from_millis(20)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let pacer = Arc::clone(&pacer);
            handles.push(tokio::spawn(async move {
                pacer.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Four slots reserved back to back: last one is due at >= 80ms.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
