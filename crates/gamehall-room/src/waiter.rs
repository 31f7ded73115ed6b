//! The "all rooms stopped" barrier.

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Countdown barrier a room reports its lifetime to: `add(1)` when a
/// loop starts, `done()` when it exits. The surrounding process waits on
/// the barrier to know every room has stopped.
pub trait Waiter: Send + Sync + 'static {
    /// Registers `n` additional parties.
    fn add(&self, n: usize);

    /// Marks one party finished.
    fn done(&self);
}

/// A concrete [`Waiter`] with an async [`wait`](WaitGroup::wait).
#[derive(Default)]
pub struct WaitGroup {
    count: Mutex<usize>,
    notify: Notify,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once the count reaches zero. A zero count resolves
    /// immediately.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a done() landing in between
            // still wakes us.
            notified.as_mut().enable();
            if *self.count.lock() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Waiter for WaitGroup {
    fn add(&self, n: usize) {
        *self.count.lock() += n;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            drop(count);
            self.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_wait_resolves_immediately_at_zero() {
        let wg = WaitGroup::new();
        wg.wait().await;
    }

    #[tokio::test]
    async fn test_wait_blocks_until_all_done() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(2);

        let waiter = tokio::spawn({
            let wg = Arc::clone(&wg);
            async move { wg.wait().await }
        });

        wg.done();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        wg.done();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_multiple_waiters_all_released() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(1);

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let wg = Arc::clone(&wg);
                tokio::spawn(async move { wg.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        wg.done();

        for waiter in waiters {
            waiter.await.unwrap();
        }
    }
}
