//! The room's input queue.
//!
//! One unbounded FIFO per room, fed by any number of producers (session
//! read loops, the public room API, the sync-mode timer) and drained by
//! exactly one consumer: the room loop. The queue offers both wait
//! disciplines the loop modes need — a blocking dequeue for Sync/Async
//! and an immediate dequeue for Frame — so the loop code never knows
//! which discipline its mode picked.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

pub(crate) struct MessageQueue<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> MessageQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Appends an item. Safe from any thread; silently dropped once the
    /// queue is closed, so late producers never observe an error.
    pub(crate) fn push(&self, item: T) {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.items.push_back(item);
        }
        // notify_one stores a permit when the consumer is not parked yet,
        // so a push between the consumer's check and its await is not lost.
        self.notify.notify_one();
    }

    /// Waits until at least one item is buffered, then drains everything
    /// into `out`. Returns `false` — with nothing drained — only once the
    /// queue is closed and empty.
    pub(crate) async fn dequeue_wait(&self, out: &mut Vec<T>) -> bool {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock();
                if !inner.items.is_empty() {
                    out.extend(inner.items.drain(..));
                    return true;
                }
                if inner.closed {
                    return false;
                }
            }
            notified.await;
        }
    }

    /// Drains whatever is buffered right now into `out`, without
    /// waiting. Returns `false` when the queue is closed; anything still
    /// buffered at close time is handed out with that final `false`.
    pub(crate) fn dequeue_now(&self, out: &mut Vec<T>) -> bool {
        let mut inner = self.inner.lock();
        out.extend(inner.items.drain(..));
        !inner.closed
    }

    /// Closes the queue and wakes a blocked consumer. Idempotent.
    pub(crate) fn close(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        self.notify.notify_one();
    }
}
