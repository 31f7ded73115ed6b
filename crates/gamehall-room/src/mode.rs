//! The three loop disciplines a room can run under.
//!
//! All three drain the same queue and share the same dispatch; they
//! differ only in how the tick stream meets the message stream:
//!
//! - **Async** — a ticker task calls `on_tick` in parallel with the
//!   loop. Ticks never backlog behind slow handlers; the game must
//!   treat `on_tick` as concurrent with the other callbacks.
//! - **Sync** — a one-shot timer enqueues a tick envelope; the loop
//!   handles it in line and re-arms the timer. Ticks are serialised
//!   with messages, so a slow handler postpones the next tick.
//! - **Frame** — the timer drives the loop: sleep, drain everything
//!   buffered, dispatch it, then tick. All input since the previous
//!   tick is applied before the tick, which is what lockstep needs.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::{Envelope, Game, Room, StackError};

/// The loop discipline, bound at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomMode {
    /// Ticks share the queue with messages.
    Sync,
    /// Ticks run on their own task, in parallel with the loop.
    #[default]
    Async,
    /// The tick drives the drain; inputs batch between ticks.
    Frame,
}

impl fmt::Display for RoomMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
            Self::Frame => write!(f, "frame"),
        }
    }
}

impl<G: Game> Room<G> {
    /// Runs the mode's loop to completion. Panics escape to the
    /// recovery barrier in `run`.
    pub(crate) async fn drive(self: &Arc<Self>, game: &Arc<G>, interval: Duration) {
        match self.mode() {
            RoomMode::Async => self.drive_async(game, interval).await,
            RoomMode::Sync => self.drive_sync(game, interval).await,
            RoomMode::Frame => self.drive_frame(game, interval).await,
        }
    }

    // -- async ---------------------------------------------------------------

    async fn drive_async(self: &Arc<Self>, game: &Arc<G>, interval: Duration) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let ticker = (!interval.is_zero()).then(|| self.spawn_ticker(game, interval, stop_rx));

        let mut batch = Vec::new();
        loop {
            batch.clear();
            let open = self.queue.dequeue_wait(&mut batch).await;
            for envelope in batch.drain(..) {
                self.dispatch(game.as_ref(), envelope);
            }
            if !open {
                break;
            }
        }

        // Stop the ticker and wait it out before on_close_room, so the
        // final callback really is final.
        let _ = stop_tx.send(true);
        if let Some(ticker) = ticker {
            let _ = ticker.await;
        }
    }

    /// The async-mode ticker task. Runs `on_tick` off the loop; its own
    /// recovery barrier parks a panic in the room and closes the queue
    /// so the main loop exits promptly.
    fn spawn_ticker(
        self: &Arc<Self>,
        game: &Arc<G>,
        interval: Duration,
        mut stop: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let room = Arc::clone(self);
        let game = Arc::clone(game);
        tokio::spawn(async move {
            let ticks = {
                let room = Arc::clone(&room);
                let game = Arc::clone(&game);
                async move {
                    let mut timer = time::interval_at(time::Instant::now() + interval, interval);
                    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    loop {
                        tokio::select! {
                            // Ok on the stop signal, Err if the loop side
                            // unwound and dropped the sender. Exit either way.
                            _ = stop.changed() => break,
                            _ = timer.tick() => {
                                if room.closed() {
                                    break;
                                }
                                if !game.on_tick() {
                                    room.close();
                                    break;
                                }
                            }
                        }
                    }
                }
            };

            if let Err(payload) = AssertUnwindSafe(ticks).catch_unwind().await {
                let stack = StackError::from_panic(payload);
                tracing::error!(room_id = room.id(), value = %stack.value(), "ticker panicked");
                game.on_panic(&room, &stack);
                room.set_panic(stack);
                room.close();
            }
        })
    }

    // -- sync ----------------------------------------------------------------

    async fn drive_sync(self: &Arc<Self>, game: &Arc<G>, interval: Duration) {
        if !interval.is_zero() {
            self.arm_tick(interval);
        }

        let mut batch = Vec::new();
        loop {
            batch.clear();
            let open = self.queue.dequeue_wait(&mut batch).await;
            for envelope in batch.drain(..) {
                match envelope {
                    Envelope::Tick => {
                        if self.closed() {
                            continue;
                        }
                        if game.on_tick() {
                            // Re-armed only after the tick ran: message
                            // handling back-pressures the tick stream.
                            self.arm_tick(interval);
                        } else {
                            self.close();
                        }
                    }
                    other => self.dispatch(game.as_ref(), other),
                }
            }
            if !open {
                break;
            }
        }
    }

    /// Arms a one-shot timer that enqueues a tick envelope. Firing after
    /// close is harmless — the push is dropped.
    fn arm_tick(self: &Arc<Self>, interval: Duration) {
        let room = Arc::clone(self);
        tokio::spawn(async move {
            time::sleep(interval).await;
            room.queue.push(Envelope::Tick);
        });
    }

    // -- frame ---------------------------------------------------------------

    async fn drive_frame(self: &Arc<Self>, game: &Arc<G>, interval: Duration) {
        let mut batch = Vec::new();
        loop {
            tokio::select! {
                _ = time::sleep(interval) => {
                    batch.clear();
                    let open = self.queue.dequeue_now(&mut batch);
                    for envelope in batch.drain(..) {
                        self.dispatch(game.as_ref(), envelope);
                    }
                    if !open {
                        break;
                    }
                    if !game.on_tick() {
                        self.close();
                    }
                }
                _ = self.wait_closed() => {
                    // Drain the tail (departures enqueued by close) so
                    // their on_leave_room callbacks still run.
                    batch.clear();
                    self.queue.dequeue_now(&mut batch);
                    for envelope in batch.drain(..) {
                        self.dispatch(game.as_ref(), envelope);
                    }
                    break;
                }
            }
        }
    }
}
