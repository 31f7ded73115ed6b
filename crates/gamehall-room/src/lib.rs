//! Per-room concurrency core for Gamehall.
//!
//! A [`Room`] hosts one user-supplied [`Game`] and its [`Player`]s. All
//! inputs — inbound packets, join/leave lifecycle events, timer ticks,
//! and user-enqueued values — are serialised through one queue into a
//! single loop task, which is the only code that mutates game state or
//! invokes game callbacks.
//!
//! Three loop disciplines are available ([`RoomMode`]):
//!
//! - **Async** (default): ticks run on a parallel task and never wait
//!   for message handling.
//! - **Sync**: ticks share the queue with messages; a slow handler
//!   postpones the next tick.
//! - **Frame**: the tick drives the loop; all input buffered since the
//!   last tick is applied, then the tick fires. For lockstep games,
//!   pair it with [`FrameManager`].
//!
//! Panics inside game callbacks are recovered, reported once through
//! [`Game::on_panic`] as a [`StackError`], and followed by an orderly
//! teardown; `run` returns the error.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gamehall_room::{Game, Player, RoomBuilder, RoomMode};
//! use gamehall_protocol::Packet;
//!
//! struct Echo;
//!
//! impl Game for Echo {
//!     type Custom = ();
//!     fn on_message(&self, player: &Arc<Player>, packet: Packet) {
//!         player.send_packet(packet);
//!     }
//! }
//!
//! # async fn demo() -> Result<(), gamehall_room::RoomError> {
//! let room = RoomBuilder::new(1).mode(RoomMode::Async).build::<Echo>();
//! tokio::spawn({
//!     let room = Arc::clone(&room);
//!     async move { room.run(Arc::new(Echo)).await }
//! });
//! # Ok(()) }
//! ```

mod error;
mod game;
mod lockstep;
mod manager;
mod message;
mod mode;
mod player;
mod queue;
mod room;
mod stack;
mod waiter;

pub use error::RoomError;
pub use game::Game;
pub use lockstep::{Frame, FrameManager};
pub use manager::RoomManager;
pub use mode::RoomMode;
pub use player::Player;
pub use room::{Room, RoomBuilder, RoomState};
pub use stack::StackError;
pub use waiter::{WaitGroup, Waiter};

pub(crate) use message::Envelope;
pub(crate) use queue::MessageQueue;
