//! The [`Game`] trait — the extension point game developers implement.

use std::sync::Arc;
use std::time::Duration;

use gamehall_protocol::Packet;
use gamehall_session::SessionError;

use crate::{Player, Room, StackError};

/// The strategy object a room drives.
///
/// The room serialises every callback except async-mode `on_tick` onto
/// its loop task, so implementations see joins, leaves, packets, and
/// custom values strictly one at a time:
///
/// | Callback | When | Task |
/// |---|---|---|
/// | `on_run_in_room` | once, inside `run`, before the loop starts | caller of `run` |
/// | `tick_interval` | once at loop start | loop |
/// | `on_tick` | per interval | ticker task (Async) or loop (Sync/Frame) |
/// | `on_message` | per inbound packet | loop |
/// | `on_dequeue` | per enqueued custom value | loop |
/// | `on_join_room` | after successful admission | loop |
/// | `on_leave_room` | after the player left the map | loop |
/// | `on_close_room` | exactly once, the last callback | loop |
/// | `on_panic` | on a recovered panic, before teardown | loop or ticker |
///
/// In Async mode `on_tick` runs concurrently with the loop callbacks —
/// game state touched from both must use interior synchronisation.
///
/// Callbacks take `&self`: the framework provides the serialisation,
/// the game provides interior mutability for its own state.
pub trait Game: Send + Sync + Sized + 'static {
    /// The type of values accepted by [`Room::enqueue`] and handed back
    /// through [`on_dequeue`](Self::on_dequeue).
    type Custom: Send + 'static;

    /// How often `on_tick` fires. Zero disables ticking in Sync and
    /// Async modes; Frame mode rejects zero at `run` time.
    fn tick_interval(&self) -> Duration {
        Duration::ZERO
    }

    /// The room admitted `run` and is about to start its loop.
    fn on_run_in_room(&self, _room: &Arc<Room<Self>>) {}

    /// Periodic tick. Return `false` to close the room.
    fn on_tick(&self) -> bool {
        true
    }

    /// An inbound packet from an admitted player.
    fn on_message(&self, player: &Arc<Player>, packet: Packet);

    /// A value handed to [`Room::enqueue`] has reached the loop.
    fn on_dequeue(&self, _value: Self::Custom) {}

    /// A player was admitted into the room.
    fn on_join_room(&self, _player: &Arc<Player>) {}

    /// A player left. `err` is the transport failure that evicted them,
    /// or `None` for a deliberate removal.
    fn on_leave_room(&self, _player: &Arc<Player>, _err: Option<SessionError>) {}

    /// The room closed. Always the final callback for a `run`.
    fn on_close_room(&self, _room: &Arc<Room<Self>>) {}

    /// A panic was recovered from the loop or the ticker. Teardown
    /// (leaves, close) follows immediately after this returns.
    fn on_panic(&self, _room: &Arc<Room<Self>>, _err: &StackError) {}
}
