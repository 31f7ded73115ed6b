//! The envelope: every input a room loop consumes, in one shape.

use std::sync::Arc;

use gamehall_protocol::Packet;
use gamehall_session::SessionError;
use tokio::sync::oneshot;

use crate::{Game, Player, RoomError};

/// One unit of room input. All five streams — packets, joins, leaves,
/// sync-mode timer expiries, and user-enqueued values — funnel through
/// the same queue as envelopes, which is what makes the loop the single
/// writer of game state.
pub(crate) enum Envelope<G: Game> {
    /// An inbound packet from an admitted player's session.
    Message { player_id: i64, packet: Packet },

    /// An admission request. The loop resolves `reply` once it has
    /// decided, which is what lets `add_player` block for the verdict.
    PlayerIn {
        player: Arc<Player>,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A departure. `error` carries the transport failure, or `None`
    /// when the player was removed deliberately.
    PlayerOut {
        player_id: i64,
        error: Option<SessionError>,
    },

    /// A sync-mode timer expiry. Never appears in other modes.
    Tick,

    /// A user-enqueued value destined for `Game::on_dequeue`.
    Custom(G::Custom),
}
